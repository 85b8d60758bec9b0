//! GraphML export of the visible part of a coexpression graph.
//!
//! Node ids are gene ids. Only nodes and edges in the given [`VisibleSets`]
//! are written, so the file matches what the user sees.

use std::io::{self, Cursor};

use coexgraph_common::error::{CoexError, Result};
use coexgraph_engine::filter::VisibleSets;
use coexgraph_engine::graph::{CoexGraph, GraphEdge, GraphNode};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";

/// `(id, for, attr.name, attr.type)`
const KEYS: [(&str, &str, &str, &str); 9] = [
    ("label", "node", "label", "string"),
    ("query", "node", "queryGene", "boolean"),
    ("degree", "node", "nodeDegree", "double"),
    ("ncbi", "node", "ncbiId", "string"),
    ("name", "node", "officialName", "string"),
    ("pos", "edge", "positiveSupport", "int"),
    ("neg", "edge", "negativeSupport", "int"),
    ("support", "edge", "support", "int"),
    ("sign", "edge", "supportSign", "string"),
];

type XmlWriter = Writer<Cursor<Vec<u8>>>;

pub fn write_graphml(graph: &CoexGraph, visible: &VisibleSets) -> Result<String> {
    let mut w = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    emit(&mut w, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(&mut w, Event::Start(BytesStart::new("graphml").with_attributes([("xmlns", GRAPHML_NS)])))?;
    for (id, target, name, ty) in KEYS {
        let key = BytesStart::new("key").with_attributes([
            ("id", id),
            ("for", target),
            ("attr.name", name),
            ("attr.type", ty),
        ]);
        emit(&mut w, Event::Empty(key))?;
    }
    emit(
        &mut w,
        Event::Start(BytesStart::new("graph").with_attributes([("id", "coexpression"), ("edgedefault", "undirected")])),
    )?;

    let nodes: Vec<&GraphNode> = graph.nodes.iter().filter(|n| visible.is_node_visible(n.gene_id)).collect();
    for node in &nodes {
        write_node(&mut w, node)?;
    }
    let edges: Vec<&GraphEdge> = graph.edges.iter().filter(|e| visible.is_edge_visible(&e.key)).collect();
    for edge in &edges {
        write_edge(&mut w, edge)?;
    }

    emit(&mut w, Event::End(BytesEnd::new("graph")))?;
    emit(&mut w, Event::End(BytesEnd::new("graphml")))?;

    debug!(nodes = nodes.len(), edges = edges.len(), "Wrote GraphML");
    let bytes = w.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| CoexError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn write_node(w: &mut XmlWriter, node: &GraphNode) -> Result<()> {
    let id = node.gene_id.to_string();
    emit(w, Event::Start(BytesStart::new("node").with_attributes([("id", id.as_str())])))?;
    data(w, "label", &node.label)?;
    data(w, "query", if node.is_query_gene { "true" } else { "false" })?;
    if let Some(degree) = node.node_degree {
        data(w, "degree", &degree.to_string())?;
    }
    if let Some(ncbi) = &node.ncbi_id {
        data(w, "ncbi", ncbi)?;
    }
    if let Some(name) = &node.official_name {
        data(w, "name", name)?;
    }
    emit(w, Event::End(BytesEnd::new("node")))
}

fn write_edge(w: &mut XmlWriter, edge: &GraphEdge) -> Result<()> {
    let source = edge.source_id.to_string();
    let target = edge.target_id.to_string();
    let start = BytesStart::new("edge").with_attributes([
        ("id", edge.key.as_str()),
        ("source", source.as_str()),
        ("target", target.as_str()),
    ]);
    emit(w, Event::Start(start))?;
    data(w, "pos", &edge.positive_support.to_string())?;
    data(w, "neg", &edge.negative_support.to_string())?;
    data(w, "support", &edge.support.to_string())?;
    data(w, "sign", edge.support_sign.as_str())?;
    emit(w, Event::End(BytesEnd::new("edge")))
}

fn data(w: &mut XmlWriter, key: &str, value: &str) -> Result<()> {
    emit(w, Event::Start(BytesStart::new("data").with_attributes([("key", key)])))?;
    emit(w, Event::Text(BytesText::new(value)))?;
    emit(w, Event::End(BytesEnd::new("data")))
}

fn emit(w: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    w.write_event(event)
        .map_err(|e| CoexError::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))
}
