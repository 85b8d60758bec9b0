//! Plain-text graph renderer for terminals.

use coexgraph_common::entities::GeneId;
use coexgraph_common::settings::StyleConfig;
use coexgraph_engine::filter::VisibleSets;
use coexgraph_engine::graph::CoexGraph;
use coexgraph_engine::render::GraphRenderer;
use coexgraph_engine::style::GraphStyler;

pub struct TextRenderer {
    style: StyleConfig,
    emphasize_degree: bool,
    overlay: Vec<GeneId>,
    frames: Vec<String>,
}

impl TextRenderer {
    pub fn new(style: StyleConfig) -> Self {
        Self { style, emphasize_degree: true, overlay: Vec::new(), frames: Vec::new() }
    }

    pub fn with_degree_emphasis(mut self, on: bool) -> Self {
        self.emphasize_degree = on;
        self
    }

    pub fn with_overlay(mut self, gene_ids: Vec<GeneId>) -> Self {
        self.overlay = gene_ids;
        self
    }

    pub fn last_frame(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }
}

impl GraphRenderer for TextRenderer {
    fn render(&mut self, graph: &CoexGraph, visible: &VisibleSets) {
        let styler = GraphStyler::new(&self.style)
            .with_degree_emphasis(self.emphasize_degree)
            .with_overlay(self.overlay.iter().copied());

        let mut out = format!(
            "{} of {} genes, {} of {} links shown\n",
            visible.node_ids.len(),
            graph.node_count(),
            visible.edge_keys.len(),
            graph.edge_count()
        );

        for node in graph.nodes.iter().filter(|n| visible.is_node_visible(n.gene_id)) {
            let s = styler.node_style(node);
            let marker = match (node.is_query_gene, s.overlay) {
                (true, true) => "*+",
                (true, false) => "* ",
                (false, true) => " +",
                (false, false) => "  ",
            };
            let degree = node
                .node_degree
                .map(|d| format!("{d:.4}"))
                .unwrap_or_else(|| "-".into());
            out.push_str(&format!(
                "{marker} {:<12} degree {:<7} {:<9} {}\n",
                node.label,
                degree,
                s.degree_class.name(),
                node.official_name.as_deref().unwrap_or("")
            ));
        }

        for edge in graph.edges.iter().filter(|e| visible.is_edge_visible(&e.key)) {
            let s = styler.edge_style(edge);
            out.push_str(&format!(
                "   {} -- {}  support {} ({}, +{}/-{}) opacity {:.2}\n",
                edge.source,
                edge.target,
                edge.support,
                edge.support_sign.as_str(),
                edge.positive_support,
                edge.negative_support,
                s.opacity
            ));
        }

        self.frames.push(out);
    }
}
