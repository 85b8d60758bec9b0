//! Node/edge graph built from one coexpression search result.

use std::collections::{HashMap, HashSet};

use coexgraph_common::entities::{round4, CoexpressionResult, Gene, GeneId, SupportSign};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub gene_id: GeneId,
    pub label: String,
    pub is_query_gene: bool,
    /// Rounded to 4 decimals; `None` when the server had no data.
    pub node_degree: Option<f64>,
    /// `node_degree × 10`, the value discrete color mappers key on.
    pub node_degree_bin: Option<f64>,
    /// Official name cut for tooltips.
    pub official_name: Option<String>,
    pub ncbi_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    /// `"<foundSymbol>to<querySymbol>"`
    pub key: String,
    /// Query gene side.
    pub source: String,
    pub source_id: GeneId,
    /// Found gene side.
    pub target: String,
    pub target_id: GeneId,
    pub positive_support: u32,
    pub negative_support: u32,
    pub support: u32,
    pub support_sign: SupportSign,
    pub node_degree_bin: Option<f64>,
}

impl GraphEdge {
    pub fn touches(&self, gene_id: GeneId) -> bool {
        self.source_id == gene_id || self.target_id == gene_id
    }
}

/// A rebuilt-per-result graph snapshot. Nodes and edges keep insertion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoexGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    #[serde(skip)]
    node_index: HashMap<GeneId, usize>,
    #[serde(skip)]
    edge_index: HashMap<String, usize>,
}

impl CoexGraph {
    pub fn node(&self, gene_id: GeneId) -> Option<&GraphNode> {
        self.node_index.get(&gene_id).map(|&i| &self.nodes[i])
    }

    pub fn edge(&self, key: &str) -> Option<&GraphEdge> {
        self.edge_index.get(key).map(|&i| &self.edges[i])
    }

    pub fn contains_node(&self, gene_id: GeneId) -> bool {
        self.node_index.contains_key(&gene_id)
    }

    /// Gene ids in insertion order.
    pub fn node_ids(&self) -> Vec<GeneId> {
        self.nodes.iter().map(|n| n.gene_id).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn push_node(&mut self, node: GraphNode) {
        self.node_index.insert(node.gene_id, self.nodes.len());
        self.nodes.push(node);
    }

    fn push_edge(&mut self, edge: GraphEdge) {
        self.edge_index.insert(edge.key.clone(), self.edges.len());
        self.edges.push(edge);
    }
}

/// Degree → color bin. Missing data stays missing.
pub fn node_degree_bin(node_degree: Option<f64>) -> Option<f64> {
    node_degree.map(|d| d * 10.0)
}

/// Max of two endpoint degrees where a missing value counts as 1 (least specific).
pub fn max_degree_missing_as_one(a: Option<f64>, b: Option<f64>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => a.max(b),
        _ => 1.0,
    }
}

pub fn truncate_tooltip(text: Option<&str>, max_len: usize) -> Option<String> {
    let text = text?;
    if text.chars().count() > max_len {
        let cut: String = text.chars().take(max_len).collect();
        Some(format!("{cut}..."))
    } else {
        Some(text.to_string())
    }
}

/// Assembles a [`CoexGraph`] from query genes and coexpression results.
pub struct GraphBuilder<'a> {
    query_ids: &'a HashSet<GeneId>,
    tooltip_max_len: usize,
    graph: CoexGraph,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(query_ids: &'a HashSet<GeneId>, tooltip_max_len: usize) -> Self {
        Self { query_ids, tooltip_max_len, graph: CoexGraph::default() }
    }

    fn node_for(&self, gene: &Gene) -> GraphNode {
        GraphNode {
            gene_id: gene.id,
            label: gene.symbol.clone(),
            is_query_gene: self.query_ids.contains(&gene.id),
            node_degree: gene.node_degree.map(round4),
            node_degree_bin: node_degree_bin(gene.node_degree),
            official_name: truncate_tooltip(gene.official_name.as_deref(), self.tooltip_max_len),
            ncbi_id: gene.ncbi_id.clone(),
        }
    }

    fn add_gene(&mut self, gene: &Gene) {
        if !self.graph.contains_node(gene.id) {
            let node = self.node_for(gene);
            self.graph.push_node(node);
        }
    }

    /// Adds both endpoints and the edge. A repeated edge key keeps the first
    /// occurrence's support values.
    pub fn add_result(&mut self, result: &CoexpressionResult) -> &mut Self {
        self.add_gene(&result.found_gene);
        self.add_gene(&result.query_gene);

        let key = result.edge_key();
        if self.graph.edge(&key).is_none() {
            let edge = GraphEdge {
                key,
                source: result.query_gene.symbol.clone(),
                source_id: result.query_gene.id,
                target: result.found_gene.symbol.clone(),
                target_id: result.found_gene.id,
                positive_support: result.positive_support,
                negative_support: result.negative_support,
                support: result.support(),
                support_sign: result.support_sign(),
                node_degree_bin: node_degree_bin(Some(max_degree_missing_as_one(
                    result.query_gene.node_degree,
                    result.found_gene.node_degree,
                ))),
            };
            self.graph.push_edge(edge);
        }
        self
    }

    /// Adds a query gene with no coexpression partners, degree 0.
    pub fn add_isolated(&mut self, gene: &Gene) -> &mut Self {
        if !self.graph.contains_node(gene.id) {
            let mut node = self.node_for(gene);
            node.node_degree = Some(0.0);
            node.node_degree_bin = Some(0.0);
            self.graph.push_node(node);
        }
        self
    }

    pub fn finish(self) -> CoexGraph {
        self.graph
    }
}

/// Build a fresh graph: result endpoints first, then any query gene not yet
/// present as an isolated node.
pub fn build_graph(
    query_genes: &[Gene],
    results: &[CoexpressionResult],
    query_ids: &HashSet<GeneId>,
    tooltip_max_len: usize,
) -> CoexGraph {
    let mut builder = GraphBuilder::new(query_ids, tooltip_max_len);
    for result in results {
        builder.add_result(result);
    }
    for gene in query_genes {
        builder.add_isolated(gene);
    }
    builder.finish()
}
