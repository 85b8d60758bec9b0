//! Visual attributes derived from graph data.

use std::collections::HashSet;

use coexgraph_common::entities::{GeneId, SupportSign};
use coexgraph_common::settings::{DegreeThresholds, StyleConfig};
use serde::Serialize;

use crate::graph::{GraphEdge, GraphNode};

const QUERY_BORDER_WIDTH: u32 = 3;
const MIN_EDGE_WIDTH: f64 = 1.0;
const MAX_EDGE_WIDTH: f64 = 6.0;
const MISSING_BIN_OPACITY: f64 = 0.05;

/// Specificity class of a node. Low degree means a highly specific gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DegreeClass {
    Lowest,
    Low,
    Moderate,
    High,
    Highest,
}

impl DegreeClass {
    /// Missing data fades into the background as `Lowest`.
    pub fn from_degree(node_degree: Option<f64>, t: &DegreeThresholds) -> Self {
        match node_degree {
            None => DegreeClass::Lowest,
            Some(d) if d > t.lightest => DegreeClass::Lowest,
            Some(d) if d > t.light    => DegreeClass::Low,
            Some(d) if d > t.moderate => DegreeClass::Moderate,
            Some(d) if d > t.dark     => DegreeClass::High,
            Some(_)                   => DegreeClass::Highest,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DegreeClass::Lowest   => "Lowest",
            DegreeClass::Low      => "Low",
            DegreeClass::Moderate => "Moderate",
            DegreeClass::High     => "High",
            DegreeClass::Highest  => "Highest",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeStyle {
    pub fill: String,
    pub border_color: String,
    pub border_width: u32,
    pub degree_class: DegreeClass,
    pub overlay: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub color: String,
    pub width: f64,
    pub opacity: f64,
}

/// Maps nodes and edges to styles under the current emphasis and overlay.
pub struct GraphStyler<'a> {
    config: &'a StyleConfig,
    emphasize_degree: bool,
    overlay: HashSet<GeneId>,
}

impl<'a> GraphStyler<'a> {
    pub fn new(config: &'a StyleConfig) -> Self {
        Self { config, emphasize_degree: true, overlay: HashSet::new() }
    }

    pub fn with_degree_emphasis(mut self, on: bool) -> Self {
        self.emphasize_degree = on;
        self
    }

    /// Highlight genes from a user-supplied list.
    pub fn with_overlay(mut self, gene_ids: impl IntoIterator<Item = GeneId>) -> Self {
        self.overlay = gene_ids.into_iter().collect();
        self
    }

    pub fn node_style(&self, node: &GraphNode) -> NodeStyle {
        let degree_class = DegreeClass::from_degree(node.node_degree, &self.config.degree_thresholds);
        let overlay = self.overlay.contains(&node.gene_id);
        let fill = if overlay {
            self.config.overlay_color.clone()
        } else if self.emphasize_degree {
            self.degree_color(degree_class).to_string()
        } else {
            self.config.node_color.clone()
        };
        let (border_color, border_width) = if node.is_query_gene {
            (self.config.query_border_color.clone(), QUERY_BORDER_WIDTH)
        } else {
            (self.config.other_border_color.clone(), 0)
        };
        NodeStyle { fill, border_color, border_width, degree_class, overlay }
    }

    pub fn edge_style(&self, edge: &GraphEdge) -> EdgeStyle {
        let color = match edge.support_sign {
            SupportSign::Both     => &self.config.support_color_both,
            SupportSign::Positive => &self.config.support_color_positive,
            SupportSign::Negative => &self.config.support_color_negative,
        };
        let opacity = if self.emphasize_degree {
            edge_opacity(edge.node_degree_bin)
        } else {
            1.0
        };
        EdgeStyle {
            color: color.clone(),
            width: (edge.support as f64).clamp(MIN_EDGE_WIDTH, MAX_EDGE_WIDTH),
            opacity,
        }
    }

    fn degree_color(&self, class: DegreeClass) -> &str {
        let c = &self.config.degree_colors;
        match class {
            DegreeClass::Lowest   => &c.lowest,
            DegreeClass::Low      => &c.low,
            DegreeClass::Moderate => &c.moderate,
            DegreeClass::High     => &c.high,
            DegreeClass::Highest  => &c.highest,
        }
    }
}

/// Specific (low-bin) edges stand out; unspecific ones fade.
pub fn edge_opacity(node_degree_bin: Option<f64>) -> f64 {
    match node_degree_bin {
        None => MISSING_BIN_OPACITY,
        Some(bin) => (1.05 - bin / 10.0).clamp(MISSING_BIN_OPACITY, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: GeneId, degree: Option<f64>, query: bool) -> GraphNode {
        GraphNode {
            gene_id: id,
            label: format!("G{id}"),
            is_query_gene: query,
            node_degree: degree,
            node_degree_bin: degree.map(|d| d * 10.0),
            official_name: None,
            ncbi_id: None,
        }
    }

    fn edge(sign: SupportSign, support: u32, bin: Option<f64>) -> GraphEdge {
        GraphEdge {
            key: "G2toG1".into(),
            source: "G1".into(),
            source_id: 1,
            target: "G2".into(),
            target_id: 2,
            positive_support: support,
            negative_support: 0,
            support,
            support_sign: sign,
            node_degree_bin: bin,
        }
    }

    #[test]
    fn test_degree_classes() {
        let t = DegreeThresholds::default();
        assert_eq!(DegreeClass::from_degree(Some(0.9), &t), DegreeClass::Lowest);
        assert_eq!(DegreeClass::from_degree(Some(0.65), &t), DegreeClass::Low);
        assert_eq!(DegreeClass::from_degree(Some(0.5), &t), DegreeClass::Moderate);
        assert_eq!(DegreeClass::from_degree(Some(0.3), &t), DegreeClass::High);
        assert_eq!(DegreeClass::from_degree(Some(0.2), &t), DegreeClass::Highest);
        assert_eq!(DegreeClass::from_degree(None, &t), DegreeClass::Lowest);
    }

    #[test]
    fn test_query_node_gets_border() {
        let config = StyleConfig::default();
        let styler = GraphStyler::new(&config);
        let s = styler.node_style(&node(1, Some(0.1), true));
        assert_eq!(s.border_width, 3);
        assert_eq!(s.border_color, config.query_border_color);
        assert_eq!(s.fill, config.degree_colors.highest);
    }

    #[test]
    fn test_plain_fill_without_emphasis() {
        let config = StyleConfig::default();
        let styler = GraphStyler::new(&config).with_degree_emphasis(false);
        let s = styler.node_style(&node(2, Some(0.1), false));
        assert_eq!(s.fill, config.node_color);
        assert_eq!(s.border_width, 0);
    }

    #[test]
    fn test_overlay_wins_over_degree_color() {
        let config = StyleConfig::default();
        let styler = GraphStyler::new(&config).with_overlay([2]);
        let s = styler.node_style(&node(2, Some(0.1), false));
        assert!(s.overlay);
        assert_eq!(s.fill, config.overlay_color);
    }

    #[test]
    fn test_edge_color_and_width() {
        let config = StyleConfig::default();
        let styler = GraphStyler::new(&config);
        let s = styler.edge_style(&edge(SupportSign::Both, 12, Some(2.0)));
        assert_eq!(s.color, config.support_color_both);
        assert_eq!(s.width, 6.0);
        assert!((s.opacity - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_edge_opacity_bounds() {
        assert_eq!(edge_opacity(None), 0.05);
        assert_eq!(edge_opacity(Some(0.0)), 1.0);
        assert!((edge_opacity(Some(10.0)) - 0.05).abs() < 1e-9);
    }
}
