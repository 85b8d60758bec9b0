//! Node selection helpers: symbol search, match counts and restricting a
//! selection to what is currently shown.

use std::collections::HashSet;

use coexgraph_common::entities::GeneId;
use serde::Serialize;

use crate::filter::VisibleSets;
use crate::graph::CoexGraph;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchCounts {
    pub total: usize,
    pub hidden: usize,
}

/// Ids of nodes whose symbol contains `text`, ignoring case. Text shorter than
/// `min_len` matches nothing.
pub fn genes_matching_text(graph: &CoexGraph, text: &str, min_len: usize) -> Vec<GeneId> {
    let needle = text.trim().to_lowercase();
    if needle.chars().count() < min_len {
        return Vec::new();
    }
    graph
        .nodes
        .iter()
        .filter(|n| n.label.to_lowercase().contains(&needle))
        .map(|n| n.gene_id)
        .collect()
}

/// How many of `gene_ids` are graph nodes, and how many of those are hidden.
pub fn count_matching(graph: &CoexGraph, gene_ids: &[GeneId], visible: &VisibleSets) -> MatchCounts {
    let mut counts = MatchCounts::default();
    for id in gene_ids.iter().copied().collect::<HashSet<_>>() {
        if graph.contains_node(id) {
            counts.total += 1;
            if !visible.is_node_visible(id) {
                counts.hidden += 1;
            }
        }
    }
    counts
}

/// Drop selected ids that are filtered out, so hidden nodes never seed a new search.
pub fn restrict_selection(selected: &[GeneId], visible: &VisibleSets) -> Vec<GeneId> {
    selected
        .iter()
        .copied()
        .filter(|id| visible.is_node_visible(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::filter_by_stringency;
    use crate::graph::build_graph;
    use coexgraph_common::entities::{CoexpressionResult, Gene};

    fn graph() -> (CoexGraph, HashSet<GeneId>) {
        let q: HashSet<GeneId> = [1].into_iter().collect();
        let results = vec![
            CoexpressionResult::new(Gene::new(1, "RPL3"), Gene::new(2, "RPL4"), 5, 0),
            CoexpressionResult::new(Gene::new(1, "RPL3"), Gene::new(3, "ACTB"), 2, 0),
        ];
        (build_graph(&[], &results, &q, 60), q)
    }

    #[test]
    fn test_text_match_is_case_insensitive() {
        let (g, _) = graph();
        let mut ids = genes_matching_text(&g, "rpl", 2);
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_short_text_matches_nothing() {
        let (g, _) = graph();
        assert!(genes_matching_text(&g, "r", 2).is_empty());
    }

    #[test]
    fn test_counts_and_restriction() {
        let (g, q) = graph();
        let visible = filter_by_stringency(&g, &q, 4, false);
        let counts = count_matching(&g, &[1, 2, 3, 99], &visible);
        assert_eq!(counts, MatchCounts { total: 3, hidden: 1 });
        assert_eq!(restrict_selection(&[3, 2], &visible), vec![2]);
    }
}
