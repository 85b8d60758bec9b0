//! Stringency-based visibility filtering.
//!
//! Phase 1 decides visible nodes, always anchored to the query set. Phase 2
//! picks every qualifying edge among visible nodes, including edges between
//! two found genes that phase 1 could not see.

use std::collections::{BTreeSet, HashSet};

use coexgraph_common::entities::GeneId;
use serde::Serialize;

use crate::graph::CoexGraph;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisibleSets {
    pub node_ids: BTreeSet<GeneId>,
    pub edge_keys: BTreeSet<String>,
}

impl VisibleSets {
    pub fn is_node_visible(&self, gene_id: GeneId) -> bool {
        self.node_ids.contains(&gene_id)
    }

    pub fn is_edge_visible(&self, key: &str) -> bool {
        self.edge_keys.contains(key)
    }
}

/// Compute the visible subset of `graph` at `stringency`.
/// The caller validates `stringency` against the configured minimum.
pub fn filter_by_stringency(
    graph: &CoexGraph,
    query_ids: &HashSet<GeneId>,
    stringency: u32,
    query_genes_only: bool,
) -> VisibleSets {
    let node_ids: BTreeSet<GeneId> = if query_genes_only {
        query_ids.iter().copied().collect()
    } else {
        anchored_nodes(graph, query_ids, stringency)
    };

    let edge_keys = graph
        .edges
        .iter()
        .filter(|e| {
            e.support >= stringency
                && node_ids.contains(&e.source_id)
                && node_ids.contains(&e.target_id)
        })
        .map(|e| e.key.clone())
        .collect();

    VisibleSets { node_ids, edge_keys }
}

fn anchored_nodes(graph: &CoexGraph, query_ids: &HashSet<GeneId>, stringency: u32) -> BTreeSet<GeneId> {
    let mut visible: BTreeSet<GeneId> = query_ids.iter().copied().collect();
    for edge in graph.edges.iter().filter(|e| e.support >= stringency) {
        if query_ids.contains(&edge.source_id) || query_ids.contains(&edge.target_id) {
            visible.insert(edge.source_id);
            visible.insert(edge.target_id);
        }
    }
    visible
}
