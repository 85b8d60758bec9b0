//! Ordered, bounded set of query gene ids (oldest first).

use std::collections::HashSet;

use coexgraph_common::entities::GeneId;
use coexgraph_common::error::{CoexError, Result};
use serde::Serialize;

/// What to do when an extension would push the query set past its cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Report the overflow so the caller can ask the user.
    #[default]
    Reject,
    /// Drop the oldest query genes. Only pass this after the user confirmed.
    TruncateOldest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryGeneSet {
    ids: Vec<GeneId>,
    #[serde(skip)]
    max: usize,
}

impl QueryGeneSet {
    pub fn new(max: usize) -> Self {
        Self { ids: Vec::new(), max }
    }

    /// Build from a selection, deduplicating while keeping first-seen order.
    pub fn from_selection(selection: &[GeneId], max: usize) -> Result<Self> {
        let ids = dedup(selection);
        if ids.is_empty() {
            return Err(CoexError::NoGenesSelected);
        }
        if ids.len() > max {
            return Err(CoexError::TooManyGenes { requested: ids.len(), max });
        }
        Ok(Self { ids, max })
    }

    pub fn ids(&self) -> &[GeneId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn contains(&self, gene_id: GeneId) -> bool {
        self.ids.contains(&gene_id)
    }

    pub fn as_hash_set(&self) -> HashSet<GeneId> {
        self.ids.iter().copied().collect()
    }

    /// The set that would result from adding `selection`. Does not modify
    /// `self`; commit with [`QueryGeneSet::replace`] once the search succeeds.
    pub fn extended_with(&self, selection: &[GeneId], policy: OverflowPolicy) -> Result<QueryGeneSet> {
        let selection = dedup(selection);
        if selection.is_empty() {
            return Err(CoexError::NoGenesSelected);
        }
        if selection.len() > self.max {
            return Err(CoexError::TooManyGenes { requested: selection.len(), max: self.max });
        }
        if selection.iter().all(|id| self.contains(*id)) {
            return Err(CoexError::NothingNewToExtend);
        }

        let new_count = selection.iter().filter(|id| !self.contains(**id)).count();
        let requested = self.ids.len() + new_count;

        let ids = if requested <= self.max {
            let mut ids = self.ids.clone();
            ids.extend(selection.iter().copied().filter(|id| !self.ids.contains(id)));
            ids
        } else {
            match policy {
                OverflowPolicy::Reject => {
                    return Err(CoexError::QueryGeneLimitExceeded {
                        requested,
                        max: self.max,
                        overflow: requested - self.max,
                    });
                }
                OverflowPolicy::TruncateOldest => {
                    // Keep every selected gene plus the most recent older ones that still fit.
                    let older: Vec<GeneId> = self
                        .ids
                        .iter()
                        .copied()
                        .filter(|id| !selection.contains(id))
                        .collect();
                    let keep = self.max - selection.len();
                    let mut ids: Vec<GeneId> = older[older.len().saturating_sub(keep)..].to_vec();
                    ids.extend(selection.iter().copied());
                    ids
                }
            }
        };

        Ok(QueryGeneSet { ids, max: self.max })
    }

    pub fn replace(&mut self, other: QueryGeneSet) {
        self.ids = other.ids;
    }
}

fn dedup(ids: &[GeneId]) -> Vec<GeneId> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
