//! Stateful coexpression graph engine.
//!
//! Owns the query gene set, the node id set and the current graph snapshot.
//! Every search is planned here, sent by the caller, and absorbed back. The
//! engine itself never performs I/O.

use std::collections::HashSet;

use coexgraph_common::entities::{GeneId, SearchRequest, SearchResponse};
use coexgraph_common::error::{CoexError, Result};
use coexgraph_common::settings::GraphLimits;
use tracing::{debug, info};

use crate::filter::{self, VisibleSets};
use crate::graph::{self, CoexGraph};
use crate::query_set::{OverflowPolicy, QueryGeneSet};
use crate::selection::{self, MatchCounts};
use crate::stringency::{restrict_results_stringency, StringencyDecision};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// Fresh search from a user selection.
    Initial,
    /// Grow the current graph around newly chosen query genes.
    Extend,
}

/// A search the caller should send, plus what to commit if it succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub kind: SearchKind,
    pub query_genes: QueryGeneSet,
    pub request: SearchRequest,
    pub display_stringency: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundOutcome {
    /// The server returned nothing usable. State is untouched.
    NoData(String),
    /// An extension found no gene that is not already drawn.
    NoNewResults,
    /// Send this query-genes-only request, then call `complete_round`.
    AnchoredFetch(SearchRequest),
    /// A new graph is loaded.
    Complete,
}

/// Half-finished round waiting for its anchored response.
#[derive(Debug, Clone)]
struct PendingRound {
    plan: SearchPlan,
}

pub struct CoexpressionGraphEngine {
    limits: GraphLimits,
    query_genes: QueryGeneSet,
    current_node_gene_ids: Vec<GeneId>,
    graph: Option<CoexGraph>,
    last_response: Option<SearchResponse>,
    results_stringency: u32,
    display_stringency: u32,
    query_genes_only: bool,
    display_info: Option<String>,
    pending: Option<PendingRound>,
}

impl CoexpressionGraphEngine {
    pub fn new(limits: GraphLimits) -> Self {
        let min = limits.min_stringency;
        Self {
            query_genes: QueryGeneSet::new(limits.max_gene_ids_per_query),
            limits,
            current_node_gene_ids: Vec::new(),
            graph: None,
            last_response: None,
            results_stringency: min,
            display_stringency: min,
            query_genes_only: false,
            display_info: None,
            pending: None,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn limits(&self) -> &GraphLimits {
        &self.limits
    }

    pub fn graph(&self) -> Option<&CoexGraph> {
        self.graph.as_ref()
    }

    pub fn query_gene_ids(&self) -> &[GeneId] {
        self.query_genes.ids()
    }

    pub fn current_node_gene_ids(&self) -> &[GeneId] {
        &self.current_node_gene_ids
    }

    pub fn results_stringency(&self) -> u32 {
        self.results_stringency
    }

    pub fn display_stringency(&self) -> u32 {
        self.display_stringency
    }

    pub fn query_genes_only(&self) -> bool {
        self.query_genes_only
    }

    /// Turn query-genes-only display on or off. Once a graph is loaded the
    /// flag needs at least two query genes and is refused otherwise; the
    /// return value is the flag now in effect.
    pub fn set_query_genes_only(&mut self, on: bool) -> bool {
        if on && self.graph.is_some() && !self.query_genes_only_available() {
            debug!(query_genes = self.query_genes.len(), "Query-genes-only needs two query genes");
            self.query_genes_only = false;
            return false;
        }
        self.query_genes_only = on;
        on
    }

    pub fn query_genes_only_available(&self) -> bool {
        self.query_genes.len() >= 2
    }

    pub fn display_info(&self) -> Option<&str> {
        self.display_info.as_deref()
    }

    /// The response the current graph was built from.
    pub fn last_response(&self) -> Option<&SearchResponse> {
        self.last_response.as_ref()
    }

    fn clamp_stringency(&self, value: u32) -> u32 {
        value.max(self.limits.min_stringency)
    }

    // ── Planning ──────────────────────────────────────────────────────────────

    /// Plan a fresh search for `gene_ids`. The fetch stringency is lowered
    /// below the display value so small adjustments stay local. In
    /// query-genes-only mode the search is a single stage.
    pub fn plan_search(&mut self, gene_ids: &[GeneId], display_stringency: u32) -> Result<SearchPlan> {
        let query_genes = QueryGeneSet::from_selection(gene_ids, self.limits.max_gene_ids_per_query)?;
        let display_stringency = self.clamp_stringency(display_stringency);
        let stringency = restrict_results_stringency(display_stringency, self.limits.min_stringency);
        self.pending = None;
        info!(genes = query_genes.len(), display_stringency, stringency, "Planning coexpression search");
        Ok(SearchPlan {
            kind: SearchKind::Initial,
            request: SearchRequest {
                gene_ids: query_genes.ids().to_vec(),
                stringency,
                query_genes_only: self.query_genes_only && query_genes.len() >= 2,
            },
            query_genes,
            display_stringency,
        })
    }

    /// Start over from a selection of graph nodes at the minimum stringency.
    pub fn rerun_with_selection(&mut self, gene_ids: &[GeneId]) -> Result<SearchPlan> {
        let min = self.limits.min_stringency;
        let mut plan = self.plan_search(gene_ids, self.display_stringency)?;
        plan.request.stringency = min;
        Ok(plan)
    }

    pub fn extend_with_gene(&mut self, gene_id: GeneId) -> Result<SearchPlan> {
        if self.query_genes.contains(gene_id) {
            return Err(CoexError::AlreadyQueryGene(gene_id));
        }
        self.extend_with_genes(&[gene_id], OverflowPolicy::Reject)
    }

    /// Plan an extension. Pass `OverflowPolicy::TruncateOldest` only after the
    /// user agreed to drop old query genes.
    pub fn extend_with_genes(&mut self, gene_ids: &[GeneId], overflow: OverflowPolicy) -> Result<SearchPlan> {
        let query_genes = self.query_genes.extended_with(gene_ids, overflow)?;

        let mut ids = self.current_node_gene_ids.clone();
        let mut seen: HashSet<GeneId> = ids.iter().copied().collect();
        ids.extend(query_genes.ids().iter().copied().filter(|id| seen.insert(*id)));

        self.pending = None;
        info!(
            selected = gene_ids.len(),
            query_genes = query_genes.len(),
            request_ids = ids.len(),
            "Planning graph extension"
        );
        Ok(SearchPlan {
            kind: SearchKind::Extend,
            query_genes,
            request: SearchRequest {
                gene_ids: ids,
                stringency: self.limits.min_stringency,
                query_genes_only: false,
            },
            display_stringency: self.display_stringency,
        })
    }

    // ── Absorbing responses ───────────────────────────────────────────────────

    /// Absorb the first-stage response of a round.
    pub fn absorb_expansion(&mut self, plan: SearchPlan, response: SearchResponse) -> RoundOutcome {
        if !response.has_data() {
            let reason = no_data_reason(&response);
            info!(reason = %reason, "Search returned no data");
            return RoundOutcome::NoData(reason);
        }

        let known: HashSet<GeneId> = match plan.kind {
            SearchKind::Initial => HashSet::new(),
            SearchKind::Extend => self.current_node_gene_ids.iter().copied().collect(),
        };
        let mut grown: Vec<GeneId> = match plan.kind {
            SearchKind::Initial => Vec::new(),
            SearchKind::Extend => self.current_node_gene_ids.clone(),
        };
        let mut seen = known.clone();
        for gene in &response.query_genes {
            if seen.insert(gene.id) {
                grown.push(gene.id);
            }
        }
        let mut discovered = 0usize;
        for r in &response.known_gene_results {
            for id in [r.found_gene.id, r.query_gene.id] {
                if seen.insert(id) {
                    grown.push(id);
                }
            }
            if !known.contains(&r.found_gene.id) {
                discovered += 1;
            }
        }

        let kind = plan.kind;
        match kind {
            SearchKind::Extend if discovered == 0 => {
                info!("Extension found no new genes");
                RoundOutcome::NoNewResults
            }
            SearchKind::Initial
                if plan.request.query_genes_only || response.known_gene_results.is_empty() =>
            {
                debug!("Single-stage search, skipping anchored fetch");
                self.commit(plan, response);
                RoundOutcome::Complete
            }
            _ => {
                debug!(nodes = grown.len(), discovered, "Requesting anchored results");
                let request = SearchRequest {
                    gene_ids: grown,
                    stringency: plan.request.stringency,
                    query_genes_only: true,
                };
                self.pending = Some(PendingRound { plan });
                RoundOutcome::AnchoredFetch(request)
            }
        }
    }

    /// Absorb the anchored response and load the new graph.
    pub fn complete_round(&mut self, response: SearchResponse) -> Result<RoundOutcome> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| CoexError::Search("No search round in progress".into()))?;
        if !response.has_data() {
            let reason = no_data_reason(&response);
            info!(reason = %reason, "Anchored search returned no data");
            return Ok(RoundOutcome::NoData(reason));
        }
        self.commit(pending.plan, response);
        Ok(RoundOutcome::Complete)
    }

    /// Load results refetched for a lower display stringency.
    /// Supersedes any round still waiting for its anchored response.
    pub fn absorb_refetch(&mut self, display_stringency: u32, request: &SearchRequest, response: SearchResponse) -> RoundOutcome {
        if self.pending.take().is_some() {
            debug!("Refetch supersedes pending round");
        }
        if !response.has_data() {
            return RoundOutcome::NoData(no_data_reason(&response));
        }
        self.results_stringency = request.stringency;
        self.display_stringency = self.clamp_stringency(display_stringency);
        self.load_graph(response);
        RoundOutcome::Complete
    }

    fn commit(&mut self, plan: SearchPlan, response: SearchResponse) {
        self.query_genes.replace(plan.query_genes);
        if !self.query_genes_only_available() {
            self.query_genes_only = false;
        }
        self.results_stringency = plan.request.stringency;
        self.display_stringency = plan.display_stringency;
        self.load_graph(response);
    }

    fn load_graph(&mut self, response: SearchResponse) {
        let graph = self.build_graph(&response);
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            results_stringency = self.results_stringency,
            "Graph loaded"
        );
        self.current_node_gene_ids = graph.node_ids();
        self.display_info = response.display_info.clone();
        self.graph = Some(graph);
        self.last_response = Some(response);
    }

    /// Build a fresh graph from a response, tagging the current query genes.
    pub fn build_graph(&self, response: &SearchResponse) -> CoexGraph {
        graph::build_graph(
            &response.query_genes,
            &response.known_gene_results,
            &self.query_genes.as_hash_set(),
            self.limits.tooltip_max_len,
        )
    }

    // ── Filtering ─────────────────────────────────────────────────────────────

    pub fn filter_by_stringency(&self, stringency: u32, query_genes_only: bool) -> Result<VisibleSets> {
        if stringency < self.limits.min_stringency {
            return Err(CoexError::InvalidStringency { value: stringency, min: self.limits.min_stringency });
        }
        let graph = self.graph.as_ref().ok_or(CoexError::NoGraph)?;
        Ok(filter::filter_by_stringency(
            graph,
            &self.query_genes.as_hash_set(),
            stringency,
            query_genes_only,
        ))
    }

    /// Visible sets under the current display settings.
    pub fn visible(&self) -> Result<VisibleSets> {
        self.filter_by_stringency(self.display_stringency, self.query_genes_only)
    }

    /// Decide whether a new display stringency is a refilter or a refetch.
    pub fn request_stringency(&mut self, value: u32) -> StringencyDecision {
        let display_stringency = self.clamp_stringency(value);
        if display_stringency >= self.results_stringency {
            self.display_stringency = display_stringency;
            debug!(display_stringency, "Refiltering cached results");
            StringencyDecision::Refilter { display_stringency }
        } else {
            let stringency = restrict_results_stringency(display_stringency, self.limits.min_stringency);
            info!(display_stringency, stringency, "Stringency below loaded results, new search required");
            StringencyDecision::NewSearchRequired {
                display_stringency,
                request: SearchRequest {
                    gene_ids: self.current_node_gene_ids.clone(),
                    stringency,
                    query_genes_only: true,
                },
            }
        }
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    pub fn restrict_selection(&self, selected: &[GeneId]) -> Result<Vec<GeneId>> {
        Ok(selection::restrict_selection(selected, &self.visible()?))
    }

    pub fn genes_matching_text(&self, text: &str) -> Vec<GeneId> {
        match &self.graph {
            Some(graph) => selection::genes_matching_text(graph, text, self.limits.min_text_match_len),
            None => Vec::new(),
        }
    }

    pub fn count_matching(&self, gene_ids: &[GeneId]) -> Result<MatchCounts> {
        let graph = self.graph.as_ref().ok_or(CoexError::NoGraph)?;
        Ok(selection::count_matching(graph, gene_ids, &self.visible()?))
    }
}

fn no_data_reason(response: &SearchResponse) -> String {
    response
        .error_state
        .clone()
        .unwrap_or_else(|| "No query genes in response".to_string())
}
