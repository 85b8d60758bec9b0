//! Two-stage search pipeline.
//!
//! Stage 1 (`fetch_expansion`) asks for partners of the query genes. Stage 2
//! (`fetch_anchored`) asks for every link among all nodes found so far, in
//! query-genes-only mode, so edges between found genes are drawn too. The
//! loaded graph is then filtered and handed to a renderer.

use std::sync::Arc;

use coexgraph_common::entities::{GeneId, SearchRequest, SearchResponse};
use coexgraph_common::error::{CoexError, Result};
use coexgraph_engine::engine::{CoexpressionGraphEngine, RoundOutcome, SearchPlan};
use coexgraph_engine::filter::VisibleSets;
use coexgraph_engine::render::GraphRenderer;
use coexgraph_engine::stringency::StringencyDecision;
use tracing::{info, instrument, warn};

use crate::service::SearchService;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// A graph was loaded (or refiltered) and rendered.
    Rendered(VisibleSets),
    /// Extending found nothing beyond the current graph.
    NoNewResults,
    /// The search failed or returned nothing. The previous graph stays.
    NoData(String),
}

pub struct SearchPipeline {
    service: Arc<dyn SearchService>,
}

impl SearchPipeline {
    pub fn new(service: Arc<dyn SearchService>) -> Self {
        Self { service }
    }

    /// Stage 1: partners of the query genes.
    #[instrument(skip(self, request), fields(genes = request.gene_ids.len()))]
    pub async fn fetch_expansion(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.service.search(request).await
    }

    /// Stage 2: every link among the given nodes.
    #[instrument(skip(self, node_ids), fields(nodes = node_ids.len()))]
    pub async fn fetch_anchored(&self, node_ids: &[GeneId], stringency: u32) -> Result<SearchResponse> {
        let request = SearchRequest {
            gene_ids: node_ids.to_vec(),
            stringency,
            query_genes_only: true,
        };
        self.service.search(&request).await
    }

    /// Filter at the current display settings and draw.
    pub fn render(
        &self,
        engine: &CoexpressionGraphEngine,
        renderer: &mut dyn GraphRenderer,
    ) -> Result<SearchOutcome> {
        let graph = engine.graph().ok_or(CoexError::NoGraph)?;
        let visible = engine.visible()?;
        info!(
            visible_nodes = visible.node_ids.len(),
            visible_edges = visible.edge_keys.len(),
            display_stringency = engine.display_stringency(),
            "Rendering graph"
        );
        renderer.render(graph, &visible);
        Ok(SearchOutcome::Rendered(visible))
    }

    /// Run a planned search round to completion. Transport failures become
    /// `NoData` and leave the engine as it was.
    pub async fn run(
        &self,
        engine: &mut CoexpressionGraphEngine,
        plan: SearchPlan,
        renderer: &mut dyn GraphRenderer,
    ) -> Result<SearchOutcome> {
        let expansion = match self.fetch_expansion(&plan.request).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Expansion search failed: {e}");
                return Ok(SearchOutcome::NoData(e.to_string()));
            }
        };

        match engine.absorb_expansion(plan, expansion) {
            RoundOutcome::NoData(reason) => Ok(SearchOutcome::NoData(reason)),
            RoundOutcome::NoNewResults => Ok(SearchOutcome::NoNewResults),
            RoundOutcome::Complete => self.render(engine, renderer),
            RoundOutcome::AnchoredFetch(request) => {
                let anchored = match self.fetch_anchored(&request.gene_ids, request.stringency).await {
                    Ok(resp) => resp,
                    Err(e) => {
                        warn!("Anchored search failed: {e}");
                        return Ok(SearchOutcome::NoData(e.to_string()));
                    }
                };
                match engine.complete_round(anchored)? {
                    RoundOutcome::Complete => self.render(engine, renderer),
                    RoundOutcome::NoData(reason) => Ok(SearchOutcome::NoData(reason)),
                    other => Err(CoexError::Search(format!("Unexpected round outcome: {other:?}"))),
                }
            }
        }
    }

    /// Change the display stringency, refetching when it drops below what
    /// was loaded.
    pub async fn apply_stringency(
        &self,
        engine: &mut CoexpressionGraphEngine,
        value: u32,
        renderer: &mut dyn GraphRenderer,
    ) -> Result<SearchOutcome> {
        match engine.request_stringency(value) {
            StringencyDecision::Refilter { .. } => self.render(engine, renderer),
            StringencyDecision::NewSearchRequired { display_stringency, request } => {
                let response = match self.service.search(&request).await {
                    Ok(resp) => resp,
                    Err(e) => {
                        warn!("Stringency refetch failed: {e}");
                        return Ok(SearchOutcome::NoData(e.to_string()));
                    }
                };
                match engine.absorb_refetch(display_stringency, &request, response) {
                    RoundOutcome::NoData(reason) => Ok(SearchOutcome::NoData(reason)),
                    _ => self.render(engine, renderer),
                }
            }
        }
    }
}
