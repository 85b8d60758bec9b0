//! Search service contract and an in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use coexgraph_common::entities::{CoexpressionResult, Gene, GeneId, SearchRequest, SearchResponse};
use coexgraph_common::error::Result;

/// Remote coexpression search. Implementations never retry.
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;
}

// ── In-memory implementation ───────────────────────────────────────────────

/// Answers searches from a fixed set of gene links. Used for offline
/// browsing of a saved result and in tests.
///
/// Each link is stored once and reported from whichever endpoint was asked
/// about, the way the server orients results toward the query gene.
pub struct InMemorySearchService {
    genes: HashMap<GeneId, Gene>,
    links: Vec<CoexpressionResult>,
    error_state: Option<String>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl InMemorySearchService {
    pub fn new() -> Self {
        Self {
            genes: HashMap::new(),
            links: Vec::new(),
            error_state: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Seed from a saved response.
    pub fn from_response(response: &SearchResponse) -> Self {
        let mut service = Self::new();
        for gene in &response.query_genes {
            service.genes.insert(gene.id, gene.clone());
        }
        for link in &response.known_gene_results {
            service = service.with(link.clone());
        }
        service
    }

    /// Add a gene link.
    pub fn with(mut self, link: CoexpressionResult) -> Self {
        self.genes.entry(link.query_gene.id).or_insert_with(|| link.query_gene.clone());
        self.genes.entry(link.found_gene.id).or_insert_with(|| link.found_gene.clone());
        self.links.push(link);
        self
    }

    /// Register a gene that has no links.
    pub fn with_gene(mut self, gene: Gene) -> Self {
        self.genes.insert(gene.id, gene);
        self
    }

    /// Answer every request with this server-side error.
    pub fn with_error_state(mut self, message: impl Into<String>) -> Self {
        self.error_state = Some(message.into());
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn answer(&self, request: &SearchRequest) -> SearchResponse {
        let query_genes: Vec<Gene> = request
            .gene_ids
            .iter()
            .filter_map(|id| self.genes.get(id).cloned())
            .collect();

        let asked = |id: GeneId| request.gene_ids.contains(&id);
        let known_gene_results = self
            .links
            .iter()
            .filter(|l| l.meets_stringency(request.stringency))
            .filter_map(|l| {
                let (q, f) = (asked(l.query_gene.id), asked(l.found_gene.id));
                if request.query_genes_only {
                    (q && f).then(|| oriented(l, false, true))
                } else if q {
                    Some(oriented(l, false, false))
                } else if f {
                    Some(oriented(l, true, false))
                } else {
                    None
                }
            })
            .collect();

        SearchResponse {
            query_genes,
            known_gene_results,
            display_info: None,
            error_state: None,
        }
    }
}

impl Default for InMemorySearchService {
    fn default() -> Self {
        Self::new()
    }
}

/// Orient a link toward the asked endpoint. Datasets-tested counts are not
/// reported for query-genes-only searches.
fn oriented(link: &CoexpressionResult, reversed: bool, query_genes_only: bool) -> CoexpressionResult {
    let mut out = link.clone();
    if reversed {
        std::mem::swap(&mut out.query_gene, &mut out.found_gene);
    }
    if query_genes_only {
        out.num_tested_in = None;
    }
    out
}

#[async_trait]
impl SearchService for InMemorySearchService {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        if let Some(error_state) = &self.error_state {
            return Ok(SearchResponse {
                error_state: Some(error_state.clone()),
                ..Default::default()
            });
        }
        Ok(self.answer(request))
    }
}
