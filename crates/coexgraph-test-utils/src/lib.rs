//! coexgraph-test-utils — Fixtures and builders shared by integration tests.

use std::io::Write;

use coexgraph_common::entities::{CoexpressionResult, Gene, GeneId, SearchResponse};
use tempfile::NamedTempFile;

/// Gene with a symbol derived from its id, e.g. `G7`.
pub fn gene(id: GeneId) -> Gene {
    Gene::new(id, format!("G{id}"))
}

/// Result oriented from `query` to `found`, both built with [`gene`].
pub fn link(query: GeneId, found: GeneId, positive: u32, negative: u32) -> CoexpressionResult {
    CoexpressionResult::new(gene(query), gene(found), positive, negative)
}

#[derive(Debug, Default)]
pub struct ResponseBuilder {
    response: SearchResponse,
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, ids: &[GeneId]) -> Self {
        self.response.query_genes.extend(ids.iter().map(|id| gene(*id)));
        self
    }

    pub fn query_gene(mut self, gene: Gene) -> Self {
        self.response.query_genes.push(gene);
        self
    }

    pub fn result(mut self, result: CoexpressionResult) -> Self {
        self.response.known_gene_results.push(result);
        self
    }

    pub fn error_state(mut self, message: &str) -> Self {
        self.response.error_state = Some(message.to_string());
        self
    }

    pub fn display_info(mut self, message: &str) -> Self {
        self.response.display_info = Some(message.to_string());
        self
    }

    pub fn build(self) -> SearchResponse {
        self.response
    }
}

/// Query genes G1 and G2, both linked to G3: G1–G3 with support 3 (positive),
/// G2–G3 with support 2 (both signs).
pub fn three_gene_scenario() -> SearchResponse {
    ResponseBuilder::new()
        .query(&[1, 2])
        .result(link(1, 3, 3, 0))
        .result(link(2, 3, 1, 2))
        .build()
}

/// A response with named, specific genes for export and style tests.
pub fn ribosomal_response() -> SearchResponse {
    let rpl3 = Gene::new(6122, "RPL3")
        .with_ncbi_id("6122")
        .with_official_name("ribosomal protein L3")
        .with_node_degree(0.12);
    let rpl4 = Gene::new(6124, "RPL4")
        .with_ncbi_id("6124")
        .with_official_name("ribosomal protein L4")
        .with_node_degree(0.31);
    let actb = Gene::new(60, "ACTB")
        .with_ncbi_id("60")
        .with_official_name("actin beta")
        .with_node_degree(0.8);
    ResponseBuilder::new()
        .query_gene(rpl3.clone())
        .result(CoexpressionResult::new(rpl3.clone(), rpl4, 14, 0).with_num_tested_in(52))
        .result(CoexpressionResult::new(rpl3, actb, 3, 4).with_num_tested_in(48))
        .build()
}

/// Write a response as JSON to a temporary file.
pub fn response_file(response: &SearchResponse) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("create temp file");
    let json = serde_json::to_string_pretty(response).expect("serialize response");
    file.write_all(json.as_bytes()).expect("write temp file");
    file
}
