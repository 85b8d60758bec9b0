/// Core entity types exchanged with the coexpression search service.
/// Field names follow the service's camelCase JSON.

use serde::{Deserialize, Serialize};

pub type GeneId = i64;

// ---------------------------------------------------------------------------
// Gene
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gene {
    pub id: GeneId,
    #[serde(rename = "officialSymbol")]
    pub symbol: String,
    #[serde(default)]
    pub official_name: Option<String>,
    #[serde(default)]
    pub ncbi_id: Option<String>,
    /// Specificity score in [0, 1]. `None` when the server has no data.
    #[serde(default)]
    pub node_degree: Option<f64>,
}

impl Gene {
    pub fn new(id: GeneId, symbol: impl Into<String>) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            official_name: None,
            ncbi_id: None,
            node_degree: None,
        }
    }

    pub fn with_node_degree(mut self, node_degree: f64) -> Self {
        self.node_degree = Some(node_degree);
        self
    }

    pub fn with_official_name(mut self, name: impl Into<String>) -> Self {
        self.official_name = Some(name.into());
        self
    }

    pub fn with_ncbi_id(mut self, ncbi_id: impl Into<String>) -> Self {
        self.ncbi_id = Some(ncbi_id.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Support sign
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportSign {
    Positive,
    Negative,
    Both,
}

impl SupportSign {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportSign::Positive => "positive",
            SupportSign::Negative => "negative",
            SupportSign::Both     => "both",
        }
    }
}

/// Collapse positive/negative counts into a single support value and sign.
/// Both nonzero gives the max with sign `Both`; a zero/zero pair reports
/// support 0 as `Positive`.
pub fn derive_support(positive: u32, negative: u32) -> (u32, SupportSign) {
    match (positive > 0, negative > 0) {
        (true, true)  => (positive.max(negative), SupportSign::Both),
        (false, true) => (negative, SupportSign::Negative),
        _             => (positive, SupportSign::Positive),
    }
}

// ---------------------------------------------------------------------------
// Coexpression result (edge candidate)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoexpressionResult {
    pub query_gene: Gene,
    pub found_gene: Gene,
    #[serde(rename = "posSupp")]
    pub positive_support: u32,
    #[serde(rename = "negSupp")]
    pub negative_support: u32,
    /// Datasets tested. Omitted by the server in query-genes-only mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_tested_in: Option<u32>,
}

impl CoexpressionResult {
    pub fn new(query_gene: Gene, found_gene: Gene, positive_support: u32, negative_support: u32) -> Self {
        Self {
            query_gene,
            found_gene,
            positive_support,
            negative_support,
            num_tested_in: None,
        }
    }

    pub fn with_num_tested_in(mut self, tested: u32) -> Self {
        self.num_tested_in = Some(tested);
        self
    }

    pub fn support(&self) -> u32 {
        derive_support(self.positive_support, self.negative_support).0
    }

    pub fn support_sign(&self) -> SupportSign {
        derive_support(self.positive_support, self.negative_support).1
    }

    /// True if either direction of support reaches the threshold.
    pub fn meets_stringency(&self, stringency: u32) -> bool {
        self.positive_support >= stringency || self.negative_support >= stringency
    }

    /// Edge key as used by the rendering layer.
    pub fn edge_key(&self) -> String {
        format!("{}to{}", self.found_gene.symbol, self.query_gene.symbol)
    }

    /// The larger of the two endpoint degrees, ignoring a missing one.
    pub fn specificity(&self) -> Option<f64> {
        match (self.found_gene.node_degree, self.query_gene.node_degree) {
            (Some(f), Some(q)) => Some(f.max(q)),
            (Some(f), None)    => Some(f),
            (None, q)          => q,
        }
    }
}

// ---------------------------------------------------------------------------
// Search request / response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub gene_ids: Vec<GeneId>,
    pub stringency: u32,
    pub query_genes_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub query_genes: Vec<Gene>,
    #[serde(default)]
    pub known_gene_results: Vec<CoexpressionResult>,
    /// Informational note from the server, e.g. that results were trimmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_state: Option<String>,
}

impl SearchResponse {
    /// A response the client can draw something from.
    pub fn has_data(&self) -> bool {
        self.error_state.is_none() && !self.query_genes.is_empty()
    }
}

/// Round to four decimal places, the precision used for display and export.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_both_takes_max() {
        assert_eq!(derive_support(1, 2), (2, SupportSign::Both));
        assert_eq!(derive_support(5, 3), (5, SupportSign::Both));
    }

    #[test]
    fn test_support_single_direction() {
        assert_eq!(derive_support(3, 0), (3, SupportSign::Positive));
        assert_eq!(derive_support(0, 4), (4, SupportSign::Negative));
    }

    #[test]
    fn test_edge_key_is_found_to_query() {
        let r = CoexpressionResult::new(Gene::new(1, "G1"), Gene::new(3, "G3"), 3, 0);
        assert_eq!(r.edge_key(), "G3toG1");
    }

    #[test]
    fn test_specificity_ignores_missing_degree() {
        let r = CoexpressionResult::new(
            Gene::new(1, "G1").with_node_degree(0.2),
            Gene::new(2, "G2"),
            2,
            0,
        );
        assert_eq!(r.specificity(), Some(0.2));
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(0.5), 0.5);
    }

    #[test]
    fn test_response_wire_names() {
        let json = r#"{
            "queryGenes": [{"id": 1, "officialSymbol": "G1"}],
            "knownGeneResults": [{
                "queryGene": {"id": 1, "officialSymbol": "G1", "nodeDegree": 0.4},
                "foundGene": {"id": 3, "officialSymbol": "G3", "ncbiId": "1234"},
                "posSupp": 3,
                "negSupp": 0,
                "numTestedIn": 12
            }]
        }"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(resp.has_data());
        let r = &resp.known_gene_results[0];
        assert_eq!(r.found_gene.ncbi_id.as_deref(), Some("1234"));
        assert_eq!(r.num_tested_in, Some(12));
        assert_eq!(r.support_sign(), SupportSign::Positive);
    }
}
