//! HTTP client for a remote coexpression search endpoint.
//!
//! POST `{base_url}/coexpression/search` with the camelCase request body;
//! the response body is a `SearchResponse`.

use std::time::Duration;

use async_trait::async_trait;
use coexgraph_common::entities::{SearchRequest, SearchResponse};
use coexgraph_common::error::{CoexError, Result};
use coexgraph_common::settings::SearchConfig;
use tracing::{debug, instrument, warn};

use crate::service::SearchService;

const SEARCH_PATH: &str = "coexpression/search";
const USER_AGENT:  &str = concat!("coexgraph/", env!("CARGO_PKG_VERSION"));

pub struct HttpSearchService {
    client: reqwest::Client,
    url: String,
}

impl HttpSearchService {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            url: search_url(&config.base_url),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn search_url(base_url: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), SEARCH_PATH)
}

#[async_trait]
impl SearchService for HttpSearchService {
    #[instrument(skip(self, request), fields(genes = request.gene_ids.len(), stringency = request.stringency))]
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let resp = self.client.post(&self.url).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, "Coexpression search failed");
            return Err(CoexError::Search(format!("HTTP {status}: {body}")));
        }
        let response: SearchResponse = resp.json().await?;
        debug!(
            query_genes = response.query_genes.len(),
            results = response.known_gene_results.len(),
            "Coexpression search returned"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_joins_cleanly() {
        assert_eq!(search_url("http://host:8080/"), "http://host:8080/coexpression/search");
        assert_eq!(search_url("http://host/gemma"), "http://host/gemma/coexpression/search");
    }

    #[test]
    fn test_builds_from_config() {
        let service = HttpSearchService::new(&SearchConfig::default()).unwrap();
        assert!(service.url().ends_with("/coexpression/search"));
    }
}
