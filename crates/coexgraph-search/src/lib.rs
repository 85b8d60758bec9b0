//! coexgraph-search — Search service contract, HTTP and in-memory clients,
//! and the two-stage search pipeline.

pub mod service;
pub mod http;
pub mod pipeline;

pub use http::HttpSearchService;
pub use pipeline::{SearchOutcome, SearchPipeline};
pub use service::{InMemorySearchService, SearchService};
