//! coexgraph-common — Shared types, errors, and settings used across all coexgraph crates.

pub mod error;
pub mod entities;
pub mod settings;
pub mod context;

// Re-export commonly used types
pub use context::SessionContext;
pub use entities::{CoexpressionResult, Gene, GeneId, SearchRequest, SearchResponse, SupportSign};
pub use error::{CoexError, Result};
pub use settings::CoexSettings;
