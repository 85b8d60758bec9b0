//! coexgraph-store — Key-value persistence for saved gene sets.

pub mod kv;
pub mod gene_sets;

pub use gene_sets::{GeneSetStore, SavedGeneSet};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
