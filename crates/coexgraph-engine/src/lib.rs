//! coexgraph-engine — Coexpression graph construction, stringency filtering
//! and incremental query-set management.

pub mod graph;
pub mod filter;
pub mod query_set;
pub mod stringency;
pub mod selection;
pub mod style;
pub mod render;
pub mod engine;

pub use engine::{CoexpressionGraphEngine, RoundOutcome, SearchKind, SearchPlan};
pub use filter::VisibleSets;
pub use graph::{CoexGraph, GraphEdge, GraphNode};
pub use query_set::{OverflowPolicy, QueryGeneSet};
pub use render::{GraphRenderer, SnapshotRenderer};
pub use stringency::StringencyDecision;
pub use style::{DegreeClass, GraphStyler};
