//! coexgraph-export — Tab-separated download table and GraphML export for
//! coexpression results.

pub mod graphml;
pub mod tsv;

pub use graphml::write_graphml;
pub use tsv::{parse_table, write_table, ExportPreamble, ExportRow};
