//! coexgraph-cli — Library half of the `coexgraph` binary.

pub mod commands;
pub mod text;
