//! Narrow rendering seam. The engine hands out read-only snapshots and never
//! draws anything itself.

use crate::filter::VisibleSets;
use crate::graph::CoexGraph;

pub trait GraphRenderer: Send {
    fn render(&mut self, graph: &CoexGraph, visible: &VisibleSets);
}

/// Keeps the last frame in memory. Useful for headless callers.
#[derive(Debug, Default)]
pub struct SnapshotRenderer {
    pub frames: usize,
    pub last_graph: Option<CoexGraph>,
    pub last_visible: Option<VisibleSets>,
}

impl GraphRenderer for SnapshotRenderer {
    fn render(&mut self, graph: &CoexGraph, visible: &VisibleSets) {
        self.frames += 1;
        self.last_graph = Some(graph.clone());
        self.last_visible = Some(visible.clone());
    }
}
