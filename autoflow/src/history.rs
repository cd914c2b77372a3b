//! Undo/redo history for graph editing.

use crate::model::FlowGraph;

const DEFAULT_CAPACITY: usize = 50;

/// Bounded snapshot history. Recording a new state after an undo discards
/// the redo branch, like a text editor.
pub struct GraphHistory {
    snapshots: Vec<FlowGraph>,
    cursor: usize,
    capacity: usize,
}

impl GraphHistory {
    pub fn new(initial: FlowGraph) -> Self {
        Self::with_capacity(initial, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(initial: FlowGraph, capacity: usize) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// The graph at the current position.
    pub fn current(&self) -> &FlowGraph {
        &self.snapshots[self.cursor]
    }

    /// Records a new snapshot, truncating any redo states. The oldest
    /// snapshot is dropped once the capacity is reached.
    pub fn record(&mut self, graph: FlowGraph) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(graph);
        if self.snapshots.len() > self.capacity {
            self.snapshots.remove(0);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Steps back one snapshot. `None` when already at the oldest state.
    pub fn undo(&mut self) -> Option<&FlowGraph> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Steps forward one snapshot. `None` when already at the newest state.
    pub fn redo(&mut self) -> Option<&FlowGraph> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }
}
