//! Error types for graph validation and run startup.
//!
//! Executor-level faults are not errors here: they are `NodeResult::Failure`
//! values consumed by the engine's retry and failure-path logic.

use thiserror::Error;

/// Structural invariant violation in a graph.
///
/// Returned by `FlowGraph::validate()` and by the engine before any node
/// executes. A violation is an editor bug, not a runtime fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// The graph has no Start node.
    #[error("graph has no Start node")]
    MissingStart,

    /// The graph has more than one Start node.
    #[error("graph has {0} Start nodes, expected exactly one")]
    MultipleStarts(usize),

    /// Two nodes share an id.
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    /// Two edges share an id.
    #[error("duplicate edge id: {0}")]
    DuplicateEdgeId(String),

    /// An edge references a node id that does not exist.
    #[error("edge {edge_id} references unknown node {node_id}")]
    DanglingEdge { edge_id: String, node_id: String },

    /// An edge connects a node to itself.
    #[error("edge {edge_id} connects a node to itself")]
    SelfLoop { edge_id: String },

    /// A node designates more than one failure edge.
    #[error("node {node_id} has more than one failure edge")]
    MultipleFailureEdges { node_id: String },
}

/// Error starting a run.
#[derive(Debug, Error)]
pub enum StartError {
    /// The graph failed structural validation; no node executed.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// A run is already active on this engine; stop it first.
    #[error("a run is already active on this engine")]
    AlreadyRunning,
}
