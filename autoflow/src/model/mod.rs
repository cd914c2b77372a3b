//! Data model: graphs, nodes, edges, and edge conditions.
//!
//! The model is a closed, serde-tagged set so persisted flows stay stable
//! across releases. Graph values are immutable per version: mutators return
//! new values, accessors are pure.

mod edge;
mod graph;
mod node;

pub use edge::{EdgeCondition, FlowEdge};
pub use graph::FlowGraph;
pub use node::{
    CoordinateSource, FlowNode, FlowNodeType, GestureType, NodeKind, NodePosition, Point, Region,
    ScreenMlMode,
};

/// Fresh v4 id for graphs, nodes, and edges.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current wall-clock time in epoch milliseconds, the timestamp unit the
/// persisted format uses.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
