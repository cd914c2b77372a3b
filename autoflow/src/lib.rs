//! # Autoflow
//!
//! A flow automation engine in Rust. Build device automation flows as
//! directed graphs of typed nodes (gestures, visual triggers, screen
//! understanding, delays) wired by conditional edges, then run them on an
//! async engine with timeouts, retries and cooperative cancellation.
//!
//! ## Design Principles
//!
//! - **Graph as data**: A [`FlowGraph`] is a plain serializable value. It is
//!   edited, validated, persisted and exported as JSON; only the engine
//!   gives it behavior.
//! - **One executor per node type**: Each [`NodeKind`] maps to one
//!   [`NodeExecutor`] that performs the node's effect and returns a
//!   [`NodeResult`]. Executors never pick the next node.
//! - **Pure routing**: Edge selection is a pure function of the edge list
//!   and the [`FlowContext`] blackboard, so a flow's branching can be
//!   tested without running anything.
//! - **Platform seams**: All device access (gestures, screen capture,
//!   template search, OCR, app launching) goes through traits in
//!   [`platform`], with mock implementations for tests.
//!
//! ## Main Modules
//!
//! - [`model`]: `FlowGraph`, `FlowNode`, `FlowEdge`, `EdgeCondition` and
//!   structural validation.
//! - [`context`]: the `FlowContext` blackboard executors read and write.
//! - [`engine`]: `FlowEngine`, `RunState`, the edge evaluator and the
//!   built-in node executors.
//! - [`platform`]: device capability traits plus mocks.
//! - [`store`]: directory-backed JSON persistence with import/export.
//! - [`history`]: bounded undo/redo snapshots for editors.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use autoflow::{FlowEdge, FlowEngine, FlowGraph, FlowNode};
//! use autoflow::platform::FlowServices;
//! use tokio_stream::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let start = FlowNode::start(None);
//! let delay = FlowNode::delay(500);
//! let edge = FlowEdge::new(&start.id, &delay.id);
//! let graph = FlowGraph::new("demo")
//!     .with_node(start)
//!     .with_node(delay)
//!     .with_edge(edge);
//!
//! let engine = FlowEngine::new(FlowServices::simulated());
//! let mut states = engine.start(graph).unwrap();
//! while let Some(state) = states.next().await {
//!     println!("{state:?}");
//! }
//! # }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod history;
pub mod model;
pub mod platform;
pub mod store;

pub use context::{ContextValue, FlowContext};
pub use engine::{FlowEngine, NodeExecutor, NodeResult, RunState};
pub use error::{StartError, StructuralError};
pub use history::GraphHistory;
pub use model::{
    CoordinateSource, EdgeCondition, FlowEdge, FlowGraph, FlowNode, FlowNodeType, GestureType,
    NodeKind, NodePosition, Point, Region, ScreenMlMode,
};
pub use store::{FlowStore, StoreError};
