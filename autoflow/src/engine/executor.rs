//! Node executor seam: one implementation per node kind.
//!
//! Executors are context-free single-step operations; suspension, timeout,
//! retry, and failure routing all live in the engine. Any internal fault is
//! reported as a `Failure` value carrying the cause text, never a panic.

use async_trait::async_trait;

use crate::context::FlowContext;
use crate::model::FlowNode;

/// Result of executing a single node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeResult {
    /// The node's step completed.
    Success,
    /// The node's step failed, with a human-readable reason.
    Failure(String),
}

impl NodeResult {
    pub fn failure(reason: impl Into<String>) -> Self {
        NodeResult::Failure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, NodeResult::Success)
    }
}

/// Kind-specific execution logic. Each concrete node kind has a matching
/// executor registered with the engine.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// Executes `node`, reading and writing the shared blackboard as needed.
    ///
    /// The engine guarantees exactly one executor is in flight at a time and
    /// polices `node.timeout_ms` around this call.
    async fn execute(&self, node: &FlowNode, ctx: &mut FlowContext) -> NodeResult;
}
