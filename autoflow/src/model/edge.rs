//! Flow edges and the conditions that guard them.
//!
//! Conditional edges are the core design: branching, waits, and retry budgets
//! live on edges rather than as standalone nodes, so a graph stays readable
//! on a small screen.

use serde::{Deserialize, Serialize};

use super::new_id;

/// A directed edge between two nodes.
///
/// An edge with `is_failure_path = true` is consulted only when its source
/// node's executor reports failure; it never takes part in normal traversal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub id: String,
    pub from_node_id: String,
    pub to_node_id: String,
    #[serde(default)]
    pub condition: Option<EdgeCondition>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub is_failure_path: bool,
}

impl FlowEdge {
    /// New unconditional edge between two nodes with a fresh id.
    pub fn new(from_node_id: impl Into<String>, to_node_id: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            from_node_id: from_node_id.into(),
            to_node_id: to_node_id.into(),
            condition: None,
            label: None,
            is_failure_path: false,
        }
    }

    /// Attaches a condition.
    pub fn with_condition(mut self, condition: EdgeCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Sets a display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Marks this edge as the source node's failure path.
    pub fn as_failure_path(mut self) -> Self {
        self.is_failure_path = true;
        self
    }
}

/// Condition attached to an edge to control traversal.
///
/// Closed set; the evaluator and the engine match exhaustively so a new
/// variant cannot silently fall through unhandled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeCondition {
    /// Always follow this edge.
    Always,
    /// Follow this edge after suspending for a fixed duration.
    WaitSeconds { seconds: f32 },
    /// Follow if the context text at `key` contains `substring` (case-insensitive).
    IfTextContains { key: String, substring: String },
    /// Follow if the context text at `key` does not contain `substring`;
    /// an absent key counts as "does not contain".
    IfNotTextContains { key: String, substring: String },
    /// Follow if the stringified context value at `key` equals `value`.
    IfContextEquals { key: String, value: String },
    /// Follow if the stringified context value at `key` differs from `value`;
    /// an absent key counts as not-equal.
    IfNotContextEquals { key: String, value: String },
    /// Follow if the boolean flag `{key}_found` is set in the context.
    IfImageFound { key: String },
    /// Follow if the boolean flag `{key}_found` is absent or false.
    IfNotImageFound { key: String },
    /// Declares the source node's retry budget. Never traversed: the engine
    /// consults it when the node fails, before falling through to the
    /// failure path.
    Retry { max_attempts: u32, delay_ms: u64 },
    /// Follow only if no other non-failure edge of the same node matched.
    Else,
    /// End the run successfully without following any further node.
    StopExecution,
}

impl EdgeCondition {
    /// Retry budget with the defaults the editor offers.
    pub fn retry_default() -> Self {
        EdgeCondition::Retry {
            max_attempts: 3,
            delay_ms: 2000,
        }
    }
}
