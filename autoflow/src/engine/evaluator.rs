//! Edge condition evaluation: pure mapping from (edges, blackboard) to a
//! traversal decision.
//!
//! First match in declared order wins; `Else` edges are consulted only after
//! every other non-failure edge failed to match. `Retry` edges never take
//! part in traversal (the engine reads their budget on node failure), and
//! failure-path edges are routed separately. Timed waits are signalled by
//! the selected edge's condition; suspension itself belongs to the engine.

use crate::context::FlowContext;
use crate::model::{EdgeCondition, FlowEdge};

/// Tests a single condition against the blackboard. An absent condition
/// means "always follow".
pub fn matches(condition: Option<&EdgeCondition>, ctx: &FlowContext) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    match condition {
        EdgeCondition::Always => true,
        // Matches unconditionally; the engine suspends before transitioning.
        EdgeCondition::WaitSeconds { .. } => true,
        EdgeCondition::IfTextContains { key, substring } => contains_ci(ctx, key, substring),
        EdgeCondition::IfNotTextContains { key, substring } => !contains_ci(ctx, key, substring),
        EdgeCondition::IfContextEquals { key, value } => {
            ctx.get_stringified(key).is_some_and(|v| v == *value)
        }
        // Absence counts as not-equal.
        EdgeCondition::IfNotContextEquals { key, value } => {
            ctx.get_stringified(key).map_or(true, |v| v != *value)
        }
        EdgeCondition::IfImageFound { key } => found_flag(ctx, key),
        EdgeCondition::IfNotImageFound { key } => !found_flag(ctx, key),
        // Retry declares the source node's retry budget; it is not a branch.
        EdgeCondition::Retry { .. } => false,
        // Else matches only during the fallback pass in select_next.
        EdgeCondition::Else => true,
        // Selected like any unconditional edge; the engine halts the run.
        EdgeCondition::StopExecution => true,
    }
}

/// Picks the next edge to traverse among a node's outgoing edges: the first
/// matching non-failure, non-`Retry`, non-`Else` edge in declared order, and
/// only if none matched, the first `Else` edge.
pub fn select_next<'a>(edges: &[&'a FlowEdge], ctx: &FlowContext) -> Option<&'a FlowEdge> {
    let candidates = edges
        .iter()
        .filter(|e| !e.is_failure_path && !matches!(e.condition, Some(EdgeCondition::Retry { .. })));

    let (else_edges, normal): (Vec<&&FlowEdge>, Vec<&&FlowEdge>) =
        candidates.partition(|e| matches!(e.condition, Some(EdgeCondition::Else)));

    for edge in normal {
        if matches(edge.condition.as_ref(), ctx) {
            return Some(*edge);
        }
    }
    else_edges.first().map(|edge| **edge)
}

fn contains_ci(ctx: &FlowContext, key: &str, substring: &str) -> bool {
    ctx.get_text(key)
        .is_some_and(|text| text.to_lowercase().contains(&substring.to_lowercase()))
}

fn found_flag(ctx: &FlowContext, key: &str) -> bool {
    ctx.get_bool(&format!("{key}_found")).unwrap_or(false)
}
