//! Retry budget, failure paths, and timeout handling.

use std::sync::Arc;
use std::time::Duration;

use autoflow::model::{EdgeCondition, FlowEdge, FlowGraph, FlowNode, FlowNodeType};
use autoflow::platform::FlowServices;
use autoflow::{FlowEngine, NodeResult, RunState};

use crate::common::{drain, probe_node, ran_label, ScriptedExecutor, SleepingExecutor};

/// **Scenario**: max_attempts bounds total executions. With a budget of 3
/// the failing node runs exactly three times, then the run fails.
#[tokio::test]
async fn retry_budget_bounds_total_executions() {
    let start = FlowNode::start(None);
    let flaky = probe_node("flaky");
    let after = FlowNode::delay(10).with_label("after");
    let graph = FlowGraph::new("retrying")
        .with_node(start.clone())
        .with_node(flaky.clone())
        .with_node(after.clone())
        .with_edge(FlowEdge::new(&start.id, &flaky.id))
        .with_edge(
            FlowEdge::new(&flaky.id, &after.id).with_condition(EdgeCondition::Retry {
                max_attempts: 3,
                delay_ms: 10,
            }),
        );

    let scripted = Arc::new(ScriptedExecutor::failing());
    let engine = FlowEngine::new(FlowServices::simulated())
        .with_executor(FlowNodeType::Gesture, scripted.clone());
    let events = drain(engine.start(graph).unwrap()).await;

    assert_eq!(scripted.calls(), 3);
    match events.last() {
        Some(RunState::Failed { reason, .. }) => assert_eq!(reason, "scripted failure"),
        other => panic!("expected Failed, got {other:?}"),
    }
}

/// **Scenario**: a retry edge is a budget, never a route. When the node
/// recovers on a later attempt, traversal uses the other edges.
#[tokio::test]
async fn recovery_within_budget_continues_normally() {
    let start = FlowNode::start(None);
    let flaky = probe_node("flaky");
    let after = FlowNode::delay(10).with_label("after");
    let graph = FlowGraph::new("recovering")
        .with_node(start.clone())
        .with_node(flaky.clone())
        .with_node(after.clone())
        .with_edge(FlowEdge::new(&start.id, &flaky.id))
        .with_edge(
            FlowEdge::new(&flaky.id, &after.id).with_condition(EdgeCondition::Retry {
                max_attempts: 3,
                delay_ms: 10,
            }),
        )
        .with_edge(FlowEdge::new(&flaky.id, &after.id));

    let scripted = Arc::new(ScriptedExecutor::with_results(vec![
        NodeResult::failure("first attempt"),
        NodeResult::Success,
    ]));
    let engine = FlowEngine::new(FlowServices::simulated())
        .with_executor(FlowNodeType::Gesture, scripted.clone());
    let events = drain(engine.start(graph).unwrap()).await;

    assert_eq!(scripted.calls(), 2);
    assert!(ran_label(&events, "after"));
    assert!(matches!(events.last(), Some(RunState::Succeeded { .. })));
}

/// **Scenario**: once the budget is exhausted the failure edge is followed
/// instead of ending the run.
#[tokio::test]
async fn failure_edge_routes_after_budget_exhausted() {
    let start = FlowNode::start(None);
    let flaky = probe_node("flaky");
    let after = FlowNode::delay(10).with_label("after");
    let recovery = FlowNode::delay(10).with_label("recovery");
    let failure_edge = FlowEdge::new(&flaky.id, &recovery.id).as_failure_path();
    let graph = FlowGraph::new("recover path")
        .with_node(start.clone())
        .with_node(flaky.clone().with_failure_edge(&failure_edge.id))
        .with_node(after.clone())
        .with_node(recovery.clone())
        .with_edge(FlowEdge::new(&start.id, &flaky.id))
        .with_edge(
            FlowEdge::new(&flaky.id, &after.id).with_condition(EdgeCondition::Retry {
                max_attempts: 2,
                delay_ms: 10,
            }),
        )
        .with_edge(failure_edge);

    let scripted = Arc::new(ScriptedExecutor::failing());
    let engine = FlowEngine::new(FlowServices::simulated())
        .with_executor(FlowNodeType::Gesture, scripted.clone());
    let events = drain(engine.start(graph).unwrap()).await;

    assert_eq!(scripted.calls(), 2);
    assert!(ran_label(&events, "recovery"));
    assert!(!ran_label(&events, "after"));
    assert!(matches!(events.last(), Some(RunState::Succeeded { .. })));
}

/// **Scenario**: a node exceeding its timeout is treated as a failed node
/// and routed through its failure edge.
#[tokio::test]
async fn timeout_is_routed_like_a_failure() {
    let start = FlowNode::start(None);
    let slow = probe_node("slow").with_timeout_ms(50);
    let recovery = FlowNode::delay(10).with_label("recovery");
    let failure_edge = FlowEdge::new(&slow.id, &recovery.id).as_failure_path();
    let graph = FlowGraph::new("timing out")
        .with_node(start.clone())
        .with_node(slow.clone())
        .with_node(recovery.clone())
        .with_edge(FlowEdge::new(&start.id, &slow.id))
        .with_edge(failure_edge);

    let engine = FlowEngine::new(FlowServices::simulated()).with_executor(
        FlowNodeType::Gesture,
        Arc::new(SleepingExecutor::new(Duration::from_secs(10))),
    );
    let events = drain(engine.start(graph).unwrap()).await;

    assert!(ran_label(&events, "recovery"));
    assert!(matches!(events.last(), Some(RunState::Succeeded { .. })));
}

/// **Scenario**: a timeout with no failure edge fails the run with the
/// timeout as the reason.
#[tokio::test]
async fn timeout_without_failure_edge_fails_the_run() {
    let start = FlowNode::start(None);
    let slow = probe_node("slow").with_timeout_ms(50);
    let graph = FlowGraph::new("unhandled timeout")
        .with_node(start.clone())
        .with_node(slow.clone())
        .with_edge(FlowEdge::new(&start.id, &slow.id));

    let engine = FlowEngine::new(FlowServices::simulated()).with_executor(
        FlowNodeType::Gesture,
        Arc::new(SleepingExecutor::new(Duration::from_secs(10))),
    );
    let events = drain(engine.start(graph).unwrap()).await;

    match events.last() {
        Some(RunState::Failed { reason, .. }) => {
            assert_eq!(reason, "timed out after 50ms");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}
