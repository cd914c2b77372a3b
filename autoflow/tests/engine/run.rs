//! End-to-end runs: event ordering, structural rejection, dead-end policy.

use std::sync::Arc;
use std::time::{Duration, Instant};

use autoflow::model::{EdgeCondition, FlowEdge, FlowGraph, FlowNode, FlowNodeType};
use autoflow::platform::FlowServices;
use autoflow::{FlowEngine, RunState, StartError, StructuralError};

use crate::common::{drain, probe_node, ScriptedExecutor};

/// **Scenario**: a minimal start -> delay flow emits Running/NodeCompleted
/// per node and ends Succeeded with the last node's label.
#[tokio::test]
async fn linear_flow_emits_ordered_events() {
    let start = FlowNode::start(None);
    let delay = FlowNode::delay(20).with_label("short wait");
    let graph = FlowGraph::new("linear")
        .with_node(start.clone())
        .with_node(delay.clone())
        .with_edge(FlowEdge::new(&start.id, &delay.id));

    let engine = FlowEngine::new(FlowServices::simulated());
    let events = drain(engine.start(graph).unwrap()).await;

    assert_eq!(
        events,
        vec![
            RunState::Running {
                node_id: start.id.clone(),
                label: "Start".into(),
            },
            RunState::NodeCompleted {
                node_id: start.id.clone(),
            },
            RunState::Running {
                node_id: delay.id.clone(),
                label: "short wait".into(),
            },
            RunState::NodeCompleted {
                node_id: delay.id.clone(),
            },
            RunState::Succeeded {
                last_label: Some("short wait".into()),
            },
        ]
    );
}

/// **Scenario**: a Delay node suspends for at least its configured duration.
#[tokio::test]
async fn delay_node_waits_at_least_its_duration() {
    let start = FlowNode::start(None);
    let delay = FlowNode::delay(200);
    let graph = FlowGraph::new("timed")
        .with_node(start.clone())
        .with_node(delay.clone())
        .with_edge(FlowEdge::new(&start.id, &delay.id));

    let engine = FlowEngine::new(FlowServices::simulated());
    let began = Instant::now();
    let events = drain(engine.start(graph).unwrap()).await;

    assert!(began.elapsed() >= Duration::from_millis(200));
    assert!(matches!(events.last(), Some(RunState::Succeeded { .. })));
}

#[tokio::test]
async fn structurally_invalid_graph_is_rejected_before_execution() {
    let graph = FlowGraph::new("no start").with_node(FlowNode::delay(10));

    let engine = FlowEngine::new(FlowServices::simulated());
    match engine.start(graph) {
        Err(StartError::Structural(StructuralError::MissingStart)) => {}
        other => panic!("expected MissingStart, got {other:?}"),
    }
    assert!(!engine.is_running());
}

/// **Scenario**: a node succeeds but none of its outgoing edges match; the
/// run fails instead of silently completing.
#[tokio::test]
async fn unmatched_outgoing_edges_fail_the_run() {
    let start = FlowNode::start(None);
    let probe = probe_node("probe");
    let unreached = FlowNode::delay(10).with_label("unreached");
    let graph = FlowGraph::new("dead end")
        .with_node(start.clone())
        .with_node(probe.clone())
        .with_node(unreached.clone())
        .with_edge(FlowEdge::new(&start.id, &probe.id))
        .with_edge(
            FlowEdge::new(&probe.id, &unreached.id).with_condition(
                EdgeCondition::IfContextEquals {
                    key: "status".into(),
                    value: "ready".into(),
                },
            ),
        );

    let engine = FlowEngine::new(FlowServices::simulated())
        .with_executor(FlowNodeType::Gesture, Arc::new(ScriptedExecutor::succeeding()));
    let events = drain(engine.start(graph).unwrap()).await;

    match events.last() {
        Some(RunState::Failed {
            node_id: Some(id),
            reason,
            ..
        }) => {
            assert_eq!(id, &probe.id);
            assert_eq!(reason, "no matching edge");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}
