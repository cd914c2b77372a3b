//! Condition-driven branching across a full run.

use std::sync::Arc;

use autoflow::model::{EdgeCondition, FlowEdge, FlowGraph, FlowNode, FlowNodeType};
use autoflow::platform::FlowServices;
use autoflow::{ContextValue, FlowEngine, RunState};

use crate::common::{drain, probe_node, ran_label, ContextWriter};

/// Branching fixture: start -> probe, then probe -> hit (IfTextContains)
/// and probe -> miss (Else).
fn branching_graph() -> FlowGraph {
    let start = FlowNode::start(None);
    let probe = probe_node("probe");
    let hit = FlowNode::delay(10).with_label("hit");
    let miss = FlowNode::delay(10).with_label("miss");
    FlowGraph::new("branching")
        .with_node(start.clone())
        .with_node(probe.clone())
        .with_node(hit.clone())
        .with_node(miss.clone())
        .with_edge(FlowEdge::new(&start.id, &probe.id))
        .with_edge(
            FlowEdge::new(&probe.id, &hit.id).with_condition(EdgeCondition::IfTextContains {
                key: "screen_text".into(),
                substring: "Welcome".into(),
            }),
        )
        .with_edge(FlowEdge::new(&probe.id, &miss.id).with_condition(EdgeCondition::Else))
}

/// **Scenario**: the probe writes matching text, so the conditional edge
/// wins over Else.
#[tokio::test]
async fn matching_condition_beats_else() {
    let writer = ContextWriter::new(vec![(
        "screen_text",
        ContextValue::from("welcome back, alice"),
    )]);
    let engine =
        FlowEngine::new(FlowServices::simulated()).with_executor(FlowNodeType::Gesture, Arc::new(writer));
    let events = drain(engine.start(branching_graph()).unwrap()).await;

    assert!(ran_label(&events, "hit"));
    assert!(!ran_label(&events, "miss"));
    assert!(matches!(events.last(), Some(RunState::Succeeded { .. })));
}

/// **Scenario**: the referenced key is absent, so the conditional edge does
/// not match and the run falls through to Else.
#[tokio::test]
async fn absent_key_falls_through_to_else() {
    let writer = ContextWriter::new(vec![]);
    let engine =
        FlowEngine::new(FlowServices::simulated()).with_executor(FlowNodeType::Gesture, Arc::new(writer));
    let events = drain(engine.start(branching_graph()).unwrap()).await;

    assert!(!ran_label(&events, "hit"));
    assert!(ran_label(&events, "miss"));
    assert!(matches!(events.last(), Some(RunState::Succeeded { .. })));
}

/// **Scenario**: a StopExecution edge ends the run as a success without
/// entering its target node.
#[tokio::test]
async fn stop_execution_edge_halts_flow_cleanly() {
    let start = FlowNode::start(None);
    let never = FlowNode::delay(10).with_label("never");
    let graph = FlowGraph::new("halting")
        .with_node(start.clone())
        .with_node(never.clone())
        .with_edge(FlowEdge::new(&start.id, &never.id).with_condition(EdgeCondition::StopExecution));

    let engine = FlowEngine::new(FlowServices::simulated());
    let events = drain(engine.start(graph).unwrap()).await;

    assert!(!ran_label(&events, "never"));
    assert_eq!(
        events.last(),
        Some(&RunState::Succeeded {
            last_label: Some("Start".into()),
        })
    );
}

/// **Scenario**: a WaitSeconds edge delays the transition but still routes.
#[tokio::test]
async fn wait_seconds_edge_delays_then_routes() {
    let start = FlowNode::start(None);
    let next = FlowNode::delay(10).with_label("after wait");
    let graph = FlowGraph::new("waiting")
        .with_node(start.clone())
        .with_node(next.clone())
        .with_edge(
            FlowEdge::new(&start.id, &next.id)
                .with_condition(EdgeCondition::WaitSeconds { seconds: 0.2 }),
        );

    let engine = FlowEngine::new(FlowServices::simulated());
    let began = std::time::Instant::now();
    let events = drain(engine.start(graph).unwrap()).await;

    assert!(began.elapsed() >= std::time::Duration::from_millis(200));
    assert!(ran_label(&events, "after wait"));
    assert!(matches!(events.last(), Some(RunState::Succeeded { .. })));
}
