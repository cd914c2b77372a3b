//! External control: stop, pause/resume, and single-run enforcement.

use std::time::Duration;

use autoflow::model::{FlowEdge, FlowGraph, FlowNode};
use autoflow::platform::FlowServices;
use autoflow::{FlowEngine, RunState, StartError};
use tokio_stream::StreamExt;

use crate::common::drain;

fn long_flow() -> FlowGraph {
    let start = FlowNode::start(None);
    let long = FlowNode::delay(10_000).with_label("long wait");
    FlowGraph::new("long")
        .with_node(start.clone())
        .with_node(long.clone())
        .with_edge(FlowEdge::new(&start.id, &long.id))
}

/// **Scenario**: stop interrupts an in-flight node; the run ends Stopped,
/// not Failed, and the engine becomes startable again.
#[tokio::test]
async fn stop_interrupts_in_flight_node() {
    let engine = FlowEngine::new(FlowServices::simulated());
    let mut states = engine.start(long_flow()).unwrap();

    // Wait until the long delay node is in flight.
    while let Some(state) = states.next().await {
        if matches!(&state, RunState::Running { label, .. } if label == "long wait") {
            break;
        }
    }
    engine.stop();

    let rest = drain(states).await;
    assert_eq!(
        rest.last(),
        Some(&RunState::Stopped {
            last_label: Some("long wait".into()),
        })
    );
}

#[tokio::test]
async fn second_start_is_rejected_while_running() {
    let engine = FlowEngine::new(FlowServices::simulated());
    let states = engine.start(long_flow()).unwrap();
    assert!(engine.is_running());

    match engine.start(long_flow()) {
        Err(StartError::AlreadyRunning) => {}
        other => panic!("expected AlreadyRunning, got {other:?}"),
    }

    engine.stop();
    let events = drain(states).await;
    assert!(matches!(events.last(), Some(RunState::Stopped { .. })));
    while engine.is_running() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // After the previous run drains, the engine accepts a new one.
    let start = FlowNode::start(None);
    let quick = FlowGraph::new("quick").with_node(start);
    let events = drain(engine.start(quick).unwrap()).await;
    assert!(matches!(events.last(), Some(RunState::Succeeded { .. })));
}

/// **Scenario**: pause holds the run between nodes; resume lets it finish.
#[tokio::test]
async fn pause_holds_run_until_resumed() {
    let start = FlowNode::start(None);
    let first = FlowNode::delay(200).with_label("first");
    let second = FlowNode::delay(10).with_label("second");
    let graph = FlowGraph::new("pausable")
        .with_node(start.clone())
        .with_node(first.clone())
        .with_node(second.clone())
        .with_edge(FlowEdge::new(&start.id, &first.id))
        .with_edge(FlowEdge::new(&first.id, &second.id));

    let engine = FlowEngine::new(FlowServices::simulated());
    let mut states = engine.start(graph).unwrap();

    assert!(matches!(states.next().await, Some(RunState::Running { .. })));
    engine.pause();

    // While paused no terminal state may arrive; the un-paused flow would
    // finish well inside this window.
    let outcome = tokio::time::timeout(Duration::from_millis(600), async {
        while let Some(state) = states.next().await {
            if state.is_terminal() {
                return state;
            }
        }
        panic!("stream closed without a terminal state");
    })
    .await;
    assert!(outcome.is_err(), "run finished while paused: {outcome:?}");

    engine.resume();
    let events = drain(states).await;
    assert!(matches!(events.last(), Some(RunState::Succeeded { .. })));
}

/// **Scenario**: stopping a paused run releases it as Stopped.
#[tokio::test]
async fn stop_releases_paused_run() {
    let engine = FlowEngine::new(FlowServices::simulated());
    let mut states = engine.start(long_flow()).unwrap();

    assert!(matches!(states.next().await, Some(RunState::Running { .. })));
    engine.pause();
    engine.stop();

    let rest = drain(states).await;
    assert!(matches!(rest.last(), Some(RunState::Stopped { .. })));
}
