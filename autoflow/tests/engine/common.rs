//! Shared fixtures: scripted executors and event helpers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use autoflow::model::{CoordinateSource, FlowNode, GestureType, NodeKind};
use autoflow::{ContextValue, FlowContext, NodeExecutor, NodeResult, RunState};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

/// Plays back a queue of results, falling back to a fixed result once the
/// queue is empty, and counts executions.
pub struct ScriptedExecutor {
    queue: Mutex<VecDeque<NodeResult>>,
    fallback: NodeResult,
    calls: AtomicU32,
}

impl ScriptedExecutor {
    pub fn succeeding() -> Self {
        Self::new(Vec::new(), NodeResult::Success)
    }

    pub fn failing() -> Self {
        Self::new(Vec::new(), NodeResult::failure("scripted failure"))
    }

    pub fn with_results(results: Vec<NodeResult>) -> Self {
        Self::new(results, NodeResult::Success)
    }

    fn new(results: Vec<NodeResult>, fallback: NodeResult) -> Self {
        Self {
            queue: Mutex::new(results.into()),
            fallback,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeExecutor for ScriptedExecutor {
    async fn execute(&self, _node: &FlowNode, _ctx: &mut FlowContext) -> NodeResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Writes fixed blackboard entries, then succeeds.
pub struct ContextWriter {
    entries: Vec<(String, ContextValue)>,
}

impl ContextWriter {
    pub fn new(entries: Vec<(&str, ContextValue)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

#[async_trait]
impl NodeExecutor for ContextWriter {
    async fn execute(&self, _node: &FlowNode, ctx: &mut FlowContext) -> NodeResult {
        for (key, value) in &self.entries {
            ctx.put(key, value.clone());
        }
        NodeResult::Success
    }
}

/// Sleeps for a fixed duration, then succeeds. Used to provoke timeouts and
/// to hold a node in flight for stop tests.
pub struct SleepingExecutor {
    duration: Duration,
}

impl SleepingExecutor {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl NodeExecutor for SleepingExecutor {
    async fn execute(&self, _node: &FlowNode, _ctx: &mut FlowContext) -> NodeResult {
        tokio::time::sleep(self.duration).await;
        NodeResult::Success
    }
}

/// A tap gesture node; tests override the Gesture executor to script it.
pub fn probe_node(label: &str) -> FlowNode {
    FlowNode::new(NodeKind::Gesture {
        gesture_type: GestureType::Tap,
        coordinate_source: CoordinateSource::Static { x: 100.0, y: 100.0 },
        duration_ms: 100,
        swipe_end: None,
    })
    .with_label(label)
}

/// Collects every event until the stream closes.
pub async fn drain(mut states: ReceiverStream<RunState>) -> Vec<RunState> {
    let mut events = Vec::new();
    while let Some(state) = states.next().await {
        events.push(state);
    }
    events
}

/// True when some `Running` event carries `label`.
pub fn ran_label(events: &[RunState], label: &str) -> bool {
    events
        .iter()
        .any(|s| matches!(s, RunState::Running { label: l, .. } if l == label))
}
