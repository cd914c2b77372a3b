//! Graph-traversal execution engine.
//!
//! Walks the directed graph from the Start node, executing each node via its
//! registered [`NodeExecutor`] under the node's timeout, following edges via
//! the condition evaluator, and applying retry and failure-path policy. The
//! engine is the only component with suspension, timeout, and retry logic;
//! executors stay single-step.
//!
//! One run per engine instance: `start` rejects while a run is active. Run
//! progress is emitted as [`RunState`] events over the returned stream.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::FlowContext;
use crate::engine::evaluator;
use crate::engine::executor::{NodeExecutor, NodeResult};
use crate::engine::executors::{
    DelayNodeExecutor, GestureNodeExecutor, LaunchAppNodeExecutor, ScreenMlNodeExecutor,
    StartNodeExecutor, VisualTriggerNodeExecutor,
};
use crate::error::StartError;
use crate::model::{EdgeCondition, FlowGraph, FlowNodeType};
use crate::platform::FlowServices;

/// State emitted during a run for observers (e.g. a UI).
///
/// Terminal states carry the last executed node's label so a caller can
/// present "stopped at step X because Y" without inspecting internals.
#[derive(Clone, Debug, PartialEq)]
pub enum RunState {
    /// A node's executor is in flight.
    Running { node_id: String, label: String },
    /// A node's executor reported success.
    NodeCompleted { node_id: String },
    /// The run finished successfully.
    Succeeded { last_label: Option<String> },
    /// The run failed, with the offending node when one was executing.
    Failed {
        node_id: Option<String>,
        label: Option<String>,
        reason: String,
    },
    /// The run was stopped by an external request.
    Stopped { last_label: Option<String> },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Succeeded { .. } | RunState::Failed { .. } | RunState::Stopped { .. }
        )
    }
}

struct ActiveRun {
    cancel: CancellationToken,
    paused: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Core execution engine. Holds the executor registry; each `start` spawns
/// one run task that owns its graph snapshot, blackboard, and attempt
/// counters.
pub struct FlowEngine {
    executors: Arc<HashMap<FlowNodeType, Arc<dyn NodeExecutor>>>,
    active: Mutex<Option<ActiveRun>>,
}

impl FlowEngine {
    /// Engine with the full executor registry wired to `services`.
    pub fn new(services: FlowServices) -> Self {
        let mut executors: HashMap<FlowNodeType, Arc<dyn NodeExecutor>> = HashMap::new();
        executors.insert(
            FlowNodeType::Start,
            Arc::new(StartNodeExecutor::new(services.launcher.clone())),
        );
        executors.insert(
            FlowNodeType::Gesture,
            Arc::new(GestureNodeExecutor::new(services.gestures.clone())),
        );
        executors.insert(
            FlowNodeType::VisualTrigger,
            Arc::new(VisualTriggerNodeExecutor::new(
                services.capture.clone(),
                services.matcher.clone(),
            )),
        );
        executors.insert(
            FlowNodeType::ScreenMl,
            Arc::new(ScreenMlNodeExecutor::new(
                services.capture.clone(),
                services.perception.clone(),
            )),
        );
        executors.insert(FlowNodeType::Delay, Arc::new(DelayNodeExecutor));
        executors.insert(
            FlowNodeType::LaunchApp,
            Arc::new(LaunchAppNodeExecutor::new(services.launcher)),
        );
        Self {
            executors: Arc::new(executors),
            active: Mutex::new(None),
        }
    }

    /// Replaces the executor for one node kind. Used by tests to script
    /// node behavior without platform collaborators.
    pub fn with_executor(
        mut self,
        node_type: FlowNodeType,
        executor: Arc<dyn NodeExecutor>,
    ) -> Self {
        Arc::make_mut(&mut self.executors).insert(node_type, executor);
        self
    }

    /// Starts a run over a snapshot of `graph`.
    ///
    /// Validates the graph first: a structural violation fails before any
    /// node executes. Rejects with [`StartError::AlreadyRunning`] while a
    /// previous run is active; call [`FlowEngine::stop`] first.
    pub fn start(&self, graph: FlowGraph) -> Result<ReceiverStream<RunState>, StartError> {
        let mut active = self.active.lock().unwrap();
        if let Some(run) = active.as_ref() {
            if !run.task.is_finished() {
                return Err(StartError::AlreadyRunning);
            }
        }

        graph.validate()?;

        let cancel = CancellationToken::new();
        let paused = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel(64);
        let runner = Runner {
            graph,
            executors: self.executors.clone(),
            cancel: cancel.clone(),
            paused: paused.clone(),
            tx,
        };
        let task = tokio::spawn(runner.run());
        *active = Some(ActiveRun {
            cancel,
            paused,
            task,
        });
        Ok(ReceiverStream::new(rx))
    }

    /// Requests cooperative cancellation of the active run. The in-flight
    /// node executor unwinds at its next suspension point and the run ends
    /// `Stopped`. No-op when idle.
    pub fn stop(&self) {
        if let Some(run) = self.active.lock().unwrap().as_ref() {
            run.cancel.cancel();
        }
    }

    /// Pauses the run between nodes; the in-flight node finishes first.
    pub fn pause(&self) {
        if let Some(run) = self.active.lock().unwrap().as_ref() {
            run.paused.store(true, Ordering::Relaxed);
        }
    }

    /// Resumes a paused run.
    pub fn resume(&self) {
        if let Some(run) = self.active.lock().unwrap().as_ref() {
            run.paused.store(false, Ordering::Relaxed);
        }
    }

    /// True while a run task is active.
    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .unwrap()
            .as_ref()
            .map_or(false, |run| !run.task.is_finished())
    }
}

/// One run: owns the graph snapshot, blackboard, and attempt counters.
struct Runner {
    graph: FlowGraph,
    executors: Arc<HashMap<FlowNodeType, Arc<dyn NodeExecutor>>>,
    cancel: CancellationToken,
    paused: Arc<AtomicBool>,
    tx: mpsc::Sender<RunState>,
}

impl Runner {
    async fn run(self) {
        info!(
            graph = %self.graph.name,
            nodes = self.graph.nodes.len(),
            "starting flow run"
        );

        let mut ctx = FlowContext::new();
        // Per-run attempt counters, keyed by node id. max_attempts is the
        // total number of executions of a node.
        let mut attempts: HashMap<String, u32> = HashMap::new();
        let mut last_label: Option<String> = None;

        // start() validated the graph, so the Start node exists.
        let Some(mut current) = self.graph.find_start_node().cloned() else {
            self.emit(RunState::Failed {
                node_id: None,
                label: None,
                reason: "graph has no Start node".into(),
            })
            .await;
            return;
        };

        loop {
            // Pause gate between nodes, still responsive to stop.
            while self.paused.load(Ordering::Relaxed) && !self.cancel.is_cancelled() {
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = sleep(Duration::from_millis(200)) => {}
                }
            }
            if self.cancel.is_cancelled() {
                info!("flow run stopped");
                self.emit(RunState::Stopped { last_label }).await;
                return;
            }

            debug!(
                node_id = %current.id,
                label = %current.label,
                kind = ?current.kind.node_type(),
                "executing node"
            );
            self.emit(RunState::Running {
                node_id: current.id.clone(),
                label: current.label.clone(),
            })
            .await;
            last_label = Some(current.label.clone());

            let Some(executor) = self.executors.get(&current.kind.node_type()) else {
                self.emit(RunState::Failed {
                    node_id: Some(current.id.clone()),
                    label: last_label,
                    reason: format!("no executor registered for {:?}", current.kind.node_type()),
                })
                .await;
                return;
            };
            *attempts.entry(current.id.clone()).or_insert(0) += 1;

            let result = tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!(node_id = %current.id, "flow run stopped mid-node");
                    self.emit(RunState::Stopped { last_label }).await;
                    return;
                }
                res = timeout(
                    Duration::from_millis(current.timeout_ms),
                    executor.execute(&current, &mut ctx),
                ) => match res {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(node_id = %current.id, timeout_ms = current.timeout_ms, "node timed out");
                        NodeResult::Failure(format!("timed out after {}ms", current.timeout_ms))
                    }
                }
            };

            match result {
                NodeResult::Success => {
                    debug!(node_id = %current.id, "node succeeded");
                    self.emit(RunState::NodeCompleted {
                        node_id: current.id.clone(),
                    })
                    .await;

                    let outgoing = self.graph.outgoing_edges(&current.id);
                    if !outgoing.iter().any(|e| !e.is_failure_path) {
                        // Implicit terminal: nothing to traverse.
                        info!("no outgoing edges, flow complete");
                        self.emit(RunState::Succeeded { last_label }).await;
                        return;
                    }

                    let Some(edge) = evaluator::select_next(&outgoing, &ctx) else {
                        warn!(node_id = %current.id, "no matching edge");
                        self.emit(RunState::Failed {
                            node_id: Some(current.id.clone()),
                            label: last_label,
                            reason: "no matching edge".into(),
                        })
                        .await;
                        return;
                    };

                    match edge.condition {
                        Some(EdgeCondition::StopExecution) => {
                            info!(edge_id = %edge.id, "stop edge selected, halting flow");
                            self.emit(RunState::Succeeded { last_label }).await;
                            return;
                        }
                        Some(EdgeCondition::WaitSeconds { seconds }) => {
                            debug!(edge_id = %edge.id, seconds, "timed edge, waiting");
                            if self.wait(Duration::from_secs_f32(seconds.max(0.0))).await.is_err() {
                                self.emit(RunState::Stopped { last_label }).await;
                                return;
                            }
                        }
                        _ => {}
                    }

                    match self.graph.node_by_id(&edge.to_node_id) {
                        Some(next) => current = next.clone(),
                        None => {
                            // Unreachable on a validated graph.
                            self.emit(RunState::Failed {
                                node_id: Some(current.id.clone()),
                                label: last_label,
                                reason: format!(
                                    "edge {} points at unknown node {}",
                                    edge.id, edge.to_node_id
                                ),
                            })
                            .await;
                            return;
                        }
                    }
                }

                NodeResult::Failure(reason) => {
                    warn!(node_id = %current.id, %reason, "node failed");

                    let made = attempts.get(&current.id).copied().unwrap_or(1);
                    let retry = self
                        .graph
                        .outgoing_edges(&current.id)
                        .into_iter()
                        .find_map(|e| match e.condition {
                            Some(EdgeCondition::Retry {
                                max_attempts,
                                delay_ms,
                            }) => Some((max_attempts, delay_ms)),
                            _ => None,
                        });
                    if let Some((max_attempts, delay_ms)) = retry {
                        if made < max_attempts {
                            info!(
                                node_id = %current.id,
                                attempt = made + 1,
                                max_attempts,
                                "retrying node"
                            );
                            if self.wait(Duration::from_millis(delay_ms)).await.is_err() {
                                self.emit(RunState::Stopped { last_label }).await;
                                return;
                            }
                            // Re-execute the same node.
                            continue;
                        }
                        warn!(node_id = %current.id, max_attempts, "retry budget exhausted");
                    }

                    match self.graph.failure_edge(&current.id) {
                        Some(edge) => match self.graph.node_by_id(&edge.to_node_id) {
                            Some(next) => {
                                debug!(to_node_id = %edge.to_node_id, "following failure edge");
                                current = next.clone();
                            }
                            None => {
                                self.emit(RunState::Failed {
                                    node_id: Some(current.id.clone()),
                                    label: last_label,
                                    reason: format!(
                                        "failure edge {} points at unknown node {}",
                                        edge.id, edge.to_node_id
                                    ),
                                })
                                .await;
                                return;
                            }
                        },
                        None => {
                            self.emit(RunState::Failed {
                                node_id: Some(current.id.clone()),
                                label: last_label,
                                reason,
                            })
                            .await;
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Cancellable sleep; `Err` means the run was stopped.
    async fn wait(&self, duration: Duration) -> Result<(), ()> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(()),
            _ = sleep(duration) => Ok(()),
        }
    }

    async fn emit(&self, state: RunState) {
        // A dropped observer must not fail the run.
        let _ = self.tx.send(state).await;
    }
}
