//! App launch executors: the Start node's optional launch, and the
//! mid-flow LaunchApp node.
//!
//! Both resolve a package identifier, invoke the platform launch call, and
//! wait a settle delay so the target app reaches the foreground before the
//! next node runs.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::debug;

use crate::context::FlowContext;
use crate::engine::executor::{NodeExecutor, NodeResult};
use crate::model::{FlowNode, NodeKind};
use crate::platform::AppLauncher;

/// Settle delay after the Start node's launch.
const START_SETTLE_MS: u64 = 1500;

async fn launch_and_settle(
    launcher: &Arc<dyn AppLauncher>,
    package: &str,
    settle_ms: u64,
) -> NodeResult {
    let Some(handle) = launcher.resolve(package) else {
        return NodeResult::failure(format!("no launchable target for '{package}'"));
    };
    if let Err(e) = launcher.launch(&handle).await {
        return NodeResult::failure(format!("failed to launch '{package}': {e}"));
    }
    debug!(package, settle_ms, "app launched");
    sleep(Duration::from_millis(settle_ms)).await;
    NodeResult::Success
}

/// Executor for the Start node. Launches the target app when one is
/// configured; with no target it succeeds immediately.
pub struct StartNodeExecutor {
    launcher: Arc<dyn AppLauncher>,
}

impl StartNodeExecutor {
    pub fn new(launcher: Arc<dyn AppLauncher>) -> Self {
        Self { launcher }
    }
}

#[async_trait]
impl NodeExecutor for StartNodeExecutor {
    async fn execute(&self, node: &FlowNode, _ctx: &mut FlowContext) -> NodeResult {
        let NodeKind::Start { app_package_name } = &node.kind else {
            return NodeResult::failure(format!(
                "expected a Start node, got {:?}",
                node.kind.node_type()
            ));
        };

        match app_package_name.as_deref() {
            None | Some("") => {
                debug!(node_id = %node.id, "no target app configured, continuing");
                NodeResult::Success
            }
            Some(package) => launch_and_settle(&self.launcher, package, START_SETTLE_MS).await,
        }
    }
}

/// Executor for the mid-flow LaunchApp node. Unlike Start, the target app
/// is mandatory.
pub struct LaunchAppNodeExecutor {
    launcher: Arc<dyn AppLauncher>,
}

impl LaunchAppNodeExecutor {
    pub fn new(launcher: Arc<dyn AppLauncher>) -> Self {
        Self { launcher }
    }
}

#[async_trait]
impl NodeExecutor for LaunchAppNodeExecutor {
    async fn execute(&self, node: &FlowNode, _ctx: &mut FlowContext) -> NodeResult {
        let NodeKind::LaunchApp {
            app_package_name,
            launch_delay_ms,
        } = &node.kind
        else {
            return NodeResult::failure(format!(
                "expected a LaunchApp node, got {:?}",
                node.kind.node_type()
            ));
        };

        if app_package_name.is_empty() {
            return NodeResult::failure("no target app selected, configure this node first");
        }
        launch_and_settle(&self.launcher, app_package_name, *launch_delay_ms).await
    }
}
