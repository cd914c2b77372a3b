//! Delay executor: suspends for the configured duration.

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::debug;

use crate::context::FlowContext;
use crate::engine::executor::{NodeExecutor, NodeResult};
use crate::model::{FlowNode, NodeKind};

pub struct DelayNodeExecutor;

#[async_trait]
impl NodeExecutor for DelayNodeExecutor {
    async fn execute(&self, node: &FlowNode, _ctx: &mut FlowContext) -> NodeResult {
        let NodeKind::Delay { delay_ms } = &node.kind else {
            return NodeResult::failure(format!("expected a Delay node, got {:?}", node.kind.node_type()));
        };

        debug!(node_id = %node.id, delay_ms, "delaying");
        sleep(Duration::from_millis(*delay_ms)).await;
        NodeResult::Success
    }
}
