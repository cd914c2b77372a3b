//! Visual trigger executor: template match against the current screen frame.
//!
//! The search outcome lands on the blackboard under the node's output key;
//! a miss is still node-level success, and downstream edges branch on the
//! `{key}_found` flag.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::context::FlowContext;
use crate::engine::executor::{NodeExecutor, NodeResult};
use crate::model::{FlowNode, NodeKind};
use crate::platform::{PatternMatcher, ScreenCapture};

pub struct VisualTriggerNodeExecutor {
    capture: Arc<dyn ScreenCapture>,
    matcher: Arc<dyn PatternMatcher>,
}

impl VisualTriggerNodeExecutor {
    pub fn new(capture: Arc<dyn ScreenCapture>, matcher: Arc<dyn PatternMatcher>) -> Self {
        Self { capture, matcher }
    }
}

#[async_trait]
impl NodeExecutor for VisualTriggerNodeExecutor {
    async fn execute(&self, node: &FlowNode, ctx: &mut FlowContext) -> NodeResult {
        let NodeKind::VisualTrigger {
            template_image_path,
            threshold,
            search_region,
            output_context_key,
        } = &node.kind
        else {
            return NodeResult::failure(format!(
                "expected a VisualTrigger node, got {:?}",
                node.kind.node_type()
            ));
        };

        if template_image_path.is_empty() {
            return NodeResult::failure("no template image configured");
        }

        let frame = match self.capture.capture_frame().await {
            Ok(frame) => frame,
            Err(e) => return NodeResult::failure(e.to_string()),
        };

        debug!(
            node_id = %node.id,
            template = %template_image_path,
            threshold,
            "running template search"
        );

        let key = output_context_key;
        match self
            .matcher
            .search(template_image_path, &frame, *search_region, *threshold)
            .await
        {
            Ok(Some(hit)) => {
                let center = hit.center();
                debug!(score = hit.score, x = center.x, y = center.y, "template matched");
                ctx.put(format!("{key}_found"), true);
                ctx.put(format!("{key}_x"), center.x);
                ctx.put(format!("{key}_y"), center.y);
                ctx.put(format!("{key}_width"), hit.width as f64);
                ctx.put(format!("{key}_height"), hit.height as f64);
                ctx.put(format!("{key}_score"), hit.score);
                ctx.put(key.clone(), center);
                NodeResult::Success
            }
            // A completed search with no hit is success at the node level;
            // failure propagation is delegated to IfNotImageFound edges.
            Ok(None) => {
                debug!(threshold, "no match above threshold");
                ctx.put(format!("{key}_found"), false);
                ctx.put(key.clone(), "not_found");
                NodeResult::Success
            }
            Err(e) => NodeResult::failure(format!("template search failed: {e}")),
        }
    }
}
