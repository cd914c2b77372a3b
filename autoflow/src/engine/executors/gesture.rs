//! Gesture executor: resolves coordinates and dispatches through the
//! platform's interaction service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::context::FlowContext;
use crate::engine::executor::{NodeExecutor, NodeResult};
use crate::model::{CoordinateSource, FlowNode, NodeKind, Point};
use crate::platform::{GestureDispatcher, GestureRequest};

pub struct GestureNodeExecutor {
    gestures: Arc<dyn GestureDispatcher>,
}

impl GestureNodeExecutor {
    pub fn new(gestures: Arc<dyn GestureDispatcher>) -> Self {
        Self { gestures }
    }
}

#[async_trait]
impl NodeExecutor for GestureNodeExecutor {
    async fn execute(&self, node: &FlowNode, ctx: &mut FlowContext) -> NodeResult {
        let NodeKind::Gesture {
            gesture_type,
            coordinate_source,
            duration_ms,
            swipe_end,
        } = &node.kind
        else {
            return NodeResult::failure(format!(
                "expected a Gesture node, got {:?}",
                node.kind.node_type()
            ));
        };

        if !self.gestures.is_connected() {
            return NodeResult::failure("interaction service not connected");
        }

        let Some(point) = resolve_coordinates(coordinate_source, ctx) else {
            return NodeResult::failure(match coordinate_source {
                CoordinateSource::FromContext { key } => {
                    format!("could not resolve coordinates from context key '{key}'")
                }
                CoordinateSource::Static { .. } => "could not resolve coordinates".to_string(),
            });
        };

        debug!(node_id = %node.id, ?gesture_type, x = point.x, y = point.y, "dispatching gesture");

        let request = GestureRequest {
            kind: *gesture_type,
            point,
            end: *swipe_end,
            duration_ms: *duration_ms,
        };
        match self.gestures.dispatch(request).await {
            Ok(()) => NodeResult::Success,
            Err(e) => NodeResult::failure(format!("gesture dispatch failed: {e}")),
        }
    }
}

/// Literal point, or a blackboard lookup accepting a stored point or
/// `"x,y"` encoded text.
fn resolve_coordinates(source: &CoordinateSource, ctx: &FlowContext) -> Option<Point> {
    match source {
        CoordinateSource::Static { x, y } => Some(Point { x: *x, y: *y }),
        CoordinateSource::FromContext { key } => ctx.get_point(key),
    }
}
