//! Screen ML executor: OCR or element detection over the current frame.
//!
//! Both modes write their outcome plus a `{key}_success` flag; an optional
//! target label adds `{key}_target_found` and, on a hit, the target's centre.
//! As with the visual trigger, "looked and found nothing" is node-level
//! success — branching belongs to edge conditions.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::context::FlowContext;
use crate::engine::executor::{NodeExecutor, NodeResult};
use crate::model::{FlowNode, NodeKind, ScreenMlMode};
use crate::platform::{DetectedElement, Frame, OcrResult, Perception, ScreenCapture};

pub struct ScreenMlNodeExecutor {
    capture: Arc<dyn ScreenCapture>,
    perception: Arc<dyn Perception>,
}

impl ScreenMlNodeExecutor {
    pub fn new(capture: Arc<dyn ScreenCapture>, perception: Arc<dyn Perception>) -> Self {
        Self { capture, perception }
    }

    async fn run_ocr(
        &self,
        frame: &Frame,
        key: &str,
        target_label: Option<&str>,
        ctx: &mut FlowContext,
    ) -> NodeResult {
        let result: OcrResult = match self.perception.extract_text(frame).await {
            Ok(r) => r,
            Err(e) => {
                ctx.put(format!("{key}_success"), false);
                return NodeResult::failure(format!("text extraction failed: {e}"));
            }
        };

        debug!(blocks = result.blocks.len(), chars = result.full_text.len(), "ocr complete");
        ctx.put(key.to_string(), result.full_text.clone());
        ctx.put(format!("{key}_success"), true);
        ctx.put(format!("{key}_block_count"), result.blocks.len() as f64);

        if let Some(target) = target_label {
            let target_lower = target.to_lowercase();
            let found = result.full_text.to_lowercase().contains(&target_lower);
            ctx.put(format!("{key}_target_found"), found);
            if found {
                let hit = result
                    .blocks
                    .iter()
                    .find(|b| b.text.to_lowercase().contains(&target_lower));
                if let Some(bounds) = hit.and_then(|b| b.bounds) {
                    let cx = bounds.x as f32 + bounds.width as f32 / 2.0;
                    let cy = bounds.y as f32 + bounds.height as f32 / 2.0;
                    ctx.put(format!("{key}_target_x"), cx);
                    ctx.put(format!("{key}_target_y"), cy);
                }
            }
        }
        NodeResult::Success
    }

    async fn run_detection(
        &self,
        frame: &Frame,
        key: &str,
        target_label: Option<&str>,
        ctx: &mut FlowContext,
    ) -> NodeResult {
        let detections = match self.perception.detect_elements(frame, target_label).await {
            Ok(d) => d,
            Err(e) => {
                ctx.put(format!("{key}_success"), false);
                return NodeResult::failure(format!("element detection failed: {e}"));
            }
        };

        debug!(elements = detections.len(), "detection complete");
        ctx.put(key.to_string(), serialize_detections(&detections));
        ctx.put(format!("{key}_success"), true);
        ctx.put(format!("{key}_element_count"), detections.len() as f64);

        if let Some(target) = target_label {
            let hit = detections
                .iter()
                .find(|el| el.label.eq_ignore_ascii_case(target));
            match hit {
                Some(el) => {
                    let center = el.center();
                    ctx.put(format!("{key}_target_found"), true);
                    ctx.put(format!("{key}_target_x"), center.x);
                    ctx.put(format!("{key}_target_y"), center.y);
                    ctx.put(format!("{key}_target_label"), el.label.clone());
                    ctx.put(format!("{key}_target_confidence"), el.confidence);
                }
                None => {
                    ctx.put(format!("{key}_target_found"), false);
                }
            }
        }
        NodeResult::Success
    }
}

/// Compact `label:x,y,w,h:confidence` list, semicolon separated. Downstream
/// text conditions can probe it without a JSON parser.
fn serialize_detections(detections: &[DetectedElement]) -> String {
    detections
        .iter()
        .map(|el| {
            format!(
                "{}:{},{},{},{}:{}",
                el.label, el.bounds.x, el.bounds.y, el.bounds.width, el.bounds.height, el.confidence
            )
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[async_trait]
impl NodeExecutor for ScreenMlNodeExecutor {
    async fn execute(&self, node: &FlowNode, ctx: &mut FlowContext) -> NodeResult {
        let NodeKind::ScreenMl {
            mode,
            output_context_key,
            target_label,
        } = &node.kind
        else {
            return NodeResult::failure(format!(
                "expected a ScreenMl node, got {:?}",
                node.kind.node_type()
            ));
        };

        let frame = match self.capture.capture_frame().await {
            Ok(frame) => frame,
            Err(e) => return NodeResult::failure(e.to_string()),
        };

        debug!(node_id = %node.id, ?mode, key = %output_context_key, "running perception pass");

        let target = target_label.as_deref();
        match mode {
            ScreenMlMode::Ocr => self.run_ocr(&frame, output_context_key, target, ctx).await,
            ScreenMlMode::ObjectDetection => {
                self.run_detection(&frame, output_context_key, target, ctx).await
            }
        }
    }
}
