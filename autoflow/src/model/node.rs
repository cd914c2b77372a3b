//! Flow nodes: shared fields plus a closed set of kind payloads.
//!
//! Every node carries the same routing surface (`output_edge_ids`,
//! `on_failure_edge_id`, `timeout_ms`); the flattened `kind` payload holds
//! the per-step configuration and the serialized `type` discriminator.

use serde::{Deserialize, Serialize};

use super::new_id;

/// Canvas coordinate used by the editor; persisted with the graph but
/// irrelevant to execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f32,
    pub y: f32,
}

/// A point in screen coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Rectangular search region in screen coordinates. A zero-sized region
/// means "search the whole frame".
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn is_unbounded(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Gesture interaction kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureType {
    Tap,
    LongPress,
    Swipe,
    Custom,
}

/// Where a gesture reads its coordinates from: a literal point, or a
/// blackboard lookup resolved at execution time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoordinateSource {
    Static { x: f32, y: f32 },
    FromContext { key: String },
}

/// Perception node operating mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenMlMode {
    Ocr,
    ObjectDetection,
}

/// Kind discriminant, the key the engine's executor registry dispatches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowNodeType {
    Start,
    Gesture,
    VisualTrigger,
    ScreenMl,
    Delay,
    LaunchApp,
}

/// Per-kind node payload. Closed set; the engine's dispatch and the
/// evaluator match exhaustively.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Entry point of every flow, exactly one per graph. Optionally launches
    /// a target app before the flow continues.
    Start {
        #[serde(default)]
        app_package_name: Option<String>,
    },
    /// Dispatches a tap / long-press / swipe through the platform's
    /// interaction service.
    Gesture {
        gesture_type: GestureType,
        coordinate_source: CoordinateSource,
        #[serde(default = "default_gesture_duration")]
        duration_ms: u64,
        #[serde(default)]
        swipe_end: Option<Point>,
    },
    /// Template match against the current screen frame; writes the outcome
    /// under `output_context_key`.
    VisualTrigger {
        template_image_path: String,
        threshold: f32,
        #[serde(default)]
        search_region: Region,
        output_context_key: String,
    },
    /// On-device perception pass (OCR or element detection); writes the
    /// outcome under `output_context_key`.
    ScreenMl {
        mode: ScreenMlMode,
        output_context_key: String,
        #[serde(default)]
        target_label: Option<String>,
    },
    /// Suspends for a fixed duration.
    Delay { delay_ms: u64 },
    /// Launches an app mid-flow; identical to Start's launch path but
    /// placeable anywhere in the graph.
    LaunchApp {
        app_package_name: String,
        #[serde(default = "default_launch_delay")]
        launch_delay_ms: u64,
    },
}

fn default_gesture_duration() -> u64 {
    100
}

fn default_launch_delay() -> u64 {
    1500
}

impl NodeKind {
    /// Discriminant for executor dispatch.
    pub fn node_type(&self) -> FlowNodeType {
        match self {
            NodeKind::Start { .. } => FlowNodeType::Start,
            NodeKind::Gesture { .. } => FlowNodeType::Gesture,
            NodeKind::VisualTrigger { .. } => FlowNodeType::VisualTrigger,
            NodeKind::ScreenMl { .. } => FlowNodeType::ScreenMl,
            NodeKind::Delay { .. } => FlowNodeType::Delay,
            NodeKind::LaunchApp { .. } => FlowNodeType::LaunchApp,
        }
    }

    /// Default executor timeout for this kind, matching the editor defaults.
    pub fn default_timeout_ms(&self) -> u64 {
        match self {
            NodeKind::Start { .. } => 10_000,
            NodeKind::Gesture { .. } => 5_000,
            NodeKind::VisualTrigger { .. } => 15_000,
            NodeKind::ScreenMl { .. } => 20_000,
            NodeKind::Delay { .. } => 60_000,
            NodeKind::LaunchApp { .. } => 10_000,
        }
    }

    /// Default display label for this kind.
    pub fn default_label(&self) -> &'static str {
        match self {
            NodeKind::Start { .. } => "Start",
            NodeKind::Gesture { .. } => "Gesture",
            NodeKind::VisualTrigger { .. } => "Image Match",
            NodeKind::ScreenMl { .. } => "Screen ML",
            NodeKind::Delay { .. } => "Delay",
            NodeKind::LaunchApp { .. } => "Launch App",
        }
    }
}

/// One step in a flow graph.
///
/// `output_edge_ids` is declarative editor state; edges carry the real
/// topology. `on_failure_edge_id` designates the single edge followed when
/// this node's executor fails and no retry budget remains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub position: NodePosition,
    #[serde(default)]
    pub output_edge_ids: Vec<String>,
    #[serde(default)]
    pub on_failure_edge_id: Option<String>,
    pub timeout_ms: u64,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl FlowNode {
    /// New node with a fresh id and the kind's default label and timeout.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            id: new_id(),
            label: kind.default_label().to_string(),
            position: NodePosition::default(),
            output_edge_ids: Vec::new(),
            on_failure_edge_id: None,
            timeout_ms: kind.default_timeout_ms(),
            kind,
        }
    }

    /// Start node, optionally launching an app before the flow continues.
    pub fn start(app_package_name: Option<String>) -> Self {
        Self::new(NodeKind::Start { app_package_name })
    }

    /// Fixed-duration delay node.
    pub fn delay(delay_ms: u64) -> Self {
        Self::new(NodeKind::Delay { delay_ms })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_failure_edge(mut self, edge_id: impl Into<String>) -> Self {
        self.on_failure_edge_id = Some(edge_id.into());
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = NodePosition { x, y };
        self
    }

    /// True for the unique graph entry node.
    pub fn is_start(&self) -> bool {
        matches!(self.kind, NodeKind::Start { .. })
    }
}
