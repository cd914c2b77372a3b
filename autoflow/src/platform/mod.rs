//! Platform collaborator seams.
//!
//! The engine never talks to the device directly: gesture dispatch, screen
//! capture, template matching, perception, and app launch are trait objects
//! supplied by platform-specific code. Scripted in-crate implementations
//! live in [`mock`] for tests and simulated CLI runs.

mod mock;

pub use mock::{
    MockAppLauncher, MockGestureDispatcher, MockPatternMatcher, MockPerception, MockScreenCapture,
};

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{GestureType, Point, Region};

/// Error from a platform collaborator. Executors map these into
/// `NodeResult::Failure` so a platform fault never crashes the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The interaction service is not connected; gestures cannot dispatch.
    #[error("interaction service not connected")]
    NotConnected,

    /// No screen frame could be captured.
    #[error("screen capture failed: {0}")]
    Capture(String),

    /// Template matching could not run (missing template, decode error).
    #[error("pattern search failed: {0}")]
    Search(String),

    /// OCR or element detection could not run.
    #[error("perception failed: {0}")]
    Perception(String),

    /// The launch call itself errored.
    #[error("app launch failed: {0}")]
    Launch(String),
}

/// One captured screen frame. Opaque to the engine; collaborators agree on
/// the pixel layout.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<Vec<u8>>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::new(data),
        }
    }
}

/// A template match hit within a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatternMatch {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub score: f32,
}

impl PatternMatch {
    /// Centre of the matched rectangle, the point gestures aim at.
    pub fn center(&self) -> Point {
        Point {
            x: self.x as f32 + self.width as f32 / 2.0,
            y: self.y as f32 + self.height as f32 / 2.0,
        }
    }
}

/// One block of recognized text with its bounds, when known.
#[derive(Clone, Debug, PartialEq)]
pub struct OcrBlock {
    pub text: String,
    pub bounds: Option<Region>,
}

/// Result of a text-extraction pass over a frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OcrResult {
    pub full_text: String,
    pub blocks: Vec<OcrBlock>,
}

/// One detected UI element.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedElement {
    pub label: String,
    pub bounds: Region,
    pub confidence: f32,
}

impl DetectedElement {
    pub fn center(&self) -> Point {
        Point {
            x: self.bounds.x as f32 + self.bounds.width as f32 / 2.0,
            y: self.bounds.y as f32 + self.bounds.height as f32 / 2.0,
        }
    }
}

/// Resolved target for an app launch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchHandle {
    pub app_id: String,
}

/// A gesture ready for dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureRequest {
    pub kind: GestureType,
    pub point: Point,
    /// End point for swipes; `None` means the platform's default swipe.
    pub end: Option<Point>,
    pub duration_ms: u64,
}

/// Dispatches gestures through the platform's interaction service.
#[async_trait]
pub trait GestureDispatcher: Send + Sync {
    /// Capability check; dispatch is attempted only when this passes.
    fn is_connected(&self) -> bool;

    async fn dispatch(&self, request: GestureRequest) -> Result<(), PlatformError>;
}

/// Supplies the current screen frame, waiting internally for one to arrive.
#[async_trait]
pub trait ScreenCapture: Send + Sync {
    async fn capture_frame(&self) -> Result<Frame, PlatformError>;
}

/// Template matching scoped to a captured frame.
#[async_trait]
pub trait PatternMatcher: Send + Sync {
    /// Searches `frame` (restricted to `region` unless unbounded) for the
    /// template at `template_path`. `Ok(None)` means the search ran and
    /// nothing scored at or above `threshold`.
    async fn search(
        &self,
        template_path: &str,
        frame: &Frame,
        region: Region,
        threshold: f32,
    ) -> Result<Option<PatternMatch>, PlatformError>;
}

/// On-device perception: OCR and element detection over a frame.
#[async_trait]
pub trait Perception: Send + Sync {
    async fn extract_text(&self, frame: &Frame) -> Result<OcrResult, PlatformError>;

    async fn detect_elements(
        &self,
        frame: &Frame,
        target_label: Option<&str>,
    ) -> Result<Vec<DetectedElement>, PlatformError>;
}

/// Resolves and launches apps by package identifier.
#[async_trait]
pub trait AppLauncher: Send + Sync {
    /// `None` when the identifier maps to no launchable target.
    fn resolve(&self, app_id: &str) -> Option<LaunchHandle>;

    async fn launch(&self, handle: &LaunchHandle) -> Result<(), PlatformError>;
}

/// Bundle of collaborator handles the engine wires into its executors.
#[derive(Clone)]
pub struct FlowServices {
    pub gestures: Arc<dyn GestureDispatcher>,
    pub capture: Arc<dyn ScreenCapture>,
    pub matcher: Arc<dyn PatternMatcher>,
    pub perception: Arc<dyn Perception>,
    pub launcher: Arc<dyn AppLauncher>,
}

impl FlowServices {
    /// Fully simulated services: connected gestures, a blank frame, no
    /// pattern hits, empty perception, and a launcher that resolves
    /// everything. Useful for dry runs and tests.
    pub fn simulated() -> Self {
        Self {
            gestures: Arc::new(MockGestureDispatcher::connected()),
            capture: Arc::new(MockScreenCapture::blank(1080, 1920)),
            matcher: Arc::new(MockPatternMatcher::never_matches()),
            perception: Arc::new(MockPerception::default()),
            launcher: Arc::new(MockAppLauncher::resolving_all()),
        }
    }
}
