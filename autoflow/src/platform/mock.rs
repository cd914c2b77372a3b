//! Scripted platform collaborators for tests and simulated runs.
//!
//! Each mock returns fixed or scripted results; no device required.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::model::Region;

use super::{
    AppLauncher, DetectedElement, Frame, GestureDispatcher, GestureRequest, LaunchHandle,
    OcrResult, PatternMatch, PatternMatcher, Perception, PlatformError, ScreenCapture,
};

/// Gesture dispatcher with a configurable connection state; records every
/// dispatched request.
pub struct MockGestureDispatcher {
    connected: bool,
    fail_dispatch: bool,
    dispatched: Mutex<Vec<GestureRequest>>,
}

impl MockGestureDispatcher {
    pub fn connected() -> Self {
        Self {
            connected: true,
            fail_dispatch: false,
            dispatched: Mutex::new(Vec::new()),
        }
    }

    pub fn disconnected() -> Self {
        Self {
            connected: false,
            fail_dispatch: false,
            dispatched: Mutex::new(Vec::new()),
        }
    }

    /// Connected, but every dispatch call fails.
    pub fn failing() -> Self {
        Self {
            connected: true,
            fail_dispatch: true,
            dispatched: Mutex::new(Vec::new()),
        }
    }

    /// Requests dispatched so far, in order.
    pub fn dispatched(&self) -> Vec<GestureRequest> {
        self.dispatched.lock().unwrap().clone()
    }
}

#[async_trait]
impl GestureDispatcher for MockGestureDispatcher {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn dispatch(&self, request: GestureRequest) -> Result<(), PlatformError> {
        if self.fail_dispatch {
            return Err(PlatformError::NotConnected);
        }
        self.dispatched.lock().unwrap().push(request);
        Ok(())
    }
}

/// Screen capture returning one fixed frame, or failing every call.
pub struct MockScreenCapture {
    frame: Option<Frame>,
}

impl MockScreenCapture {
    /// Always returns a zeroed frame of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            frame: Some(Frame::new(width, height, vec![0; (width * height) as usize])),
        }
    }

    /// Every capture fails, as when the projection was never started.
    pub fn unavailable() -> Self {
        Self { frame: None }
    }
}

#[async_trait]
impl ScreenCapture for MockScreenCapture {
    async fn capture_frame(&self) -> Result<Frame, PlatformError> {
        self.frame
            .clone()
            .ok_or_else(|| PlatformError::Capture("projection not started".into()))
    }
}

/// Pattern matcher returning a scripted result regardless of frame content.
pub struct MockPatternMatcher {
    result: Option<PatternMatch>,
}

impl MockPatternMatcher {
    pub fn never_matches() -> Self {
        Self { result: None }
    }

    /// Every search reports this hit, subject to the caller's threshold.
    pub fn always_matches(hit: PatternMatch) -> Self {
        Self { result: Some(hit) }
    }
}

#[async_trait]
impl PatternMatcher for MockPatternMatcher {
    async fn search(
        &self,
        _template_path: &str,
        _frame: &Frame,
        _region: Region,
        threshold: f32,
    ) -> Result<Option<PatternMatch>, PlatformError> {
        Ok(self.result.filter(|m| m.score >= threshold))
    }
}

/// Perception with fixed OCR text and a fixed element list.
#[derive(Default)]
pub struct MockPerception {
    ocr: OcrResult,
    elements: Vec<DetectedElement>,
}

impl MockPerception {
    pub fn with_ocr(mut self, ocr: OcrResult) -> Self {
        self.ocr = ocr;
        self
    }

    pub fn with_elements(mut self, elements: Vec<DetectedElement>) -> Self {
        self.elements = elements;
        self
    }
}

#[async_trait]
impl Perception for MockPerception {
    async fn extract_text(&self, _frame: &Frame) -> Result<OcrResult, PlatformError> {
        Ok(self.ocr.clone())
    }

    async fn detect_elements(
        &self,
        _frame: &Frame,
        _target_label: Option<&str>,
    ) -> Result<Vec<DetectedElement>, PlatformError> {
        Ok(self.elements.clone())
    }
}

/// App launcher resolving either everything or only a fixed set of packages.
pub struct MockAppLauncher {
    known: Option<HashSet<String>>,
    launched: Mutex<Vec<String>>,
}

impl MockAppLauncher {
    pub fn resolving_all() -> Self {
        Self {
            known: None,
            launched: Mutex::new(Vec::new()),
        }
    }

    pub fn resolving_only(packages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            known: Some(packages.into_iter().map(Into::into).collect()),
            launched: Mutex::new(Vec::new()),
        }
    }

    /// Package ids launched so far, in order.
    pub fn launched(&self) -> Vec<String> {
        self.launched.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppLauncher for MockAppLauncher {
    fn resolve(&self, app_id: &str) -> Option<LaunchHandle> {
        match &self.known {
            Some(known) if !known.contains(app_id) => None,
            _ => Some(LaunchHandle {
                app_id: app_id.to_string(),
            }),
        }
    }

    async fn launch(&self, handle: &LaunchHandle) -> Result<(), PlatformError> {
        self.launched.lock().unwrap().push(handle.app_id.clone());
        Ok(())
    }
}
