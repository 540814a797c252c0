//! Viewport controller: pan offset and zoom scale for the preview.
//!
//! DESIGN
//! ======
//! Pure state machine, no I/O. The orchestrator wraps it in a mutex and
//! feeds it pointer and zoom events plus the measured bounds of each newly
//! committed artifact. Pan and zoom are independent of render outcome.

use serde::Serialize;

use crate::render::Bounds;

pub const MIN_SCALE: f64 = 0.2;
pub const MAX_SCALE: f64 = 3.0;

/// Increment used by zoom-in/zoom-out controls and per wheel notch.
pub const ZOOM_STEP: f64 = 0.1;

pub const DEFAULT_CONTAINER: Bounds = Bounds { width: 1280.0, height: 720.0 };

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportState {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self { offset_x: 0.0, offset_y: 0.0, scale: 1.0 }
    }
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    state: ViewportState,
    container: Bounds,
    artifact: Option<Bounds>,
    /// Pointer position minus offset at drag start.
    anchor: Option<(f64, f64)>,
    /// Bumped on every offset write.
    pan_revision: u64,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ViewportState::default(),
            container: DEFAULT_CONTAINER,
            artifact: None,
            anchor: None,
            pan_revision: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> ViewportState {
        self.state
    }

    #[must_use]
    pub fn container(&self) -> Bounds {
        self.container
    }

    pub fn begin_drag(&mut self, x: f64, y: f64) {
        self.anchor = Some((x - self.state.offset_x, y - self.state.offset_y));
    }

    /// Move the offset with the pointer. No-op without an active drag.
    pub fn continue_drag(&mut self, x: f64, y: f64) {
        let Some((ax, ay)) = self.anchor else {
            return;
        };
        self.set_offset(x - ax, y - ay);
    }

    pub fn end_drag(&mut self) {
        self.anchor = None;
    }

    pub fn zoom(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        self.state.scale = (self.state.scale + delta).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn zoom_in(&mut self) {
        self.zoom(ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(-ZOOM_STEP);
    }

    /// Wheel notch: scrolling up (negative `delta_y`) zooms in.
    pub fn wheel(&mut self, delta_y: f64) {
        if delta_y < 0.0 {
            self.zoom_in();
        } else if delta_y > 0.0 {
            self.zoom_out();
        }
    }

    /// Center `artifact` inside the container at the current scale.
    pub fn recenter(&mut self, artifact: Bounds) {
        self.artifact = Some(artifact);
        self.set_offset(
            (self.container.width - artifact.width * self.state.scale) / 2.0,
            (self.container.height - artifact.height * self.state.scale) / 2.0,
        );
    }

    /// Scale back to 1 and recenter. Without an artifact only the scale resets.
    pub fn reset_view(&mut self) {
        self.state.scale = 1.0;
        self.fit_to_view();
    }

    /// Recenter on the last committed artifact.
    pub fn fit_to_view(&mut self) {
        if let Some(artifact) = self.artifact {
            self.recenter(artifact);
        }
    }

    /// Forget the artifact after a failed or empty render. The offset stays.
    pub fn clear_artifact(&mut self) {
        self.artifact = None;
    }

    /// Record a new display region size. Non-positive sizes are ignored.
    pub fn set_container(&mut self, container: Bounds) {
        if container.width > 0.0 && container.height > 0.0 {
            self.container = container;
        }
    }

    pub(crate) fn set_offset(&mut self, x: f64, y: f64) {
        self.state.offset_x = x;
        self.state.offset_y = y;
        self.pan_revision += 1;
    }

    pub(crate) fn pan_revision(&self) -> u64 {
        self.pan_revision
    }
}

#[cfg(test)]
#[path = "viewport_test.rs"]
mod tests;
