//! Input model: tools, keys, mouse buttons, and the gesture state machine.
//!
//! This module defines the types consumed by the sync coordinator. `Tool` and
//! `UiState` capture the operator's intent at the time of a pointer event.
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up on the authoring viewport, carrying the context needed to stamp
//! interpolated brush discs, size a rectangle, or drag the presentation
//! overlay.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::{MapPoint, Point};
use crate::consts::{BRUSH_SIZE_STEP_PX, DEFAULT_BRUSH_SIZE_PX, MAX_BRUSH_SIZE_PX, MIN_BRUSH_SIZE_PX};
use crate::stroke::Stroke;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Freehand brush (default).
    #[default]
    Brush,
    /// Drag out a rectangle.
    Rect,
    /// Drag the presentation overlay.
    Pan,
}

impl Tool {
    /// Whether this tool edits the fog mask.
    #[must_use]
    pub fn edits_fog(self) -> bool {
        matches!(self, Self::Brush | Self::Rect)
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the windowing layer
/// (e.g. `"b"`, `"["`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// `true` reveals, `false` hides.
    pub reveal: bool,
    /// Brush radius in authoring screen pixels.
    pub brush_size_px: u32,
}

impl Default for UiState {
    fn default() -> Self {
        Self { tool: Tool::Brush, reveal: true, brush_size_px: DEFAULT_BRUSH_SIZE_PX }
    }
}

impl UiState {
    /// Set the brush size, clamped to the supported range.
    pub fn set_brush_size(&mut self, size_px: u32) {
        self.brush_size_px = size_px.clamp(MIN_BRUSH_SIZE_PX, MAX_BRUSH_SIZE_PX);
    }

    /// Grow (`steps > 0`) or shrink the brush by whole size steps.
    pub fn adjust_brush_size(&mut self, steps: i32) {
        let delta = BRUSH_SIZE_STEP_PX.saturating_mul(steps.unsigned_abs());
        let size = if steps >= 0 {
            self.brush_size_px.saturating_add(delta)
        } else {
            self.brush_size_px.saturating_sub(delta)
        };
        self.set_brush_size(size);
    }

    /// Brush radius in map pixels for an authoring view at `scale`.
    ///
    /// Truncates toward zero; `0` when the scale is not positive.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn brush_radius(&self, scale: f64) -> i64 {
        if !(scale.is_finite() && scale > 0.0) {
            return 0;
        }
        (f64::from(self.brush_size_px) / scale) as i64
    }
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute deltas and
/// emit final actions on pointer-up.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A brush stroke is open; every move stamps interpolated discs.
    Brushing {
        /// Radius, mode, and last stamped map position.
        stroke: Stroke,
    },
    /// The user is sizing a rectangle by dragging from an anchor corner.
    DrawingRect {
        /// Map-space corner where the drag started.
        anchor: MapPoint,
        /// Map-space corner under the pointer.
        current: MapPoint,
        /// Mode captured at press time.
        reveal: bool,
    },
    /// The user is dragging the presentation overlay.
    DraggingOverlay {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
        /// Fractional map-pixel remainder not yet applied to the pan.
        carry: Point,
        /// Whether any sample actually moved the pan.
        moved: bool,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
