//! Brush stroke interpolation.
//!
//! Pointer drags arrive as discrete samples. Stamping one disc per sample
//! leaves gaps when the pointer moves faster than a brush radius per event,
//! so each new sample is joined to the previous one with evenly spaced
//! stamps no further apart than half the radius.

#[cfg(test)]
#[path = "stroke_test.rs"]
mod stroke_test;

use crate::camera::MapPoint;
use crate::consts::STROKE_STEP_RATIO;

/// Stamp positions from `last` to `current`, excluding `last` and including
/// `current`.
///
/// `step = max(1, radius * 0.5)`, `count = max(1, round(distance / step))`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn interpolate(last: MapPoint, current: MapPoint, radius: f64) -> Vec<MapPoint> {
    let dx = (current.x - last.x) as f64;
    let dy = (current.y - last.y) as f64;
    let distance = dx.hypot(dy);
    let step = (radius * STROKE_STEP_RATIO).max(1.0);
    let count = ((distance / step).round() as usize).max(1);

    (1..=count)
        .map(|i| {
            let t = i as f64 / count as f64;
            MapPoint::new(last.x + (dx * t).round() as i64, last.y + (dy * t).round() as i64)
        })
        .collect()
}

/// Tracks one in-progress stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Brush radius in map pixels.
    pub radius: i64,
    /// Whether the stroke reveals (true) or hides (false).
    pub reveal: bool,
    last: Option<MapPoint>,
}

impl Stroke {
    #[must_use]
    pub fn new(radius: i64, reveal: bool) -> Self {
        Self { radius, reveal, last: None }
    }

    /// Last sampled position, if the stroke has started.
    #[must_use]
    pub fn last(&self) -> Option<MapPoint> {
        self.last
    }

    /// Record a new sample and return where to stamp, in order.
    ///
    /// The first sample stamps exactly once at its own position.
    #[allow(clippy::cast_precision_loss)]
    pub fn advance(&mut self, point: MapPoint) -> Vec<MapPoint> {
        let stamps = match self.last {
            None => vec![point],
            Some(last) => interpolate(last, point, self.radius as f64),
        };
        self.last = Some(point);
        stamps
    }
}
