//! Coordinate conversions between viewport screen pixels and map pixels.
//!
//! Everything here is pure. A viewport is described by its scale (screen
//! pixels per map pixel), its pan (the map pixel at the viewport's top-left),
//! and an offset (where the map's scaled origin sits inside the viewport when
//! the map is centered). Callers guarantee `scale > 0`; nothing in this module
//! checks it.
//!
//! `screen_to_map` floors, so a round trip through `map_to_screen` is exact
//! only at scale 1 or on exact pixel boundaries; sub-pixel precision is lost
//! on the integer map grid.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

/// A point in screen space (viewport pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An integer position on the map pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: i64,
    pub y: i64,
}

impl MapPoint {
    #[must_use]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Pixel dimensions of a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A viewport with no area yet (e.g. mid-layout).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned rectangle on the map grid with inclusive corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapRect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl MapRect {
    /// Build a rectangle from any two opposite corners.
    #[must_use]
    pub fn from_corners(a: MapPoint, b: MapPoint) -> Self {
        Self { left: a.x.min(b.x), top: a.y.min(b.y), right: a.x.max(b.x), bottom: a.y.max(b.y) }
    }

    #[must_use]
    pub fn width(&self) -> i64 {
        self.right - self.left + 1
    }

    #[must_use]
    pub fn height(&self) -> i64 {
        self.bottom - self.top + 1
    }

    #[must_use]
    pub fn contains(&self, p: MapPoint) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// Axis-aligned rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    /// Build a rectangle from any two opposite corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self { x, y, width: (a.x - b.x).abs(), height: (a.y - b.y).abs() }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Convert a screen position to the map pixel under it.
///
/// `floor((s - offset) / scale) + pan` on each axis.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn screen_to_map(sx: f64, sy: f64, scale: f64, pan: MapPoint, offset: Point) -> MapPoint {
    MapPoint {
        x: ((sx - offset.x) / scale).floor() as i64 + pan.x,
        y: ((sy - offset.y) / scale).floor() as i64 + pan.y,
    }
}

/// Convert a map pixel to the screen position of its top-left corner.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn map_to_screen(mx: i64, my: i64, scale: f64, pan: MapPoint, offset: Point) -> Point {
    Point { x: (mx - pan.x) as f64 * scale + offset.x, y: (my - pan.y) as f64 * scale + offset.y }
}

/// A viewport's transform: scale, pan, and centering offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub scale: f64,
    pub pan: MapPoint,
    pub offset: Point,
}

impl Default for Camera {
    fn default() -> Self {
        Self { scale: 1.0, pan: MapPoint::default(), offset: Point::default() }
    }
}

impl Camera {
    #[must_use]
    pub fn new(scale: f64, pan: MapPoint, offset: Point) -> Self {
        Self { scale, pan, offset }
    }

    #[must_use]
    pub fn screen_to_map(&self, screen: Point) -> MapPoint {
        screen_to_map(screen.x, screen.y, self.scale, self.pan, self.offset)
    }

    #[must_use]
    pub fn map_to_screen(&self, map: MapPoint) -> Point {
        map_to_screen(map.x, map.y, self.scale, self.pan, self.offset)
    }

    /// Convert a screen-space distance to map pixels (unfloored).
    #[must_use]
    pub fn screen_dist_to_map(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// The map rectangle covered by a viewport of the given size, starting at
    /// the pan origin.
    ///
    /// The last row and column may be only partially on screen. The result
    /// is not clipped to the map bounds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn visible_region(&self, viewport: ViewportSize) -> MapRect {
        let cols = (f64::from(viewport.width) / self.scale).ceil() as i64;
        let rows = (f64::from(viewport.height) / self.scale).ceil() as i64;
        MapRect {
            left: self.pan.x,
            top: self.pan.y,
            right: self.pan.x + (cols - 1).max(0),
            bottom: self.pan.y + (rows - 1).max(0),
        }
    }

    /// Project a map rectangle into this camera's screen space.
    ///
    /// The result spans from the top-left of `rect.left/top` to the
    /// bottom-right of `rect.right/bottom`.
    #[must_use]
    pub fn project_rect(&self, rect: MapRect) -> ScreenRect {
        let a = self.map_to_screen(MapPoint::new(rect.left, rect.top));
        let b = self.map_to_screen(MapPoint::new(rect.right + 1, rect.bottom + 1));
        ScreenRect::from_corners(a, b)
    }
}
