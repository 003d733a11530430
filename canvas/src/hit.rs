//! Hit-testing against the presentation overlay drawn on the authoring view.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Point, ScreenRect};

/// Which part of the overlay was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    /// Within `slop` of the outline; grabbing here drags the overlay.
    Edge,
    /// Inside the outline, clear of the edge band. Brush and rectangle tools
    /// keep working here.
    Interior,
}

/// Test where `screen_pt` falls relative to the overlay outline `rect`.
///
/// The edge band extends `slop` pixels to either side of each side of the
/// rectangle. A rectangle thinner than the band is all edge.
#[must_use]
pub fn hit_overlay(screen_pt: Point, rect: ScreenRect, slop: f64) -> Option<HitPart> {
    let slop = slop.max(0.0);
    let outer = ScreenRect {
        x: rect.x - slop,
        y: rect.y - slop,
        width: rect.width + 2.0 * slop,
        height: rect.height + 2.0 * slop,
    };
    if !outer.contains(screen_pt) {
        return None;
    }

    let inner_w = rect.width - 2.0 * slop;
    let inner_h = rect.height - 2.0 * slop;
    if inner_w > 0.0 && inner_h > 0.0 {
        let inner = ScreenRect { x: rect.x + slop, y: rect.y + slop, width: inner_w, height: inner_h };
        if inner.contains(screen_pt) {
            return Some(HitPart::Interior);
        }
    }
    Some(HitPart::Edge)
}
