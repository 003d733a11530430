//! Fog mask raster and its edit operations.
//!
//! The mask is a single-channel image the same size as its map surface:
//! `0` hides a pixel, `255` reveals it. Edits are hard-edged, so a mask that
//! only ever passes through these operations holds nothing but 0 and 255.
//!
//! Pixels live behind an `Arc` so renderers and the persistence queue can hold
//! cheap snapshots. The first write after a snapshot copies the buffer
//! (`Arc::make_mut`); edits that would not change any pixel skip the copy.

#[cfg(test)]
#[path = "mask_test.rs"]
mod mask_test;

use std::sync::Arc;

use image::{GrayImage, Luma};
use tracing::{debug, warn};

use crate::camera::{MapPoint, MapRect};
use crate::consts::{HIDDEN, REVEAL_THRESHOLD, REVEALED};

/// How a mask came into being when a map was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskLoad {
    /// The stored mask matched the surface and was used as-is (after snapping
    /// stray values to 0/255).
    Restored,
    /// No stored mask existed; a fully hidden one was created.
    Created,
    /// The stored mask had the wrong dimensions and was replaced.
    Repaired { found_width: u32, found_height: u32 },
}

/// Per-pixel hidden/revealed state for one map.
#[derive(Debug, Clone, PartialEq)]
pub struct FogMask {
    pixels: Arc<GrayImage>,
}

impl FogMask {
    /// A fully hidden mask.
    #[must_use]
    pub fn hidden(width: u32, height: u32) -> Self {
        Self { pixels: Arc::new(GrayImage::from_pixel(width, height, Luma([HIDDEN]))) }
    }

    /// Adopt a stored mask for a surface of `width` x `height`.
    ///
    /// Absent masks start fully hidden. A mask with mismatched dimensions is
    /// never stretched or cropped into place: it is discarded and replaced by a
    /// fully hidden one.
    #[must_use]
    pub fn from_stored(stored: Option<GrayImage>, width: u32, height: u32) -> (Self, MaskLoad) {
        let Some(mut image) = stored else {
            return (Self::hidden(width, height), MaskLoad::Created);
        };

        let (found_width, found_height) = image.dimensions();
        if (found_width, found_height) != (width, height) {
            warn!(found_width, found_height, width, height, "fog mask size mismatch; recreating hidden mask");
            return (Self::hidden(width, height), MaskLoad::Repaired { found_width, found_height });
        }

        let mut snapped = 0usize;
        for pixel in image.pixels_mut() {
            let canonical = if pixel.0[0] >= REVEAL_THRESHOLD { REVEALED } else { HIDDEN };
            if pixel.0[0] != canonical {
                pixel.0[0] = canonical;
                snapped += 1;
            }
        }
        if snapped > 0 {
            debug!(snapped, "snapped non-canonical fog mask values");
        }

        (Self { pixels: Arc::new(image) }, MaskLoad::Restored)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// The raw mask value at a map pixel, or `None` outside the mask.
    #[must_use]
    pub fn get(&self, p: MapPoint) -> Option<u8> {
        let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y)) else {
            return None;
        };
        self.pixels.get_pixel_checked(x, y).map(|px| px.0[0])
    }

    #[must_use]
    pub fn is_revealed(&self, p: MapPoint) -> bool {
        self.get(p) == Some(REVEALED)
    }

    /// Number of revealed pixels.
    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.pixels.as_raw().iter().filter(|&&v| v == REVEALED).count()
    }

    /// Borrow the underlying raster.
    #[must_use]
    pub fn image(&self) -> &GrayImage {
        &self.pixels
    }

    /// A shared, immutable copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Arc<GrayImage> {
        Arc::clone(&self.pixels)
    }

    /// Fill a disc centered at (`cx`, `cy`). Returns whether any pixel changed.
    ///
    /// The disc holds every pixel with `dx² + dy² <= radius²`. A radius of 0
    /// stamps the center pixel; negative radii are treated as 0.
    pub fn apply_brush(&mut self, cx: i64, cy: i64, radius: i64, reveal: bool) -> bool {
        let r = radius.max(0);
        let bounds = MapRect {
            left: cx.saturating_sub(r),
            top: cy.saturating_sub(r),
            right: cx.saturating_add(r),
            bottom: cy.saturating_add(r),
        };
        // Squares of far-off centers and huge radii do not fit in i64.
        let r2 = u128::from(r.unsigned_abs()).pow(2);
        self.fill_where(bounds, fill_value(reveal), |x, y| {
            let dx = (i128::from(x) - i128::from(cx)).unsigned_abs();
            let dy = (i128::from(y) - i128::from(cy)).unsigned_abs();
            dx * dx + dy * dy <= r2
        })
    }

    /// Fill the rectangle spanned by two corners, both inclusive, in any order.
    /// Returns whether any pixel changed.
    pub fn apply_rectangle(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, reveal: bool) -> bool {
        let rect = MapRect::from_corners(MapPoint::new(x1, y1), MapPoint::new(x2, y2));
        self.fill_where(rect, fill_value(reveal), |_, _| true)
    }

    /// Reveal the whole map. Returns whether any pixel changed.
    pub fn reveal_all(&mut self) -> bool {
        self.fill_all(REVEALED)
    }

    /// Hide the whole map. Returns whether any pixel changed.
    pub fn hide_all(&mut self) -> bool {
        self.fill_all(HIDDEN)
    }

    fn fill_all(&mut self, value: u8) -> bool {
        if self.pixels.as_raw().iter().all(|&v| v == value) {
            return false;
        }
        let image = Arc::make_mut(&mut self.pixels);
        for pixel in image.pixels_mut() {
            pixel.0[0] = value;
        }
        true
    }

    /// Clip `rect` to the mask bounds.
    fn clip(&self, rect: MapRect) -> Option<MapRect> {
        let max_x = i64::from(self.width()) - 1;
        let max_y = i64::from(self.height()) - 1;
        let clipped = MapRect {
            left: rect.left.max(0),
            top: rect.top.max(0),
            right: rect.right.min(max_x),
            bottom: rect.bottom.min(max_y),
        };
        (clipped.left <= clipped.right && clipped.top <= clipped.bottom).then_some(clipped)
    }

    /// Write `value` to every pixel in `rect` accepted by `covers`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn fill_where<F>(&mut self, rect: MapRect, value: u8, covers: F) -> bool
    where
        F: Fn(i64, i64) -> bool,
    {
        let Some(clip) = self.clip(rect) else {
            return false;
        };

        // Coordinates are within [0, u32::MAX] after clipping.
        let changes = (clip.top..=clip.bottom).any(|y| {
            (clip.left..=clip.right)
                .any(|x| covers(x, y) && self.pixels.get_pixel(x as u32, y as u32).0[0] != value)
        });
        if !changes {
            return false;
        }

        let image = Arc::make_mut(&mut self.pixels);
        for y in clip.top..=clip.bottom {
            for x in clip.left..=clip.right {
                if covers(x, y) {
                    image.put_pixel(x as u32, y as u32, Luma([value]));
                }
            }
        }
        true
    }
}

fn fill_value(reveal: bool) -> u8 {
    if reveal { REVEALED } else { HIDDEN }
}
