//! Rendering: composites one viewport's visible region from surface and mask.
//!
//! A [`MapRenderer`] belongs to exactly one viewport. It receives read-only
//! snapshots of the map surface and fog mask and produces the bitmap the
//! display layer shows. It does not mutate any application state.
//!
//! Pipeline per frame:
//!
//! 1. Resample the surface to the viewport scale (Lanczos, cached until the
//!    surface or scale changes). The mask is sampled nearest-neighbor so
//!    reveal edges stay crisp.
//! 2. Hidden pixels get a black occluder at the mode's opacity; revealed
//!    pixels get none.
//! 3. Crop to the viewport at the scaled pan, or center on the neutral
//!    background along any axis where the scaled map is smaller than the
//!    viewport.
//!
//! Finished frames are cached per (pan, viewport size) until the surface,
//! mask, or scale changes. Rendering never fails loudly: `None` is the only
//! failure signal.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{GrayImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::camera::{MapPoint, ScreenRect, ViewportSize};
use crate::consts::{AUTHORING_FOG_OPACITY, BACKGROUND_RGBA, PRESENTATION_FOG_OPACITY, REVEAL_THRESHOLD};

/// Smoothing filter for the map surface.
pub const SURFACE_FILTER: FilterType = FilterType::Lanczos3;

/// Outline thickness for overlays, in screen pixels.
const OUTLINE_PX: i64 = 2;

/// Which surface a renderer draws for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Operator view: fog is translucent so hidden content stays legible.
    Authoring,
    /// Player view: fog is fully opaque and strictly binary.
    Presentation,
}

/// Occluder alpha for one mask value.
///
/// Presentation ignores `authoring_opacity` and thresholds the mask, so no
/// partially occluded pixel can ever reach the player display.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn occluder_alpha(mode: RenderMode, authoring_opacity: u8, mask_value: u8) -> u8 {
    match mode {
        RenderMode::Presentation => {
            if mask_value >= REVEAL_THRESHOLD {
                0
            } else {
                PRESENTATION_FOG_OPACITY
            }
        }
        RenderMode::Authoring => scaled_alpha(authoring_opacity, mask_value),
    }
}

/// `(255 - mask_value) * opacity / 255`.
#[allow(clippy::cast_possible_truncation)]
fn scaled_alpha(opacity: u8, mask_value: u8) -> u8 {
    ((u32::from(255 - mask_value) * u32::from(opacity)) / 255) as u8
}

/// Composite a black occluder of alpha `a` over `px` in place.
#[allow(clippy::cast_possible_truncation)]
fn occlude(px: &mut Rgba<u8>, a: u8) {
    if a == 0 {
        return;
    }
    let keep = 255 - u32::from(a);
    for c in 0..3 {
        px.0[c] = ((u32::from(px.0[c]) * keep + 127) / 255) as u8;
    }
    px.0[3] = (u32::from(a) + (u32::from(px.0[3]) * keep + 127) / 255) as u8;
}

/// `floor(len * scale)` per axis, `None` if either is zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> Option<(u32, u32)> {
    if !(scale.is_finite() && scale > 0.0) {
        return None;
    }
    let w = (f64::from(width) * scale).floor() as u32;
    let h = (f64::from(height) * scale).floor() as u32;
    (w > 0 && h > 0).then_some((w, h))
}

/// Where the scaled map lands inside the viewport along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSpan {
    /// First scaled-map pixel shown.
    pub src: u32,
    /// Viewport pixel it is drawn at.
    pub dst: u32,
    /// Number of pixels shown.
    pub len: u32,
}

impl AxisSpan {
    /// Center when the map is shorter than the viewport, otherwise crop at
    /// the scaled pan clamped into the image.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resolve(scaled_len: u32, viewport_len: u32, scaled_pan: i64) -> Option<Self> {
        if scaled_len == 0 || viewport_len == 0 {
            return None;
        }
        if scaled_len < viewport_len {
            return Some(Self { src: 0, dst: (viewport_len - scaled_len) / 2, len: scaled_len });
        }
        let src = scaled_pan.clamp(0, i64::from(scaled_len) - 1) as u32;
        let end = src.saturating_add(viewport_len).min(scaled_len);
        Some(Self { src, dst: 0, len: end - src })
    }
}

/// Offset of the scaled map's origin inside a viewport along one axis.
#[must_use]
pub fn center_offset(scaled_len: u32, viewport_len: u32) -> u32 {
    viewport_len.saturating_sub(scaled_len) / 2
}

/// Nearest source index for scaled index `s`, sampling pixel centers.
#[allow(clippy::cast_possible_truncation)]
fn nearest(s: u32, scaled_len: u32, source_len: u32) -> u32 {
    let idx = (u64::from(s) * 2 + 1) * u64::from(source_len) / (u64::from(scaled_len) * 2);
    (idx as u32).min(source_len.saturating_sub(1))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn scaled_pan(pan: i64, scale: f64) -> i64 {
    (pan as f64 * scale).floor() as i64
}

/// Crop/center a scaled surface into a viewport, occluding hidden pixels.
fn compose(
    scaled: &RgbaImage,
    mask: &GrayImage,
    pan: MapPoint,
    scale: f64,
    viewport: ViewportSize,
    mode: RenderMode,
    authoring_opacity: u8,
) -> Option<RgbaImage> {
    let (sw, sh) = scaled.dimensions();
    let (mw, mh) = mask.dimensions();
    if mw == 0 || mh == 0 {
        return None;
    }
    let xs = AxisSpan::resolve(sw, viewport.width, scaled_pan(pan.x, scale))?;
    let ys = AxisSpan::resolve(sh, viewport.height, scaled_pan(pan.y, scale))?;

    let mut frame = RgbaImage::from_pixel(viewport.width, viewport.height, Rgba(BACKGROUND_RGBA));
    for row in 0..ys.len {
        let sy = ys.src + row;
        let my = nearest(sy, sh, mh);
        for col in 0..xs.len {
            let sx = xs.src + col;
            let mx = nearest(sx, sw, mw);
            let mut px = *scaled.get_pixel(sx, sy);
            occlude(&mut px, occluder_alpha(mode, authoring_opacity, mask.get_pixel(mx, my).0[0]));
            frame.put_pixel(xs.dst + col, ys.dst + row, px);
        }
    }
    Some(frame)
}

#[derive(Debug, Clone)]
struct CachedFrame {
    viewport: ViewportSize,
    pan: MapPoint,
    image: Arc<RgbaImage>,
}

/// Per-viewport compositor with a render cache.
#[derive(Debug, Clone)]
pub struct MapRenderer {
    mode: RenderMode,
    authoring_opacity: u8,
    surface: Option<Arc<RgbaImage>>,
    mask: Option<Arc<GrayImage>>,
    scale: f64,
    scaled: Option<RgbaImage>,
    frame: Option<CachedFrame>,
}

impl MapRenderer {
    #[must_use]
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            authoring_opacity: AUTHORING_FOG_OPACITY,
            surface: None,
            mask: None,
            scale: 1.0,
            scaled: None,
            frame: None,
        }
    }

    #[must_use]
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn has_surface(&self) -> bool {
        self.surface.is_some() && self.mask.is_some()
    }

    /// Dimensions of the current surface.
    #[must_use]
    pub fn surface_dimensions(&self) -> Option<(u32, u32)> {
        self.surface.as_ref().map(|s| s.dimensions())
    }

    /// Authoring fog opacity. Presentation output is always fully opaque.
    pub fn set_authoring_opacity(&mut self, opacity: u8) {
        if self.authoring_opacity != opacity {
            self.authoring_opacity = opacity;
            self.frame = None;
        }
    }

    /// Replace the surface and mask.
    pub fn set_surface(&mut self, surface: Arc<RgbaImage>, mask: Arc<GrayImage>) {
        let mask = conform_mask(mask, surface.dimensions());
        self.surface = Some(surface);
        self.mask = Some(mask);
        self.scaled = None;
        self.frame = None;
    }

    /// Drop the surface and mask; subsequent renders return `None`.
    pub fn clear(&mut self) {
        self.surface = None;
        self.mask = None;
        self.scaled = None;
        self.frame = None;
    }

    /// Set screen pixels per map pixel. Non-positive scales are stored but
    /// render nothing.
    #[allow(clippy::float_cmp)]
    pub fn set_scale(&mut self, scale: f64) {
        if self.scale != scale {
            self.scale = scale;
            self.scaled = None;
            self.frame = None;
        }
    }

    /// Swap in a new mask snapshot. Ignored while no surface is set.
    pub fn update_fog(&mut self, mask: Arc<GrayImage>) {
        let Some(dims) = self.surface_dimensions() else {
            return;
        };
        self.mask = Some(conform_mask(mask, dims));
        self.frame = None;
    }

    /// Discard every cached result.
    pub fn refresh(&mut self) {
        self.scaled = None;
        self.frame = None;
    }

    /// The visible bitmap for a viewport of `viewport` pixels at `pan`.
    ///
    /// `None` when no map is set, the viewport has no area, or the scale is
    /// not positive.
    pub fn render(&mut self, viewport: ViewportSize, pan: MapPoint) -> Option<Arc<RgbaImage>> {
        if viewport.is_empty() {
            return None;
        }
        let surface = Arc::clone(self.surface.as_ref()?);
        let mask = Arc::clone(self.mask.as_ref()?);

        if let Some(cached) = &self.frame {
            if cached.viewport == viewport && cached.pan == pan {
                return Some(Arc::clone(&cached.image));
            }
        }

        let (mode, opacity, scale) = (self.mode, self.authoring_opacity, self.scale);
        let scaled = self.scaled_surface(&surface)?;
        let image = Arc::new(compose(scaled, &mask, pan, scale, viewport, mode, opacity)?);
        self.frame = Some(CachedFrame { viewport, pan, image: Arc::clone(&image) });
        Some(image)
    }

    fn scaled_surface(&mut self, surface: &RgbaImage) -> Option<&RgbaImage> {
        if self.scaled.is_none() {
            let (w, h) = scaled_dimensions(surface.width(), surface.height(), self.scale)?;
            debug!(mode = ?self.mode, scale = self.scale, width = w, height = h, "resampling map surface");
            self.scaled = Some(imageops::resize(surface, w, h, SURFACE_FILTER));
        }
        self.scaled.as_ref()
    }
}

/// Replace a mask that does not match the surface with a hidden one.
fn conform_mask(mask: Arc<GrayImage>, dims: (u32, u32)) -> Arc<GrayImage> {
    if mask.dimensions() == dims {
        return mask;
    }
    warn!(
        mask_width = mask.width(),
        mask_height = mask.height(),
        width = dims.0,
        height = dims.1,
        "renderer received mismatched fog mask; using hidden mask"
    );
    Arc::new(GrayImage::new(dims.0, dims.1))
}

/// Whole-map preview fitted inside `bounds`, for map lists.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_thumbnail(surface: &RgbaImage, mask: &GrayImage, bounds: ViewportSize, opacity: u8) -> Option<RgbaImage> {
    let (w, h) = surface.dimensions();
    if bounds.is_empty() || w == 0 || h == 0 || mask.dimensions() != (w, h) {
        return None;
    }
    let scale = (f64::from(bounds.width) / f64::from(w)).min(f64::from(bounds.height) / f64::from(h));
    let (tw, th) = scaled_dimensions(w, h, scale)?;

    let mut thumb = imageops::resize(surface, tw, th, SURFACE_FILTER);
    let fog = imageops::resize(mask, tw, th, FilterType::Nearest);
    for (px, m) in thumb.pixels_mut().zip(fog.pixels()) {
        occlude(px, scaled_alpha(opacity, m.0[0]));
    }
    Some(thumb)
}

/// Draw a dashed outline (the presentation-region overlay).
pub fn draw_dashed_rect(frame: &mut RgbaImage, rect: ScreenRect, color: [u8; 4], dash: u32) {
    stroke_rect(frame, rect, Rgba(color), Some(dash.max(1)));
}

/// Draw a solid outline (the rectangle-tool preview).
pub fn draw_rect_outline(frame: &mut RgbaImage, rect: ScreenRect, color: [u8; 4]) {
    stroke_rect(frame, rect, Rgba(color), None);
}

#[allow(clippy::cast_possible_truncation)]
fn stroke_rect(frame: &mut RgbaImage, rect: ScreenRect, color: Rgba<u8>, dash: Option<u32>) {
    let left = rect.x.round() as i64;
    let top = rect.y.round() as i64;
    let right = rect.right().round() as i64 - 1;
    let bottom = rect.bottom().round() as i64 - 1;
    let on = |i: i64| dash.map_or(true, |d| (i / i64::from(d)) % 2 == 0);

    for inset in 0..OUTLINE_PX {
        let (l, t, r, b) = (left + inset, top + inset, right - inset, bottom - inset);
        if l > r || t > b {
            break;
        }
        for x in l..=r {
            if on(x - l) {
                plot(frame, x, t, color);
                plot(frame, x, b, color);
            }
        }
        for y in t..=b {
            if on(y - t) {
                plot(frame, l, y, color);
                plot(frame, r, y, color);
            }
        }
    }
}

fn plot(frame: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x < frame.width() && y < frame.height() {
        frame.put_pixel(x, y, color);
    }
}
