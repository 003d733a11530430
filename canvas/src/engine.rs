//! Sync coordinator: owns the active map and keeps both viewports consistent.
//!
//! The authoring viewport always shows the whole map at pan 0, fitted to its
//! window. The presentation viewport shows the region starting at the map's
//! shared pan, at the physical tile scale of its monitor. The two scales are
//! independent and generally differ.
//!
//! Fog edits run inside transactions. Each edit updates the in-memory mask
//! and asks for an authoring repaint; the presentation renderer and the
//! persistence layer hear about the result once, when the transaction ends,
//! and only if the mask actually changed. Edits made with no transaction
//! open commit immediately.
//!
//! Every mutating call returns the [`Action`]s the host must carry out.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::sync::Arc;

use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::camera::{Camera, MapPoint, MapRect, Point, ScreenRect, ViewportSize};
use crate::consts::{
    AUTHORING_FOG_OPACITY, DEFAULT_BRUSH_SIZE_PX, DEFAULT_PPMM, HIDE_PREVIEW_RGBA, OVERLAY_DASH_PX,
    OVERLAY_EDGE_SLOP_PX, OVERLAY_RGBA, REVEAL_PREVIEW_RGBA, THUMBNAIL_FOG_OPACITY,
};
use crate::hit::{HitPart, hit_overlay};
use crate::input::{Button, InputState, Key, Tool, UiState};
use crate::mask::{FogMask, MaskLoad};
use crate::render::{
    MapRenderer, RenderMode, center_offset, draw_dashed_rect, draw_rect_outline, render_thumbnail, scaled_dimensions,
};
use crate::scale::{MonitorInfo, TileSpec, fit_scale};
use crate::session::{ActiveMap, MapId};
use crate::stroke::Stroke;

/// The two surfaces the coordinator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportKind {
    Authoring,
    Presentation,
}

/// Actions returned from coordinator calls for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The viewport's content changed; call its render method.
    RenderNeeded(ViewportKind),
    /// Save the mask snapshot for a map.
    PersistFog { map_id: MapId, mask: Arc<GrayImage> },
    /// Save the pan for a map.
    PersistPan { map_id: MapId, pan: MapPoint },
}

/// Tunables supplied by the host configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Initial brush radius in authoring screen pixels.
    pub brush_size_px: u32,
    /// Occluder alpha over hidden pixels in the authoring view.
    pub authoring_fog_opacity: u8,
    /// Presentation density used until a monitor reports its own.
    pub fallback_ppmm: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            brush_size_px: DEFAULT_BRUSH_SIZE_PX,
            authoring_fog_opacity: AUTHORING_FOG_OPACITY,
            fallback_ppmm: DEFAULT_PPMM,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct FogTransaction {
    edits: usize,
    changed: bool,
}

/// Clamp `pan` so a viewport of `viewport` pixels at `scale` stays inside a
/// map of `map_size` pixels.
///
/// The visible size is `viewport / scale` truncated. When the viewport is
/// empty or the scale is not positive, the whole map counts as visible and
/// the pan is pinned to 0.
#[must_use]
pub fn clamp_pan(pan: MapPoint, map_size: (u32, u32), viewport: ViewportSize, scale: f64) -> MapPoint {
    let map_w = i64::from(map_size.0);
    let map_h = i64::from(map_size.1);
    let (visible_w, visible_h) = if !viewport.is_empty() && scale.is_finite() && scale > 0.0 {
        (visible_len(viewport.width, scale), visible_len(viewport.height, scale))
    } else {
        (map_w, map_h)
    };
    MapPoint {
        x: pan.x.clamp(0, (map_w - visible_w).max(0)),
        y: pan.y.clamp(0, (map_h - visible_h).max(0)),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn visible_len(px: u32, scale: f64) -> i64 {
    (f64::from(px) / scale) as i64
}

/// A camera for a map of `map_size` shown at `scale`, centered on any axis
/// where it is smaller than the viewport.
fn centered_camera(map_size: (u32, u32), scale: f64, viewport: ViewportSize, pan: MapPoint) -> Camera {
    let offset = scaled_dimensions(map_size.0, map_size.1, scale).map_or(Point::default(), |(sw, sh)| {
        Point::new(f64::from(center_offset(sw, viewport.width)), f64::from(center_offset(sh, viewport.height)))
    });
    Camera::new(scale, pan, offset)
}

fn push_render(actions: &mut Vec<Action>, kind: ViewportKind) {
    if !actions.iter().any(|a| matches!(a, Action::RenderNeeded(k) if *k == kind)) {
        actions.push(Action::RenderNeeded(kind));
    }
}

/// Single owner of the active map, both renderers, and the input gesture.
pub struct SyncCoordinator {
    config: EngineConfig,
    map: Option<ActiveMap>,
    ui: UiState,
    input: InputState,
    transaction: Option<FogTransaction>,
    authoring_viewport: ViewportSize,
    presentation_viewport: ViewportSize,
    presentation_ppmm: f64,
    authoring_scale: Option<f64>,
    presentation_scale: Option<f64>,
    authoring: MapRenderer,
    presentation: MapRenderer,
    /// The authoring renderer's mask snapshot is behind the live mask.
    authoring_fog_stale: bool,
}

impl Default for SyncCoordinator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SyncCoordinator {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let mut ui = UiState::default();
        ui.set_brush_size(config.brush_size_px);
        let mut authoring = MapRenderer::new(RenderMode::Authoring);
        authoring.set_authoring_opacity(config.authoring_fog_opacity);

        Self {
            config,
            map: None,
            ui,
            input: InputState::Idle,
            transaction: None,
            authoring_viewport: ViewportSize::default(),
            presentation_viewport: ViewportSize::default(),
            presentation_ppmm: config.fallback_ppmm,
            authoring_scale: None,
            presentation_scale: None,
            authoring,
            presentation: MapRenderer::new(RenderMode::Presentation),
            authoring_fog_stale: false,
        }
    }

    // --- Map lifecycle ---

    /// Make a map current.
    ///
    /// Any gesture or transaction on the outgoing map is committed first, so
    /// the returned actions may include its final persistence requests. The
    /// stored pan is clamped against the presentation viewport.
    pub fn load_map(
        &mut self,
        id: MapId,
        surface: Arc<RgbaImage>,
        stored_mask: Option<GrayImage>,
        tile: TileSpec,
        pan: MapPoint,
    ) -> (MaskLoad, Vec<Action>) {
        let mut actions = self.finish_outgoing();

        let (map, load) = ActiveMap::new(id, surface, stored_mask, tile, pan);
        self.authoring.set_surface(Arc::clone(map.surface()), map.mask().snapshot());
        self.presentation.set_surface(Arc::clone(map.surface()), map.mask().snapshot());
        self.authoring_fog_stale = false;
        self.map = Some(map);
        self.sync_scales();
        self.reclamp_pan();

        push_render(&mut actions, ViewportKind::Authoring);
        push_render(&mut actions, ViewportKind::Presentation);
        (load, actions)
    }

    /// Drop the current map. Both viewports go blank.
    pub fn clear_map(&mut self) -> Vec<Action> {
        let mut actions = self.finish_outgoing();
        if let Some(map) = self.map.take() {
            info!(map_id = %map.id(), "map cleared");
        }
        self.authoring.clear();
        self.presentation.clear();
        self.authoring_fog_stale = false;
        self.sync_scales();

        push_render(&mut actions, ViewportKind::Authoring);
        push_render(&mut actions, ViewportKind::Presentation);
        actions
    }

    /// Recalibrate the current map's tiles.
    pub fn set_tile_spec(&mut self, tile: TileSpec) -> Vec<Action> {
        let Some(map) = self.map.as_mut() else {
            return Vec::new();
        };
        map.set_tile(tile);
        self.sync_scales();
        self.reclamp_pan();
        vec![Action::RenderNeeded(ViewportKind::Presentation), Action::RenderNeeded(ViewportKind::Authoring)]
    }

    fn finish_outgoing(&mut self) -> Vec<Action> {
        let mut actions = self.on_focus_lost();
        actions.extend(self.end_fog_edit_transaction());
        actions
    }

    // --- Viewports and monitors ---

    /// The authoring window was resized.
    pub fn set_authoring_viewport(&mut self, viewport: ViewportSize) -> Vec<Action> {
        if self.authoring_viewport == viewport {
            return Vec::new();
        }
        self.authoring_viewport = viewport;
        self.sync_scales();
        vec![Action::RenderNeeded(ViewportKind::Authoring)]
    }

    /// The presentation window was resized. An empty size disables panning
    /// and the overlay.
    pub fn set_presentation_viewport(&mut self, viewport: ViewportSize) -> Vec<Action> {
        if self.presentation_viewport == viewport {
            return Vec::new();
        }
        self.presentation_viewport = viewport;
        self.reclamp_pan();
        vec![Action::RenderNeeded(ViewportKind::Presentation), Action::RenderNeeded(ViewportKind::Authoring)]
    }

    /// Set the presentation display density directly.
    #[allow(clippy::float_cmp)]
    pub fn set_presentation_ppmm(&mut self, ppmm: f64) -> Vec<Action> {
        if self.presentation_ppmm == ppmm {
            return Vec::new();
        }
        info!(ppmm, "presentation density changed");
        self.presentation_ppmm = ppmm;
        self.sync_scales();
        self.reclamp_pan();
        vec![Action::RenderNeeded(ViewportKind::Presentation), Action::RenderNeeded(ViewportKind::Authoring)]
    }

    /// The presentation window moved to `monitor`.
    pub fn set_presentation_monitor(&mut self, monitor: &MonitorInfo) -> Vec<Action> {
        self.set_presentation_ppmm(monitor.ppmm_or(self.config.fallback_ppmm))
    }

    fn sync_scales(&mut self) {
        match self.map.as_ref() {
            Some(map) => {
                let (w, h) = map.dimensions();
                self.authoring_scale = fit_scale(self.authoring_viewport, w, h);
                self.presentation_scale = match map.tile().presentation_scale(self.presentation_ppmm) {
                    Ok(scale) => Some(scale),
                    Err(error) => {
                        warn!(map_id = %map.id(), %error, "presentation scale unavailable");
                        None
                    }
                };
            }
            None => {
                self.authoring_scale = None;
                self.presentation_scale = None;
            }
        }
        self.authoring.set_scale(self.authoring_scale.unwrap_or(0.0));
        self.presentation.set_scale(self.presentation_scale.unwrap_or(0.0));
    }

    // --- Pan ---

    /// Move the presentation view by a map-pixel delta, clamped to the map.
    ///
    /// Positive `dx` moves the view right. Does not persist; callers that
    /// finish a pan gesture persist the result.
    pub fn pan_map(&mut self, dx: i64, dy: i64) -> Vec<Action> {
        let Some(pan) = self.pan() else {
            return Vec::new();
        };
        if !self.apply_pan(MapPoint::new(pan.x.saturating_add(dx), pan.y.saturating_add(dy))) {
            return Vec::new();
        }
        vec![Action::RenderNeeded(ViewportKind::Presentation), Action::RenderNeeded(ViewportKind::Authoring)]
    }

    /// A request to save the current pan.
    #[must_use]
    pub fn persist_pan(&self) -> Option<Action> {
        let map = self.map.as_ref()?;
        Some(Action::PersistPan { map_id: map.id(), pan: map.pan() })
    }

    fn clamped(&self, pan: MapPoint) -> MapPoint {
        let Some(map) = self.map.as_ref() else {
            return pan;
        };
        clamp_pan(pan, map.dimensions(), self.presentation_viewport, self.presentation_scale.unwrap_or(0.0))
    }

    /// Clamp and store a pan. Returns whether it changed.
    fn apply_pan(&mut self, target: MapPoint) -> bool {
        let pan = self.clamped(target);
        let Some(map) = self.map.as_mut() else {
            return false;
        };
        if map.pan() == pan {
            return false;
        }
        map.set_pan(pan);
        true
    }

    fn reclamp_pan(&mut self) {
        if let Some(pan) = self.pan() {
            if self.apply_pan(pan) {
                debug!(from_x = pan.x, from_y = pan.y, "pan re-clamped");
            }
        }
    }

    // --- Fog edits ---

    /// Open a transaction. Returns `false` when there is no map or one is
    /// already open, in which case edits join the open transaction.
    pub fn begin_fog_edit_transaction(&mut self) -> bool {
        if self.map.is_none() || self.transaction.is_some() {
            return false;
        }
        debug!("fog edit transaction opened");
        self.transaction = Some(FogTransaction::default());
        true
    }

    /// Close the open transaction, propagating and persisting the mask if
    /// any edit inside it changed a pixel.
    pub fn end_fog_edit_transaction(&mut self) -> Vec<Action> {
        match self.transaction.take() {
            Some(tx) => self.commit(tx),
            None => Vec::new(),
        }
    }

    pub fn apply_brush(&mut self, cx: i64, cy: i64, radius: i64, reveal: bool) -> Vec<Action> {
        self.edit(|mask| mask.apply_brush(cx, cy, radius, reveal))
    }

    pub fn apply_rectangle(&mut self, x1: i64, y1: i64, x2: i64, y2: i64, reveal: bool) -> Vec<Action> {
        self.edit(|mask| mask.apply_rectangle(x1, y1, x2, y2, reveal))
    }

    pub fn reveal_all(&mut self) -> Vec<Action> {
        self.edit(FogMask::reveal_all)
    }

    pub fn hide_all(&mut self) -> Vec<Action> {
        self.edit(FogMask::hide_all)
    }

    fn stamp(&mut self, stamps: &[MapPoint], radius: i64, reveal: bool) -> Vec<Action> {
        self.edit(|mask| stamps.iter().fold(false, |changed, p| mask.apply_brush(p.x, p.y, radius, reveal) || changed))
    }

    fn edit<F>(&mut self, op: F) -> Vec<Action>
    where
        F: FnOnce(&mut FogMask) -> bool,
    {
        let Some(map) = self.map.as_mut() else {
            return Vec::new();
        };
        let changed = op(map.mask_mut());

        let mut actions = Vec::new();
        if changed {
            self.authoring_fog_stale = true;
            actions.push(Action::RenderNeeded(ViewportKind::Authoring));
        }
        match self.transaction.as_mut() {
            Some(tx) => {
                tx.edits += 1;
                tx.changed |= changed;
            }
            None => actions.extend(self.commit(FogTransaction { edits: 1, changed })),
        }
        actions
    }

    fn commit(&mut self, tx: FogTransaction) -> Vec<Action> {
        let Some(map) = self.map.as_ref() else {
            return Vec::new();
        };
        debug!(map_id = %map.id(), edits = tx.edits, changed = tx.changed, "fog edit transaction committed");
        if !tx.changed {
            return Vec::new();
        }
        let mask = map.mask().snapshot();
        self.presentation.update_fog(Arc::clone(&mask));
        vec![Action::RenderNeeded(ViewportKind::Presentation), Action::PersistFog { map_id: map.id(), mask }]
    }

    // --- Tool / keys ---

    pub fn set_tool(&mut self, tool: Tool) {
        self.ui.tool = tool;
    }

    pub fn set_reveal(&mut self, reveal: bool) {
        self.ui.reveal = reveal;
    }

    pub fn set_brush_size(&mut self, size_px: u32) {
        self.ui.set_brush_size(size_px);
    }

    /// Keyboard shortcuts. Returns whether the key is bound.
    ///
    /// `r`/`h` pick reveal or hide, `b`/`t`/`p` pick brush, rectangle, or pan,
    /// and `[`/`]` shrink or grow the brush.
    pub fn on_key_down(&mut self, key: &Key) -> bool {
        match key.0.as_str() {
            "r" => self.ui.reveal = true,
            "h" => self.ui.reveal = false,
            "b" => self.ui.tool = Tool::Brush,
            "t" => self.ui.tool = Tool::Rect,
            "p" => self.ui.tool = Tool::Pan,
            "[" => self.ui.adjust_brush_size(-1),
            "]" => self.ui.adjust_brush_size(1),
            _ => return false,
        }
        true
    }

    // --- Pointer input (authoring viewport) ---

    /// Pointer pressed on the authoring viewport.
    ///
    /// The middle button, the pan tool, or a press on the overlay outline
    /// drags the overlay. Otherwise the brush opens a stroke transaction and
    /// the rectangle tool records its anchor.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if !self.input.is_idle() || self.map.is_none() {
            return Vec::new();
        }
        let tool = match button {
            Button::Secondary => return Vec::new(),
            Button::Middle => Tool::Pan,
            // The overlay edge grabs the pointer away from fog tools.
            Button::Primary if self.ui.tool.edits_fog() && self.overlay_edge_hit(screen_pt) => Tool::Pan,
            Button::Primary => self.ui.tool,
        };

        match tool {
            Tool::Pan => {
                self.input =
                    InputState::DraggingOverlay { last_screen: screen_pt, carry: Point::default(), moved: false };
                Vec::new()
            }
            Tool::Rect => {
                let Some(anchor) = self.authoring_map_point(screen_pt) else {
                    return Vec::new();
                };
                self.input = InputState::DrawingRect { anchor, current: anchor, reveal: self.ui.reveal };
                vec![Action::RenderNeeded(ViewportKind::Authoring)]
            }
            Tool::Brush => {
                let Some(camera) = self.authoring_camera() else {
                    return Vec::new();
                };
                let mut stroke = Stroke::new(self.ui.brush_radius(camera.scale), self.ui.reveal);
                let stamps = stroke.advance(camera.screen_to_map(screen_pt));
                self.begin_fog_edit_transaction();
                self.input = InputState::Brushing { stroke };
                self.stamp(&stamps, stroke.radius, stroke.reveal)
            }
        }
    }

    /// Pointer moved over the authoring viewport.
    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        match self.input {
            InputState::Idle => Vec::new(),
            InputState::Brushing { mut stroke } => {
                let Some(point) = self.authoring_map_point(screen_pt) else {
                    return Vec::new();
                };
                let stamps = stroke.advance(point);
                self.input = InputState::Brushing { stroke };
                self.stamp(&stamps, stroke.radius, stroke.reveal)
            }
            InputState::DrawingRect { anchor, current, reveal } => {
                let Some(next) = self.authoring_map_point(screen_pt) else {
                    return Vec::new();
                };
                if next == current {
                    return Vec::new();
                }
                self.input = InputState::DrawingRect { anchor, current: next, reveal };
                vec![Action::RenderNeeded(ViewportKind::Authoring)]
            }
            InputState::DraggingOverlay { last_screen, carry, moved } => {
                self.drag_overlay(screen_pt, last_screen, carry, moved)
            }
        }
    }

    /// Pointer released. Ends whatever gesture is in progress.
    pub fn on_pointer_up(&mut self, screen_pt: Point) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Brushing { .. } => self.end_fog_edit_transaction(),
            InputState::DrawingRect { anchor, current, reveal } => {
                let end = self.authoring_map_point(screen_pt).unwrap_or(current);
                let opened = self.begin_fog_edit_transaction();
                let mut actions = self.apply_rectangle(anchor.x, anchor.y, end.x, end.y, reveal);
                if opened {
                    actions.extend(self.end_fog_edit_transaction());
                }
                push_render(&mut actions, ViewportKind::Authoring);
                actions
            }
            InputState::DraggingOverlay { moved, .. } => self.finish_drag(moved),
        }
    }

    /// The authoring window lost focus mid-gesture.
    ///
    /// Partial strokes are committed, an unreleased rectangle is discarded,
    /// and a dragged pan is persisted.
    pub fn on_focus_lost(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Brushing { .. } => self.end_fog_edit_transaction(),
            InputState::DrawingRect { .. } => vec![Action::RenderNeeded(ViewportKind::Authoring)],
            InputState::DraggingOverlay { moved, .. } => self.finish_drag(moved),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn drag_overlay(&mut self, screen_pt: Point, last_screen: Point, carry: Point, moved: bool) -> Vec<Action> {
        let Some(scale) = self.authoring_scale else {
            return Vec::new();
        };
        let fx = (screen_pt.x - last_screen.x) / scale + carry.x;
        let fy = (screen_pt.y - last_screen.y) / scale + carry.y;
        let (dx, dy) = (fx.trunc(), fy.trunc());

        let before = self.pan();
        let actions = self.pan_map(dx as i64, dy as i64);
        let moved = moved || self.pan() != before;
        self.input =
            InputState::DraggingOverlay { last_screen: screen_pt, carry: Point::new(fx - dx, fy - dy), moved };
        actions
    }

    fn finish_drag(&mut self, moved: bool) -> Vec<Action> {
        if !moved {
            return Vec::new();
        }
        let Some(action) = self.persist_pan() else {
            return Vec::new();
        };
        if let Action::PersistPan { map_id, pan } = &action {
            debug!(%map_id, pan_x = pan.x, pan_y = pan.y, "overlay drag finished");
        }
        vec![action]
    }

    fn authoring_map_point(&self, screen_pt: Point) -> Option<MapPoint> {
        Some(self.authoring_camera()?.screen_to_map(screen_pt))
    }

    fn overlay_edge_hit(&self, screen_pt: Point) -> bool {
        self.overlay_rect()
            .is_some_and(|rect| hit_overlay(screen_pt, rect, OVERLAY_EDGE_SLOP_PX) == Some(HitPart::Edge))
    }

    // --- Rendering ---

    /// The authoring frame with the presentation overlay and any rectangle
    /// preview drawn on top.
    pub fn render_authoring(&mut self) -> Option<RgbaImage> {
        if self.authoring_fog_stale {
            if let Some(map) = self.map.as_ref() {
                self.authoring.update_fog(map.mask().snapshot());
            }
            self.authoring_fog_stale = false;
        }
        let base = self.authoring.render(self.authoring_viewport, MapPoint::default())?;
        let mut frame = RgbaImage::clone(&base);
        if let Some(rect) = self.overlay_rect() {
            draw_dashed_rect(&mut frame, rect, OVERLAY_RGBA, OVERLAY_DASH_PX);
        }
        if let Some((rect, reveal)) = self.rect_preview() {
            draw_rect_outline(&mut frame, rect, if reveal { REVEAL_PREVIEW_RGBA } else { HIDE_PREVIEW_RGBA });
        }
        Some(frame)
    }

    /// The player-facing frame.
    pub fn render_presentation(&mut self) -> Option<Arc<RgbaImage>> {
        let pan = self.pan()?;
        self.presentation.render(self.presentation_viewport, pan)
    }

    /// Whole-map catalog preview of the current map.
    #[must_use]
    pub fn thumbnail(&self, bounds: ViewportSize) -> Option<RgbaImage> {
        let map = self.map.as_ref()?;
        render_thumbnail(map.surface(), map.mask().image(), bounds, THUMBNAIL_FOG_OPACITY)
    }

    /// Discard both renderers' caches.
    pub fn refresh(&mut self) -> Vec<Action> {
        self.authoring.refresh();
        self.presentation.refresh();
        vec![Action::RenderNeeded(ViewportKind::Authoring), Action::RenderNeeded(ViewportKind::Presentation)]
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    #[must_use]
    pub fn map(&self) -> Option<&ActiveMap> {
        self.map.as_ref()
    }

    #[must_use]
    pub fn map_id(&self) -> Option<MapId> {
        self.map.as_ref().map(ActiveMap::id)
    }

    #[must_use]
    pub fn pan(&self) -> Option<MapPoint> {
        self.map.as_ref().map(ActiveMap::pan)
    }

    #[must_use]
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    #[must_use]
    pub fn authoring_viewport(&self) -> ViewportSize {
        self.authoring_viewport
    }

    #[must_use]
    pub fn presentation_viewport(&self) -> ViewportSize {
        self.presentation_viewport
    }

    #[must_use]
    pub fn presentation_ppmm(&self) -> f64 {
        self.presentation_ppmm
    }

    /// Fit-to-window scale of the authoring view.
    #[must_use]
    pub fn authoring_scale(&self) -> Option<f64> {
        self.authoring_scale
    }

    /// Physical tile scale of the presentation view.
    #[must_use]
    pub fn presentation_scale(&self) -> Option<f64> {
        self.presentation_scale
    }

    /// Authoring transform: fitted, centered, always at pan 0.
    #[must_use]
    pub fn authoring_camera(&self) -> Option<Camera> {
        let map = self.map.as_ref()?;
        let scale = self.authoring_scale?;
        Some(centered_camera(map.dimensions(), scale, self.authoring_viewport, MapPoint::default()))
    }

    /// Presentation transform at the shared pan.
    #[must_use]
    pub fn presentation_camera(&self) -> Option<Camera> {
        let map = self.map.as_ref()?;
        let scale = self.presentation_scale?;
        Some(centered_camera(map.dimensions(), scale, self.presentation_viewport, map.pan()))
    }

    /// The map pixels the presentation viewport currently shows, clipped to
    /// the map.
    #[must_use]
    pub fn presentation_region(&self) -> Option<MapRect> {
        if self.presentation_viewport.is_empty() {
            return None;
        }
        let (w, h) = self.map.as_ref()?.dimensions();
        let region = self.presentation_camera()?.visible_region(self.presentation_viewport);
        let clipped = MapRect {
            left: region.left.max(0),
            top: region.top.max(0),
            right: region.right.min(i64::from(w) - 1),
            bottom: region.bottom.min(i64::from(h) - 1),
        };
        (clipped.left <= clipped.right && clipped.top <= clipped.bottom).then_some(clipped)
    }

    /// The presentation region projected into authoring screen space.
    #[must_use]
    pub fn overlay_rect(&self) -> Option<ScreenRect> {
        let region = self.presentation_region()?;
        Some(self.authoring_camera()?.project_rect(region))
    }

    /// The rectangle-tool preview in authoring screen space, with its mode.
    #[must_use]
    pub fn rect_preview(&self) -> Option<(ScreenRect, bool)> {
        let InputState::DrawingRect { anchor, current, reveal } = self.input else {
            return None;
        };
        let rect = self.authoring_camera()?.project_rect(MapRect::from_corners(anchor, current));
        Some((rect, reveal))
    }
}
