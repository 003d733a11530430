//! Shared numeric constants for the canvas crate.

// ── Fog mask ────────────────────────────────────────────────────

/// Mask value for a hidden pixel.
pub const HIDDEN: u8 = 0;

/// Mask value for a revealed pixel.
pub const REVEALED: u8 = 255;

/// Stored masks are snapped to 0/255 around this threshold on load.
pub const REVEAL_THRESHOLD: u8 = 128;

// ── Compositing ─────────────────────────────────────────────────

/// Occluder alpha over hidden pixels in the authoring view (~47%).
pub const AUTHORING_FOG_OPACITY: u8 = 120;

/// Occluder alpha over hidden pixels in the presentation view.
pub const PRESENTATION_FOG_OPACITY: u8 = 255;

/// Occluder alpha used for catalog thumbnails.
pub const THUMBNAIL_FOG_OPACITY: u8 = 128;

/// Neutral fill around a map that is smaller than its viewport.
pub const BACKGROUND_RGBA: [u8; 4] = [30, 30, 30, 255];

/// Dash segment length of the presentation overlay, in screen pixels.
pub const OVERLAY_DASH_PX: u32 = 6;

/// Presentation overlay outline color.
pub const OVERLAY_RGBA: [u8; 4] = [255, 215, 0, 255];

/// Rectangle-tool preview outline while revealing.
pub const REVEAL_PREVIEW_RGBA: [u8; 4] = [0, 255, 0, 255];

/// Rectangle-tool preview outline while hiding.
pub const HIDE_PREVIEW_RGBA: [u8; 4] = [255, 0, 0, 255];

// ── Scale ───────────────────────────────────────────────────────

/// Fallback monitor density when the physical size is unknown (~96 DPI).
pub const DEFAULT_PPMM: f64 = 3.78;

/// Fraction of the authoring viewport used by the fit-to-window scale.
pub const FIT_MARGIN: f64 = 0.95;

/// Default pixels per tile in an imported map.
pub const DEFAULT_TILE_PIXELS: u32 = 70;

/// Default physical tile size (one inch).
pub const DEFAULT_TILE_SIZE_MM: f64 = 25.4;

/// Tiles per side covered by a sampled calibration region.
pub const SAMPLE_TILES_PER_SIDE: u32 = 3;

// ── Input ───────────────────────────────────────────────────────

/// Default brush radius in authoring screen pixels.
pub const DEFAULT_BRUSH_SIZE_PX: u32 = 30;

/// Smallest brush the size keys allow.
pub const MIN_BRUSH_SIZE_PX: u32 = 5;

/// Largest brush the size keys allow.
pub const MAX_BRUSH_SIZE_PX: u32 = 100;

/// Brush size change per `[` / `]` key press.
pub const BRUSH_SIZE_STEP_PX: u32 = 5;

/// Interpolation step as a fraction of the brush radius.
pub const STROKE_STEP_RATIO: f64 = 0.5;

/// Screen-space slop for grabbing the overlay outline.
pub const OVERLAY_EDGE_SLOP_PX: f64 = 8.0;
