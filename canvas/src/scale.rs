//! Physical scale: making on-screen tiles match a real-world size.
//!
//! The presentation viewport runs at `tile_size_mm * monitor_ppmm / tile_pixels`
//! screen pixels per map pixel, so a 25.4 mm tile measures 25.4 mm on the
//! player display whatever its resolution. The authoring viewport ignores all
//! of this and fits the whole map into its window instead.
//!
//! However a map's tile size was worked out at import (overall width in mm,
//! tiles across, or a sampled region), it reaches this module as a
//! [`TileSpec`].

#[cfg(test)]
#[path = "scale_test.rs"]
mod scale_test;

use serde::{Deserialize, Serialize};

use crate::camera::ViewportSize;
use crate::consts::{DEFAULT_PPMM, DEFAULT_TILE_PIXELS, DEFAULT_TILE_SIZE_MM, FIT_MARGIN};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScaleError {
    #[error("tile pixels must be positive")]
    InvalidTilePixels,
    #[error("tile size must be a positive number of millimeters, got {0}")]
    InvalidTileSize(f64),
    #[error("monitor density must be a positive number of pixels per mm, got {0}")]
    InvalidDensity(f64),
    #[error("derivation input must be positive, got {0}")]
    InvalidMeasurement(f64),
}

/// Normalized tile calibration: `tile_pixels` map pixels span `tile_size_mm`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileSpec {
    pub tile_pixels: u32,
    pub tile_size_mm: f64,
}

impl Default for TileSpec {
    fn default() -> Self {
        Self { tile_pixels: DEFAULT_TILE_PIXELS, tile_size_mm: DEFAULT_TILE_SIZE_MM }
    }
}

impl TileSpec {
    /// # Errors
    ///
    /// Returns `Err` if either value is not positive.
    pub fn new(tile_pixels: u32, tile_size_mm: f64) -> Result<Self, ScaleError> {
        if tile_pixels == 0 {
            return Err(ScaleError::InvalidTilePixels);
        }
        if !(tile_size_mm.is_finite() && tile_size_mm > 0.0) {
            return Err(ScaleError::InvalidTileSize(tile_size_mm));
        }
        Ok(Self { tile_pixels, tile_size_mm })
    }

    /// Derive from the printed width of the whole image.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any input is not positive.
    pub fn from_image_width(image_width_px: u32, image_width_mm: f64, tile_size_mm: f64) -> Result<Self, ScaleError> {
        positive(image_width_mm)?;
        positive(f64::from(image_width_px))?;
        let ppmm = f64::from(image_width_px) / image_width_mm;
        Self::new(round_tile_pixels(ppmm * tile_size_mm), tile_size_mm)
    }

    /// Derive from the number of tile columns across the image.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any input is not positive.
    pub fn from_tiles_across(image_width_px: u32, tiles_across: u32, tile_size_mm: f64) -> Result<Self, ScaleError> {
        positive(f64::from(tiles_across))?;
        positive(f64::from(image_width_px))?;
        Self::new(round_tile_pixels(f64::from(image_width_px) / f64::from(tiles_across)), tile_size_mm)
    }

    /// Derive from a selected region spanning `tiles_per_side` tiles in each
    /// direction, averaging the horizontal and vertical estimates.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any input is not positive.
    pub fn from_sample(
        sample_width_px: f64,
        sample_height_px: f64,
        tiles_per_side: u32,
        tile_size_mm: f64,
    ) -> Result<Self, ScaleError> {
        positive(sample_width_px)?;
        positive(sample_height_px)?;
        positive(f64::from(tiles_per_side))?;
        let n = f64::from(tiles_per_side);
        let per_tile = (sample_width_px / n + sample_height_px / n) / 2.0;
        Self::new(round_tile_pixels(per_tile), tile_size_mm)
    }

    /// Presentation scale for a display of the given density.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `monitor_ppmm` is not positive.
    pub fn presentation_scale(&self, monitor_ppmm: f64) -> Result<f64, ScaleError> {
        calculate_scale(self.tile_pixels, self.tile_size_mm, monitor_ppmm)
    }
}

/// `(tile_size_mm * monitor_ppmm) / tile_pixels`.
///
/// # Errors
///
/// Returns `Err` if any input is not positive.
pub fn calculate_scale(tile_pixels: u32, tile_size_mm: f64, monitor_ppmm: f64) -> Result<f64, ScaleError> {
    let spec = TileSpec::new(tile_pixels, tile_size_mm)?;
    if !(monitor_ppmm.is_finite() && monitor_ppmm > 0.0) {
        return Err(ScaleError::InvalidDensity(monitor_ppmm));
    }
    Ok(spec.tile_size_mm * monitor_ppmm / f64::from(spec.tile_pixels))
}

/// Fit-to-window scale for the authoring viewport, leaving a 5% margin.
///
/// `None` when either the viewport or the map has no area.
#[must_use]
pub fn fit_scale(viewport: ViewportSize, map_width: u32, map_height: u32) -> Option<f64> {
    if viewport.is_empty() || map_width == 0 || map_height == 0 {
        return None;
    }
    let sx = f64::from(viewport.width) / f64::from(map_width);
    let sy = f64::from(viewport.height) / f64::from(map_height);
    Some(sx.min(sy) * FIT_MARGIN)
}

/// A display as reported by the windowing layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorInfo {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width_px: u32,
    pub height_px: u32,
    /// Physical width, when the display reports it.
    pub width_mm: Option<f64>,
    pub height_mm: Option<f64>,
    pub is_primary: bool,
}

impl MonitorInfo {
    /// Pixels per millimeter, falling back to `fallback` when the physical
    /// width is unknown or not positive.
    #[must_use]
    pub fn ppmm_or(&self, fallback: f64) -> f64 {
        match self.width_mm {
            Some(mm) if mm > 0.0 && self.width_px > 0 => f64::from(self.width_px) / mm,
            _ => fallback,
        }
    }

    /// Pixels per millimeter, falling back to ~96 DPI.
    #[must_use]
    pub fn ppmm(&self) -> f64 {
        self.ppmm_or(DEFAULT_PPMM)
    }
}

/// Which monitors host the two viewports, as indices into the monitor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorAssignment {
    pub authoring: usize,
    /// `None` disables the presentation display.
    pub presentation: Option<usize>,
}

/// Assign the authoring and presentation displays.
///
/// The primary monitor (or the first one) hosts authoring. Presentation goes to
/// `configured` when valid, else the first non-primary monitor. Only one
/// monitor, or a configured choice equal to the authoring monitor, leaves
/// presentation disabled. `None` when the list is empty.
#[must_use]
pub fn assign_monitors(monitors: &[MonitorInfo], configured: Option<usize>) -> Option<MonitorAssignment> {
    if monitors.is_empty() {
        return None;
    }
    let authoring = monitors.iter().position(|m| m.is_primary).unwrap_or(0);
    if monitors.len() == 1 {
        return Some(MonitorAssignment { authoring, presentation: None });
    }

    let presentation = match configured {
        Some(index) if index < monitors.len() => Some(index),
        _ => (0..monitors.len()).find(|&i| i != authoring),
    }
    .filter(|&index| index != authoring);

    Some(MonitorAssignment { authoring, presentation })
}

fn positive(value: f64) -> Result<(), ScaleError> {
    if value.is_finite() && value > 0.0 { Ok(()) } else { Err(ScaleError::InvalidMeasurement(value)) }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_tile_pixels(value: f64) -> u32 {
    value.round().max(1.0) as u32
}
