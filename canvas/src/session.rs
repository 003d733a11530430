//! The active map: surface, fog mask, tile calibration, and the shared pan.
//!
//! An `ActiveMap` is created when a map is loaded into the coordinator and
//! dropped when another map replaces it. The surface never changes after
//! load. The mask is only ever written through the coordinator's edit
//! operations.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use image::{GrayImage, RgbaImage};
use tracing::info;
use uuid::Uuid;

use crate::camera::MapPoint;
use crate::mask::{FogMask, MaskLoad};
use crate::scale::TileSpec;

/// Stable identifier for a map in the catalog.
pub type MapId = Uuid;

/// Everything the engine holds for the map on display.
#[derive(Debug, Clone)]
pub struct ActiveMap {
    id: MapId,
    surface: Arc<RgbaImage>,
    mask: FogMask,
    tile: TileSpec,
    pan: MapPoint,
}

impl ActiveMap {
    /// Adopt a surface and its stored mask.
    ///
    /// The stored pan is taken as-is; the coordinator clamps it once the
    /// presentation viewport is known.
    #[must_use]
    pub fn new(
        id: MapId,
        surface: Arc<RgbaImage>,
        stored_mask: Option<GrayImage>,
        tile: TileSpec,
        pan: MapPoint,
    ) -> (Self, MaskLoad) {
        let (width, height) = surface.dimensions();
        let (mask, load) = FogMask::from_stored(stored_mask, width, height);
        info!(map_id = %id, width, height, ?load, "map loaded");
        (Self { id, surface, mask, tile, pan }, load)
    }

    #[must_use]
    pub fn id(&self) -> MapId {
        self.id
    }

    #[must_use]
    pub fn surface(&self) -> &Arc<RgbaImage> {
        &self.surface
    }

    #[must_use]
    pub fn mask(&self) -> &FogMask {
        &self.mask
    }

    pub fn mask_mut(&mut self) -> &mut FogMask {
        &mut self.mask
    }

    #[must_use]
    pub fn tile(&self) -> TileSpec {
        self.tile
    }

    pub fn set_tile(&mut self, tile: TileSpec) {
        self.tile = tile;
    }

    #[must_use]
    pub fn pan(&self) -> MapPoint {
        self.pan
    }

    pub fn set_pan(&mut self, pan: MapPoint) {
        self.pan = pan;
    }

    /// Surface (and mask) size in map pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }
}
