//! Host configuration parsed from environment variables.
//!
//! Every value has a default, so an empty environment yields a working
//! setup. Values that parse but make no sense (a zero tile, a negative
//! density) are logged and replaced by the default rather than rejected.

use canvas::consts::{
    AUTHORING_FOG_OPACITY, DEFAULT_BRUSH_SIZE_PX, DEFAULT_PPMM, DEFAULT_TILE_PIXELS, DEFAULT_TILE_SIZE_MM,
    MAX_BRUSH_SIZE_PX, MIN_BRUSH_SIZE_PX,
};
use canvas::engine::EngineConfig;
use canvas::scale::TileSpec;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::services::persistence::{PersistConfig, env_parse};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HostConfig {
    pub engine: EngineConfig,
    /// Calibration given to maps added without one.
    pub default_tile: TileSpec,
    /// Monitor index for the presentation display; `None` picks automatically.
    pub player_monitor: Option<usize>,
    pub persist: PersistConfig,
}

impl HostConfig {
    /// Load `.env` if present, then read the environment.
    #[must_use]
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => info!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => warn!(error = %e, "failed to read .env; using process environment"),
        }
        Self::from_env()
    }

    /// Build typed host config from environment variables.
    ///
    /// Optional:
    /// - `DMVIEW_BRUSH_SIZE`: default 30, clamped to 5..=100
    /// - `DMVIEW_AUTHORING_FOG_OPACITY`: default 120
    /// - `DMVIEW_FALLBACK_PPMM`: default 3.78
    /// - `DMVIEW_DEFAULT_TILE_PIXELS`: default 70
    /// - `DMVIEW_DEFAULT_TILE_SIZE_MM`: default 25.4
    /// - `DMVIEW_PLAYER_MONITOR`: unset for automatic assignment
    /// - `DMVIEW_PERSIST_*`: see [`PersistConfig::from_env`]
    #[must_use]
    pub fn from_env() -> Self {
        let engine = EngineConfig {
            brush_size_px: brush_size(env_parse("DMVIEW_BRUSH_SIZE", DEFAULT_BRUSH_SIZE_PX)),
            authoring_fog_opacity: env_parse("DMVIEW_AUTHORING_FOG_OPACITY", AUTHORING_FOG_OPACITY),
            fallback_ppmm: fallback_ppmm(env_parse("DMVIEW_FALLBACK_PPMM", DEFAULT_PPMM)),
        };
        let default_tile = default_tile(
            env_parse("DMVIEW_DEFAULT_TILE_PIXELS", DEFAULT_TILE_PIXELS),
            env_parse("DMVIEW_DEFAULT_TILE_SIZE_MM", DEFAULT_TILE_SIZE_MM),
        );
        let player_monitor = std::env::var("DMVIEW_PLAYER_MONITOR")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok());

        let config = Self { engine, default_tile, player_monitor, persist: PersistConfig::from_env() };
        info!(
            brush_size_px = config.engine.brush_size_px,
            tile_pixels = config.default_tile.tile_pixels,
            tile_size_mm = config.default_tile.tile_size_mm,
            player_monitor = ?config.player_monitor,
            "host configured"
        );
        config
    }
}

fn brush_size(raw: u32) -> u32 {
    let clamped = raw.clamp(MIN_BRUSH_SIZE_PX, MAX_BRUSH_SIZE_PX);
    if clamped != raw {
        warn!(raw, clamped, "DMVIEW_BRUSH_SIZE out of range");
    }
    clamped
}

fn fallback_ppmm(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        warn!(raw, "DMVIEW_FALLBACK_PPMM must be positive; using default");
        DEFAULT_PPMM
    }
}

fn default_tile(tile_pixels: u32, tile_size_mm: f64) -> TileSpec {
    TileSpec::new(tile_pixels, tile_size_mm).unwrap_or_else(|e| {
        warn!(error = %e, "invalid default tile; using built-in calibration");
        TileSpec::default()
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
