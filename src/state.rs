//! Session state and the host that drives the coordinator.
//!
//! DESIGN
//! ======
//! `Session` is the catalog: which maps exist, how each is calibrated, and
//! which one is on screen. `SessionHost` owns the catalog, the
//! `SyncCoordinator`, and the persistence worker. Every coordinator call goes
//! through [`SessionHost::handle`], which routes persistence actions to the
//! worker and collects render requests for the display layer.
//!
//! ERROR HANDLING
//! ==============
//! Store failures never reach the event loop as errors. A failed surface
//! load surfaces as [`HostError::MissingSurface`]; a failed mask load falls
//! back to an all-hidden mask.

use std::collections::HashMap;
use std::sync::Arc;

use canvas::camera::{MapPoint, ViewportSize};
use canvas::engine::{Action, SyncCoordinator, ViewportKind};
use canvas::mask::MaskLoad;
use canvas::scale::{MonitorAssignment, MonitorInfo, TileSpec, assign_monitors};
use canvas::session::MapId;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::HostConfig;
use crate::services::persistence::{PersistHandle, PersistJob, spawn_persistence_worker};
use crate::store::AssetStore;

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("no map at index {0}")]
    NoSuchMap(usize),
    #[error("no stored surface for map {0}")]
    MissingSurface(MapId),
}

// =============================================================================
// MAP RECORD
// =============================================================================

/// Catalog entry for one map. The bitmaps live in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    pub id: MapId,
    pub name: String,
    pub tile: TileSpec,
    /// Last known top-left of the presentation view, in map pixels.
    pub pan: MapPoint,
}

impl MapRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, tile: TileSpec) -> Self {
        Self { id: Uuid::new_v4(), name: name.into(), tile, pan: MapPoint::default() }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Ordered map catalog plus the active index.
///
/// The active index is `None` only while no map has been selected or the
/// catalog is empty; otherwise it always points at an existing record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    maps: Vec<MapRecord>,
    active: Option<usize>,
}

impl Session {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    #[must_use]
    pub fn maps(&self) -> &[MapRecord] {
        &self.maps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.maps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    #[must_use]
    pub fn active(&self) -> Option<&MapRecord> {
        self.maps.get(self.active?)
    }

    #[must_use]
    pub fn get(&self, id: MapId) -> Option<&MapRecord> {
        self.maps.iter().find(|m| m.id == id)
    }

    #[must_use]
    pub fn position(&self, id: MapId) -> Option<usize> {
        self.maps.iter().position(|m| m.id == id)
    }

    /// Append a record and return its index. The active map is unchanged.
    pub fn add(&mut self, record: MapRecord) -> usize {
        self.maps.push(record);
        self.maps.len() - 1
    }

    /// Remove the record at `index`.
    ///
    /// Removing a map before the active one keeps the same map active.
    /// Removing the active map activates its successor, or the new last map
    /// when it was last.
    pub fn remove(&mut self, index: usize) -> Option<MapRecord> {
        if index >= self.maps.len() {
            return None;
        }
        let record = self.maps.remove(index);
        self.active = match self.active {
            _ if self.maps.is_empty() => None,
            Some(active) if index < active => Some(active - 1),
            Some(active) => Some(active.min(self.maps.len() - 1)),
            None => None,
        };
        Some(record)
    }

    /// `false` when `index` is out of range.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.maps.len() {
            return false;
        }
        self.active = Some(index);
        true
    }

    pub fn record_pan(&mut self, id: MapId, pan: MapPoint) -> bool {
        self.update(id, |record| record.pan = pan)
    }

    pub fn record_tile(&mut self, id: MapId, tile: TileSpec) -> bool {
        self.update(id, |record| record.tile = tile)
    }

    fn update(&mut self, id: MapId, apply: impl FnOnce(&mut MapRecord)) -> bool {
        match self.maps.iter_mut().find(|m| m.id == id) {
            Some(record) => {
                apply(record);
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// SESSION HOST
// =============================================================================

/// Runs one session: the catalog, the coordinator, and the persistence worker.
///
/// Must be created inside a tokio runtime.
pub struct SessionHost {
    config: HostConfig,
    session: Session,
    coordinator: SyncCoordinator,
    store: Arc<dyn AssetStore>,
    persistence: PersistHandle,
    /// Last committed mask per map. The store may still be behind it.
    masks: HashMap<MapId, Arc<GrayImage>>,
    /// Render requests not yet taken by the display layer.
    renders: Vec<ViewportKind>,
}

impl SessionHost {
    #[must_use]
    pub fn new(config: HostConfig, session: Session, store: Arc<dyn AssetStore>) -> Self {
        let persistence = spawn_persistence_worker(Arc::clone(&store), config.persist);
        Self {
            config,
            session,
            coordinator: SyncCoordinator::new(config.engine),
            store,
            persistence,
            masks: HashMap::new(),
            renders: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    /// A catalog record using the configured default calibration.
    #[must_use]
    pub fn new_record(&self, name: impl Into<String>) -> MapRecord {
        MapRecord::new(name, self.config.default_tile)
    }

    /// Run a coordinator call and route the actions it returns.
    pub fn handle<F>(&mut self, call: F)
    where
        F: FnOnce(&mut SyncCoordinator) -> Vec<Action>,
    {
        let actions = call(&mut self.coordinator);
        self.dispatch(actions);
    }

    /// Drain the viewports that need redrawing, in request order.
    pub fn take_render_requests(&mut self) -> Vec<ViewportKind> {
        std::mem::take(&mut self.renders)
    }

    /// Route coordinator actions: renders are queued for the display layer,
    /// persistence goes to the background worker.
    pub fn dispatch(&mut self, actions: Vec<Action>) {
        for action in actions {
            if let Action::RenderNeeded(kind) = action {
                if !self.renders.contains(&kind) {
                    self.renders.push(kind);
                }
                continue;
            }
            match &action {
                Action::PersistPan { map_id, pan } => {
                    self.session.record_pan(*map_id, *pan);
                }
                Action::PersistFog { map_id, mask } => {
                    self.masks.insert(*map_id, Arc::clone(mask));
                }
                Action::RenderNeeded(_) => {}
            }
            if let Some(job) = PersistJob::from_action(action) {
                self.persistence.enqueue(job);
            }
        }
    }

    /// Place the viewports on the available monitors.
    ///
    /// The presentation viewport takes the full size of its monitor. With no
    /// presentation monitor the presentation viewport is emptied.
    pub fn configure_monitors(&mut self, monitors: &[MonitorInfo]) -> Option<MonitorAssignment> {
        let assignment = assign_monitors(monitors, self.config.player_monitor);
        let presentation = assignment.and_then(|a| a.presentation).and_then(|index| monitors.get(index));
        match presentation {
            Some(monitor) => {
                info!(monitor = %monitor.name, "presentation display assigned");
                self.handle(|c| {
                    let mut actions = c.set_presentation_monitor(monitor);
                    actions.extend(c.set_presentation_viewport(ViewportSize::new(monitor.width_px, monitor.height_px)));
                    actions
                });
            }
            None => {
                warn!(monitors = monitors.len(), "no presentation display available");
                self.handle(|c| c.set_presentation_viewport(ViewportSize::default()));
            }
        }
        assignment
    }

    /// Add `record` to the catalog and make it the active map.
    ///
    /// The record is dropped from the catalog again if its surface cannot be
    /// loaded.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the store has no surface for the record.
    pub async fn add_map(&mut self, record: MapRecord) -> Result<MaskLoad, HostError> {
        let previous = self.session.active_index();
        let index = self.session.add(record);
        match self.select_map(index).await {
            Ok(load) => Ok(load),
            Err(e) => {
                self.session.remove(index);
                if let Some(previous) = previous {
                    self.session.set_active(previous);
                }
                Err(e)
            }
        }
    }

    /// Load the map at `index` into both viewports.
    ///
    /// A missing or unreadable mask yields a fresh all-hidden one, which is
    /// queued for saving along with any repaired mask.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `index` is out of range or the surface is unavailable.
    /// The current map stays loaded in that case.
    pub async fn select_map(&mut self, index: usize) -> Result<MaskLoad, HostError> {
        let id = self.session.maps().get(index).map(|record| record.id).ok_or(HostError::NoSuchMap(index))?;

        let surface = match self.store.load_map_bitmap(id).await {
            Ok(Some(surface)) => surface,
            Ok(None) => return Err(HostError::MissingSurface(id)),
            Err(e) => {
                error!(error = %e, map_id = %id, "surface load failed");
                return Err(HostError::MissingSurface(id));
            }
        };

        // Commit the outgoing map before reading anything back, so a
        // re-selected map sees its own latest mask and pan.
        let mut actions = self.coordinator.on_focus_lost();
        actions.extend(self.coordinator.end_fog_edit_transaction());
        self.dispatch(actions);
        self.stash_outgoing_pan();
        let record = self.session.maps().get(index).cloned().ok_or(HostError::NoSuchMap(index))?;

        let stored_mask = match self.masks.get(&id) {
            Some(mask) => Some(GrayImage::clone(mask)),
            None => match self.store.load_fog_bitmap(id).await {
                Ok(mask) => mask,
                Err(e) => {
                    warn!(error = %e, map_id = %id, "mask load failed; starting hidden");
                    None
                }
            },
        };

        let (load, actions) = self.coordinator.load_map(id, surface, stored_mask, record.tile, record.pan);
        self.session.set_active(index);
        self.dispatch(actions);

        if load != MaskLoad::Restored {
            if let Some(mask) = self.coordinator.map().map(|map| map.mask().snapshot()) {
                self.masks.insert(id, Arc::clone(&mask));
                self.persistence.enqueue(PersistJob::Fog { map_id: id, mask });
            }
        }
        info!(map_id = %id, name = %record.name, index, ?load, "map selected");
        Ok(load)
    }

    /// Remove the map at `index` from the catalog.
    ///
    /// When the active map is removed its successor is loaded; if that load
    /// fails the viewports stay blank.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `index` is out of range.
    pub async fn remove_map(&mut self, index: usize) -> Result<MapRecord, HostError> {
        let was_active = self.session.active_index() == Some(index);
        let record = self.session.remove(index).ok_or(HostError::NoSuchMap(index))?;

        if self.coordinator.map_id() == Some(record.id) {
            let actions = self.coordinator.clear_map();
            self.dispatch(actions);
        }
        self.masks.remove(&record.id);
        if was_active {
            if let Some(next) = self.session.active_index() {
                if let Err(e) = self.select_map(next).await {
                    warn!(error = %e, index = next, "successor map could not be loaded");
                }
            }
        }
        info!(map_id = %record.id, name = %record.name, "map removed");
        Ok(record)
    }

    /// Recalibrate the active map. `false` when no map is loaded.
    pub fn set_tile_spec(&mut self, tile: TileSpec) -> bool {
        let Some(id) = self.coordinator.map_id() else {
            return false;
        };
        self.session.record_tile(id, tile);
        self.handle(|c| c.set_tile_spec(tile));
        true
    }

    /// Commit open edits, save the current pan, and wait for the worker to
    /// drain. Returns the catalog for the caller to keep.
    pub async fn shutdown(mut self) -> Session {
        let mut actions = self.coordinator.on_focus_lost();
        actions.extend(self.coordinator.end_fog_edit_transaction());
        actions.extend(self.coordinator.persist_pan());
        self.dispatch(actions);

        let Self { session, persistence, .. } = self;
        persistence.shutdown().await;
        info!(maps = session.len(), "session closed");
        session
    }

    fn stash_outgoing_pan(&mut self) {
        if let (Some(id), Some(pan)) = (self.coordinator.map_id(), self.coordinator.pan()) {
            self.session.record_pan(id, pan);
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;
