//! Asset store: where map surfaces, fog masks, and pans live between sessions.
//!
//! The host only ever talks to [`AssetStore`]. Decoding files and choosing a
//! directory layout is the embedding application's business; the
//! [`MemoryStore`] here backs tests and throwaway sessions.

use std::collections::HashMap;
use std::sync::Arc;

use canvas::camera::MapPoint;
use canvas::session::MapId;
use image::{GrayImage, RgbaImage};
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("map not found: {0}")]
    NotFound(MapId),
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence collaborator consumed by the session host.
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    /// The map's surface bitmap, `None` when nothing is stored.
    async fn load_map_bitmap(&self, id: MapId) -> Result<Option<Arc<RgbaImage>>, StoreError>;

    /// The map's fog mask, `None` when nothing is stored.
    async fn load_fog_bitmap(&self, id: MapId) -> Result<Option<GrayImage>, StoreError>;

    async fn save_fog_bitmap(&self, id: MapId, mask: &GrayImage) -> Result<(), StoreError>;

    async fn save_pan(&self, id: MapId, pan: MapPoint) -> Result<(), StoreError>;
}

#[derive(Default)]
struct MemoryInner {
    surfaces: HashMap<MapId, Arc<RgbaImage>>,
    masks: HashMap<MapId, GrayImage>,
    pans: HashMap<MapId, MapPoint>,
    fog_saves: usize,
    pan_saves: usize,
}

/// In-process store keyed by map id.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface (and optionally a previously saved mask).
    pub async fn insert_map(&self, id: MapId, surface: RgbaImage, mask: Option<GrayImage>) {
        let mut inner = self.inner.write().await;
        inner.surfaces.insert(id, Arc::new(surface));
        if let Some(mask) = mask {
            inner.masks.insert(id, mask);
        }
    }

    pub async fn remove_map(&self, id: MapId) -> bool {
        let mut inner = self.inner.write().await;
        inner.masks.remove(&id);
        inner.pans.remove(&id);
        inner.surfaces.remove(&id).is_some()
    }

    pub async fn fog(&self, id: MapId) -> Option<GrayImage> {
        self.inner.read().await.masks.get(&id).cloned()
    }

    pub async fn pan(&self, id: MapId) -> Option<MapPoint> {
        self.inner.read().await.pans.get(&id).copied()
    }

    /// Successful fog writes since creation.
    pub async fn fog_save_count(&self) -> usize {
        self.inner.read().await.fog_saves
    }

    pub async fn pan_save_count(&self) -> usize {
        self.inner.read().await.pan_saves
    }
}

#[async_trait::async_trait]
impl AssetStore for MemoryStore {
    async fn load_map_bitmap(&self, id: MapId) -> Result<Option<Arc<RgbaImage>>, StoreError> {
        Ok(self.inner.read().await.surfaces.get(&id).cloned())
    }

    async fn load_fog_bitmap(&self, id: MapId) -> Result<Option<GrayImage>, StoreError> {
        Ok(self.inner.read().await.masks.get(&id).cloned())
    }

    async fn save_fog_bitmap(&self, id: MapId, mask: &GrayImage) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.surfaces.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        inner.masks.insert(id, mask.clone());
        inner.fog_saves += 1;
        Ok(())
    }

    async fn save_pan(&self, id: MapId, pan: MapPoint) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.surfaces.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        inner.pans.insert(id, pan);
        inner.pan_saves += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
