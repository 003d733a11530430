//! Persistence service: background writer for fog masks and pans.
//!
//! DESIGN
//! ======
//! The coordinator hands back `PersistFog`/`PersistPan` actions after every
//! committed edit. Writing a whole mask per brush stroke would stall the
//! event loop, so jobs land in a shared pending set that a worker drains on
//! each tick. The set holds at most one job per map and kind: a newer
//! snapshot replaces an older one in place, so it never grows with edit rate
//! and the latest snapshot is never turned away.
//!
//! ERROR HANDLING
//! ==============
//! A failed write is retried with exponential back-off. A job that still
//! fails goes back into the pending set for the next tick unless a newer
//! snapshot for the same map arrived meanwhile. Writes for maps the store no
//! longer knows are dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use canvas::camera::MapPoint;
use canvas::engine::Action;
use canvas::session::MapId;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::store::{AssetStore, StoreError};

pub const DEFAULT_PERSIST_FLUSH_MS: u64 = 250;
pub const DEFAULT_PERSIST_RETRIES: usize = 2;
pub const DEFAULT_PERSIST_RETRY_BASE_MS: u64 = 20;

/// Back-off stops doubling after this many attempts.
const MAX_BACKOFF_SHIFT: u32 = 10;

/// Tuning knobs for the persistence worker, loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistConfig {
    /// How long jobs wait to coalesce before a flush, in milliseconds.
    pub flush_ms: u64,
    /// Total write attempts per job.
    pub retries: usize,
    /// Base delay in milliseconds for exponential retry back-off.
    pub retry_base_ms: u64,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            flush_ms: DEFAULT_PERSIST_FLUSH_MS,
            retries: DEFAULT_PERSIST_RETRIES,
            retry_base_ms: DEFAULT_PERSIST_RETRY_BASE_MS,
        }
    }
}

impl PersistConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            flush_ms: env_parse("DMVIEW_PERSIST_FLUSH_MS", DEFAULT_PERSIST_FLUSH_MS),
            retries: env_parse("DMVIEW_PERSIST_RETRIES", DEFAULT_PERSIST_RETRIES),
            retry_base_ms: env_parse("DMVIEW_PERSIST_RETRY_BASE_MS", DEFAULT_PERSIST_RETRY_BASE_MS),
        }
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let shift = u32::try_from(attempt.saturating_sub(1)).unwrap_or(MAX_BACKOFF_SHIFT).min(MAX_BACKOFF_SHIFT);
        Duration::from_millis(self.retry_base_ms.saturating_mul(1 << shift))
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// One write for the store.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistJob {
    Fog { map_id: MapId, mask: Arc<GrayImage> },
    Pan { map_id: MapId, pan: MapPoint },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobKind {
    Fog,
    Pan,
}

impl PersistJob {
    /// The persistence half of a coordinator action; `None` for render requests.
    #[must_use]
    pub fn from_action(action: Action) -> Option<Self> {
        match action {
            Action::PersistFog { map_id, mask } => Some(Self::Fog { map_id, mask }),
            Action::PersistPan { map_id, pan } => Some(Self::Pan { map_id, pan }),
            Action::RenderNeeded(_) => None,
        }
    }

    #[must_use]
    pub fn map_id(&self) -> MapId {
        match self {
            Self::Fog { map_id, .. } | Self::Pan { map_id, .. } => *map_id,
        }
    }

    fn same_slot(&self, other: &Self) -> bool {
        self.map_id() == other.map_id() && self.kind() == other.kind()
    }

    fn kind(&self) -> JobKind {
        match self {
            Self::Fog { .. } => JobKind::Fog,
            Self::Pan { .. } => JobKind::Pan,
        }
    }

    async fn write(&self, store: &dyn AssetStore) -> Result<(), StoreError> {
        match self {
            Self::Fog { map_id, mask } => store.save_fog_bitmap(*map_id, mask).await,
            Self::Pan { map_id, pan } => store.save_pan(*map_id, *pan).await,
        }
    }
}

/// Queue `job`, replacing an older pending job for the same map and kind in place.
fn coalesce(pending: &mut Vec<PersistJob>, job: PersistJob) {
    let slot = pending.iter_mut().find(|queued| queued.same_slot(&job));
    match slot {
        Some(queued) => *queued = job,
        None => pending.push(job),
    }
}

#[derive(Default)]
struct PendingJobs {
    jobs: Vec<PersistJob>,
    closed: bool,
}

/// State shared between the handle and the worker.
#[derive(Default)]
struct Shared {
    pending: Mutex<PendingJobs>,
    shutdown: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PendingJobs> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take(&self) -> Vec<PersistJob> {
        std::mem::take(&mut self.lock().jobs)
    }

    /// Put a failed job back unless a newer one took its slot.
    fn requeue(&self, job: PersistJob) {
        let mut pending = self.lock();
        if pending.closed {
            error!(map_id = %job.map_id(), "persist failed during shutdown; dropping job");
            return;
        }
        if pending.jobs.iter().any(|queued| queued.same_slot(&job)) {
            return;
        }
        pending.jobs.push(job);
    }
}

/// Sender side of the persistence worker.
pub struct PersistHandle {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl PersistHandle {
    /// Non-blocking enqueue. `false` only once shutdown has begun.
    pub fn enqueue(&self, job: PersistJob) -> bool {
        let mut pending = self.shared.lock();
        if pending.closed {
            warn!(map_id = %job.map_id(), "persist worker closed; dropping job");
            return false;
        }
        coalesce(&mut pending.jobs, job);
        true
    }

    /// Jobs waiting for the next flush.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.shared.lock().jobs.len()
    }

    /// Stop accepting jobs and wait for the worker to flush what it holds.
    pub async fn shutdown(self) {
        let Self { shared, task } = self;
        shared.lock().closed = true;
        shared.shutdown.notify_one();
        if let Err(e) = task.await {
            error!(error = %e, "persistence worker ended abnormally");
        }
    }
}

/// Spawn the persistence worker and return its handle.
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn spawn_persistence_worker(store: Arc<dyn AssetStore>, config: PersistConfig) -> PersistHandle {
    let shared = Arc::new(Shared::default());

    info!(
        flush_ms = config.flush_ms,
        retries = config.retries,
        retry_base_ms = config.retry_base_ms,
        "persistence worker configured"
    );

    let worker = Arc::clone(&shared);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(config.flush_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick is a full period away so early jobs get a chance to coalesce.
        ticker.reset();

        loop {
            tokio::select! {
                () = worker.shutdown.notified() => {
                    flush_with_retry(store.as_ref(), &worker, config).await;
                    break;
                }
                _ = ticker.tick() => {
                    flush_with_retry(store.as_ref(), &worker, config).await;
                }
            }
        }
        debug!("persistence worker stopped");
    });

    PersistHandle { shared, task }
}

async fn flush_with_retry(store: &dyn AssetStore, shared: &Shared, config: PersistConfig) {
    let drained = shared.take();
    if drained.is_empty() {
        return;
    }

    debug!(count = drained.len(), "flushing persist jobs");
    for job in drained {
        if !write_with_retry(store, &job, config).await {
            shared.requeue(job);
        }
    }
}

/// `false` when the job should be tried again on a later tick.
async fn write_with_retry(store: &dyn AssetStore, job: &PersistJob, config: PersistConfig) -> bool {
    let attempts = config.retries.max(1);
    for attempt in 1..=attempts {
        match job.write(store).await {
            Ok(()) => return true,
            Err(StoreError::NotFound(map_id)) => {
                warn!(%map_id, "persist target no longer exists; dropping job");
                return true;
            }
            Err(e) if attempt < attempts => {
                warn!(error = %e, attempt, total = attempts, map_id = %job.map_id(), "persist failed; retrying");
                tokio::time::sleep(config.backoff(attempt)).await;
            }
            Err(e) => {
                error!(error = %e, map_id = %job.map_id(), "persist failed after retries; keeping for next flush");
                return false;
            }
        }
    }
    false
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod persistence_test;
