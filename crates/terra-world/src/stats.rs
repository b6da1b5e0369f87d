use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};
use terra_core::constants::PLACEMENT_BATCH;

/// Counters owned by one scheduler. Updated from the admission thread and
/// every worker; read through [`SchedulerStats::snapshot`].
#[derive(Debug)]
pub struct SchedulerStats {
    screened: AtomicU64,
    queued: AtomicU64,
    skipped: AtomicU64,
    generated: AtomicU64,
    placed: AtomicU64,
    meshed: AtomicU64,
    mesh_dropped: AtomicU64,
    empty: AtomicU64,
    dropped_out_of_bounds: AtomicU64,
    released: AtomicU64,
    double_placements: AtomicU64,
    resets: AtomicU64,
    batch: Mutex<BatchTimer>,
}

#[derive(Debug)]
struct BatchTimer {
    started: Instant,
    last_batch_ms: Option<f64>,
}

/// Point-in-time copy of [`SchedulerStats`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub screened: u64,
    pub queued: u64,
    pub skipped: u64,
    pub generated: u64,
    pub placed: u64,
    /// Non-empty chunks the mesh consumer accepted.
    pub meshed: u64,
    /// Non-empty chunks the mesh consumer never received.
    #[serde(default)]
    pub mesh_dropped: u64,
    pub empty: u64,
    pub dropped_out_of_bounds: u64,
    pub released: u64,
    pub double_placements: u64,
    pub resets: u64,
    /// Wall time of the most recent full placement batch.
    pub last_batch_ms: Option<f64>,
}

impl Default for SchedulerStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerStats {
    pub fn new() -> Self {
        Self {
            screened: AtomicU64::new(0),
            queued: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            generated: AtomicU64::new(0),
            placed: AtomicU64::new(0),
            meshed: AtomicU64::new(0),
            mesh_dropped: AtomicU64::new(0),
            empty: AtomicU64::new(0),
            dropped_out_of_bounds: AtomicU64::new(0),
            released: AtomicU64::new(0),
            double_placements: AtomicU64::new(0),
            resets: AtomicU64::new(0),
            batch: Mutex::new(BatchTimer {
                started: Instant::now(),
                last_batch_ms: None,
            }),
        }
    }

    pub fn record_queued(&self) {
        self.screened.fetch_add(1, Ordering::Relaxed);
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.screened.fetch_add(1, Ordering::Relaxed);
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generated(&self) {
        self.generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a placement and close the timing batch every
    /// `PLACEMENT_BATCH` chunks.
    pub fn record_placed(&self) {
        let placed = self.placed.fetch_add(1, Ordering::Relaxed) + 1;
        if placed % PLACEMENT_BATCH == 0 {
            let mut batch = self.batch.lock().unwrap_or_else(PoisonError::into_inner);
            let ms = batch.started.elapsed().as_secs_f64() * 1000.0;
            info!("{PLACEMENT_BATCH} chunks took {ms:.1} ms ({placed} total)");
            batch.last_batch_ms = Some(ms);
            batch.started = Instant::now();
        }
    }

    pub fn record_meshed(&self) {
        self.meshed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mesh_dropped(&self) {
        self.mesh_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty(&self) {
        self.empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_out_of_bounds(&self) {
        self.dropped_out_of_bounds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_released(&self, count: u64) {
        self.released.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_double_placement(&self) {
        self.double_placements.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn placed(&self) -> u64 {
        self.placed.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let last_batch_ms = self
            .batch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last_batch_ms;
        StatsSnapshot {
            screened: self.screened.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            generated: self.generated.load(Ordering::Relaxed),
            placed: self.placed.load(Ordering::Relaxed),
            meshed: self.meshed.load(Ordering::Relaxed),
            mesh_dropped: self.mesh_dropped.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
            dropped_out_of_bounds: self.dropped_out_of_bounds.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            double_placements: self.double_placements.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
            last_batch_ms,
        }
    }
}
