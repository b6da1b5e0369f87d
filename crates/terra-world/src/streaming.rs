//! The chunk scheduler ("foreman").
//!
//! One admission thread walks the [`PositionPlanner`] list under the current
//! viewpoint transform and claims coordinates in the spatial index; a fixed
//! pool of workers generates them. Signalling is all crossbeam channels:
//!
//! - `jobs`: unbounded FIFO of claimed coordinates. A queued item is a
//!   generation permit.
//! - `gate`: `bounded(1)` admission gate, poked by attach and reset.
//! - `permits`: `bounded(max_pending)`, prefilled. The admission thread takes
//!   one before every step and it comes back when the step skips or when a
//!   worker finishes the job, which bounds claimed-but-unfinished chunks.
//! - `shutdown`: never sent on; dropping its sender in [`Foreman::stop`]
//!   wakes every blocked `select!`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{select, Receiver, Sender};
use log::{debug, info, trace};
use terra_core::config::StreamingConfig;
use terra_core::error::TerraError;
use terra_core::types::ChunkCoord;

use crate::chunk_map::SpatialIndex;
use crate::dispatch::{ChunkWorker, MeshSink};
use crate::filler::ChunkFiller;
use crate::planner::PositionPlanner;
use crate::state_machine::{AdmitOutcome, Admission, SchedulerState};
use crate::stats::{SchedulerStats, StatsSnapshot};
use crate::terrain::HeightField;
use crate::viewpoint::ViewTransform;

struct Shared {
    running: AtomicBool,
    admission: Mutex<Admission>,
    planner: PositionPlanner,
    worker: ChunkWorker,
    max_pending: usize,
    gate_tx: Sender<()>,
    gate_rx: Receiver<()>,
    jobs_tx: Sender<ChunkCoord>,
    jobs_rx: Receiver<ChunkCoord>,
    permits_tx: Sender<()>,
    permits_rx: Receiver<()>,
    shutdown_rx: Receiver<()>,
}

impl Shared {
    fn lock_admission(&self) -> MutexGuard<'_, Admission> {
        self.admission.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn open_gate(&self) {
        // A token already waiting is as good as a new one.
        let _ = self.gate_tx.try_send(());
    }

    fn return_permit(&self) {
        let _ = self.permits_tx.try_send(());
    }

    fn attach(&self, transform: ViewTransform) -> bool {
        let attached = self.lock_admission().attach(transform);
        if attached {
            info!("viewpoint attached at {}", transform.origin);
            self.open_gate();
        }
        attached
    }

    fn reset(&self, transform: Option<ViewTransform>) {
        let released = {
            let mut admission = self.lock_admission();
            // Jobs are only enqueued under this lock, so the drain sees every
            // stale coordinate that no worker has picked up yet.
            let mut released = 0u64;
            for coord in self.jobs_rx.try_iter() {
                self.worker.index.release(coord);
                self.return_permit();
                released += 1;
            }
            admission.reset(transform);
            released
        };
        self.worker.stats.record_reset();
        self.worker.stats.record_released(released);
        debug!("plan reset, {released} queued chunks released");
        self.open_gate();
    }

    fn outstanding(&self) -> usize {
        self.max_pending.saturating_sub(self.permits_rx.len())
    }
}

/// Cloneable reset/attach handle given to the viewpoint tracker.
#[derive(Clone)]
pub struct ForemanHandle {
    shared: Arc<Shared>,
}

impl ForemanHandle {
    /// Start scanning under `transform`. Only the first attach counts.
    pub fn attach(&self, transform: ViewTransform) -> bool {
        self.shared.attach(transform)
    }

    /// Drop queued work and rescan from the nearest candidate.
    pub fn reset(&self, transform: Option<ViewTransform>) {
        self.shared.reset(transform);
    }
}

/// Owns the admission thread and the generation pool.
pub struct Foreman {
    shared: Arc<Shared>,
    shutdown_tx: Mutex<Option<Sender<()>>>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl Foreman {
    /// Spawn the admission thread and `config.generation_threads` workers.
    /// Nothing is generated until a viewpoint attaches.
    pub fn new(
        config: &StreamingConfig,
        index: Arc<dyn SpatialIndex>,
        field: Arc<dyn HeightField>,
        filler: ChunkFiller,
        mesher: Arc<dyn MeshSink>,
    ) -> Result<Self, TerraError> {
        if config.generation_threads == 0 {
            return Err(TerraError::InvalidConfig(
                "generation_threads must be at least 1".into(),
            ));
        }
        if !(config.fov_degrees > 0.0 && config.fov_degrees < 180.0) {
            return Err(TerraError::InvalidConfig(format!(
                "fov_degrees must lie in (0, 180), got {}",
                config.fov_degrees
            )));
        }
        if config.max_pending == 0 {
            return Err(TerraError::InvalidConfig(
                "max_pending must be at least 1".into(),
            ));
        }

        let planner = PositionPlanner::new(config.view_distance, config.fov_degrees);
        let stats = Arc::new(SchedulerStats::new());
        let worker = ChunkWorker::new(index, field, filler, mesher, stats);

        let (gate_tx, gate_rx) = crossbeam_channel::bounded(1);
        let (jobs_tx, jobs_rx) = crossbeam_channel::unbounded();
        let (permits_tx, permits_rx) = crossbeam_channel::bounded(config.max_pending);
        for _ in 0..config.max_pending {
            let _ = permits_tx.try_send(());
        }
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);

        let shared = Arc::new(Shared {
            running: AtomicBool::new(true),
            admission: Mutex::new(Admission::new()),
            planner,
            worker,
            max_pending: config.max_pending,
            gate_tx,
            gate_rx,
            jobs_tx,
            jobs_rx,
            permits_tx,
            permits_rx,
            shutdown_rx,
        });

        let foreman = Self {
            shared,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            threads: Mutex::new(Vec::with_capacity(config.generation_threads + 1)),
        };

        // On a spawn failure the early return drops `foreman`, which stops
        // whatever already started.
        foreman.spawn("terra-admission".to_string(), admission_loop)?;
        for i in 0..config.generation_threads {
            foreman.spawn(format!("terra-worker-{i}"), worker_loop)?;
        }

        info!(
            "foreman started: {} candidates, {} workers, {} max pending",
            foreman.shared.planner.len(),
            config.generation_threads,
            config.max_pending
        );
        Ok(foreman)
    }

    fn spawn(&self, name: String, body: fn(Arc<Shared>)) -> Result<(), TerraError> {
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || body(shared))
            .map_err(|source| TerraError::ThreadSpawn { name, source })?;
        self.threads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
        Ok(())
    }

    pub fn handle(&self) -> ForemanHandle {
        ForemanHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Bind the first viewpoint. Later calls are ignored and return false.
    pub fn attach(&self, transform: ViewTransform) -> bool {
        self.shared.attach(transform)
    }

    /// Rescan from the nearest candidate, under `transform` if given.
    pub fn reset(&self, transform: Option<ViewTransform>) {
        self.shared.reset(transform);
    }

    /// Rescan without moving.
    pub fn release(&self) {
        self.shared.reset(None);
    }

    pub fn state(&self) -> SchedulerState {
        self.shared.lock_admission().state()
    }

    pub fn planner(&self) -> &PositionPlanner {
        &self.shared.planner
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.worker.stats.snapshot()
    }

    /// Coordinates claimed or being screened but not yet finished.
    pub fn pending(&self) -> usize {
        self.shared.outstanding()
    }

    /// Scan exhausted and every admitted chunk finished.
    pub fn is_settled(&self) -> bool {
        let paused = self.state() == SchedulerState::Paused;
        paused && self.shared.outstanding() == 0
    }

    /// Poll [`Self::is_settled`] until it holds or `timeout` passes.
    pub fn wait_settled(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_settled() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Ask every thread to exit at its next loop iteration. Does not wait.
    pub fn stop(&self) {
        if self.shared.running.swap(false, Ordering::AcqRel) {
            info!("foreman stopping");
        }
        self.shutdown_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Stop and wait for every thread to exit.
    pub fn join(&self) {
        self.stop();
        let handles: Vec<_> = self
            .threads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for handle in handles {
            let name = handle.thread().name().unwrap_or("unnamed").to_string();
            if handle.join().is_err() {
                log::error!("{name} thread panicked");
            }
        }
    }
}

impl Drop for Foreman {
    fn drop(&mut self) {
        self.join();
    }
}

fn admission_loop(shared: Arc<Shared>) {
    'gate: while shared.is_running() {
        select! {
            recv(shared.gate_rx) -> _ => {},
            recv(shared.shutdown_rx) -> _ => break 'gate,
        }

        // Free-run until the list is exhausted or nothing is attached.
        while shared.is_running() {
            select! {
                recv(shared.permits_rx) -> _ => {},
                recv(shared.shutdown_rx) -> _ => break 'gate,
            }

            let outcome = {
                let mut admission = shared.lock_admission();
                let outcome = admission.step(&shared.planner, shared.worker.index.as_ref());
                if let AdmitOutcome::Queued(coord) = outcome {
                    let _ = shared.jobs_tx.send(coord);
                }
                outcome
            };

            match outcome {
                AdmitOutcome::Queued(coord) => {
                    trace!("queued chunk {coord}");
                    shared.worker.stats.record_queued();
                }
                AdmitOutcome::Skipped(_) => {
                    shared.worker.stats.record_skipped();
                    shared.return_permit();
                }
                AdmitOutcome::Exhausted | AdmitOutcome::Idle => {
                    shared.return_permit();
                    debug!("admission paused");
                    continue 'gate;
                }
            }
        }
    }
    debug!("admission thread exiting");
}

fn worker_loop(shared: Arc<Shared>) {
    while shared.is_running() {
        let coord = select! {
            recv(shared.jobs_rx) -> job => match job {
                Ok(coord) => coord,
                Err(_) => break,
            },
            recv(shared.shutdown_rx) -> _ => break,
        };
        if !shared.is_running() {
            shared.worker.index.release(coord);
            break;
        }
        shared.worker.generate(coord);
        shared.return_permit();
    }
    trace!("worker exiting");
}
