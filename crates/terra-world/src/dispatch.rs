use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, SendTimeoutError, Sender};
use log::{error, trace, warn};
use terra_core::math::chunk_origin;
use terra_core::types::ChunkCoord;

use crate::chunk::Chunk;
use crate::chunk_map::{IndexError, SpatialIndex};
use crate::filler::ChunkFiller;
use crate::stats::SchedulerStats;
use crate::terrain::HeightField;

/// Receives every non-empty chunk for mesh building. Called from many
/// workers at once and must return promptly.
pub trait MeshSink: Send + Sync {
    /// Hand a chunk over. Returns false if the chunk was not accepted.
    fn mesh_chunk(&self, chunk: Arc<Chunk>) -> bool;
}

/// Forwards chunks over a bounded channel. A worker waits at most
/// `timeout` for room, then drops the chunk.
pub struct ChannelMeshSink {
    sender: Sender<Arc<Chunk>>,
    timeout: Duration,
    dropped: AtomicU64,
}

impl ChannelMeshSink {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(250);

    pub fn new(capacity: usize) -> (Self, Receiver<Arc<Chunk>>) {
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        let sink = Self {
            sender,
            timeout: Self::DEFAULT_TIMEOUT,
            dropped: AtomicU64::new(0),
        };
        (sink, receiver)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Chunks discarded because the consumer fell behind or went away.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl MeshSink for ChannelMeshSink {
    fn mesh_chunk(&self, chunk: Arc<Chunk>) -> bool {
        match self.sender.send_timeout(chunk, self.timeout) {
            Ok(()) => true,
            Err(SendTimeoutError::Timeout(chunk)) => {
                warn!("mesh queue full, dropping chunk at {}", chunk.origin);
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            Err(SendTimeoutError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }
}

/// What a worker did with one dequeued coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOutcome {
    /// Outside the world; the claim was released and nothing generated.
    OutOfBounds,
    /// Generated and stored. `meshed` is false for empty chunks and for
    /// chunks the mesh sink refused.
    Placed { meshed: bool },
    /// The leaf already held a chunk. Never expected.
    DoublePlaced,
}

/// Everything a generation worker needs, shared by the whole pool.
pub struct ChunkWorker {
    pub(crate) index: Arc<dyn SpatialIndex>,
    field: Arc<dyn HeightField>,
    filler: ChunkFiller,
    mesher: Arc<dyn MeshSink>,
    pub(crate) stats: Arc<SchedulerStats>,
}

impl ChunkWorker {
    pub fn new(
        index: Arc<dyn SpatialIndex>,
        field: Arc<dyn HeightField>,
        filler: ChunkFiller,
        mesher: Arc<dyn MeshSink>,
        stats: Arc<SchedulerStats>,
    ) -> Self {
        Self {
            index,
            field,
            filler,
            mesher,
            stats,
        }
    }

    /// Generate, place and hand off the chunk at a claimed coordinate.
    pub fn generate(&self, coord: ChunkCoord) -> WorkOutcome {
        if !self.index.check_bounds(coord) {
            trace!("dropping out-of-bounds chunk {coord}");
            self.index.release(coord);
            self.stats.record_out_of_bounds();
            return WorkOutcome::OutOfBounds;
        }

        let chunk = Arc::new(self.filler.fill(chunk_origin(coord), self.field.as_ref()));
        self.stats.record_generated();
        let is_empty = chunk.is_empty;

        match self.index.place(coord, Arc::clone(&chunk)) {
            Ok(()) => self.stats.record_placed(),
            Err(IndexError::AlreadyPlaced(_)) => {
                error!("chunk {coord} generated twice; keeping the first");
                self.stats.record_double_placement();
                return WorkOutcome::DoublePlaced;
            }
            Err(err @ IndexError::OutOfBounds(_)) => {
                // check_bounds passed above, so the index disagrees with itself.
                error!("{err}");
                self.index.release(coord);
                self.stats.record_out_of_bounds();
                return WorkOutcome::OutOfBounds;
            }
        }

        if is_empty {
            self.stats.record_empty();
            return WorkOutcome::Placed { meshed: false };
        }
        let meshed = self.mesher.mesh_chunk(chunk);
        if meshed {
            self.stats.record_meshed();
        } else {
            self.stats.record_mesh_dropped();
        }
        WorkOutcome::Placed { meshed }
    }
}
