use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use glam::IVec3;
use terra_core::types::ChunkCoord;
use thiserror::Error;

use crate::chunk::Chunk;

/// Tree depth at which chunk leaves live.
pub const LEAF_DEPTH: u32 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("chunk {0} was already placed")]
    AlreadyPlaced(ChunkCoord),
    #[error("chunk {0} lies outside the world")]
    OutOfBounds(ChunkCoord),
}

/// A leaf of the spatial index as seen by the scheduler.
#[derive(Debug, Clone)]
pub struct IndexNode {
    pub coord: ChunkCoord,
    pub depth: u32,
    /// None while the leaf is reserved but not yet generated.
    pub chunk: Option<Arc<Chunk>>,
}

/// Storage the scheduler places generated chunks into. Shared by the
/// admission thread and every worker.
pub trait SpatialIndex: Send + Sync {
    /// Leaf at `coord`, or None if nothing has touched it yet.
    fn traverse(&self, coord: ChunkCoord, depth: u32) -> Option<IndexNode>;

    fn check_bounds(&self, coord: ChunkCoord) -> bool;

    /// Atomically reserve `coord` for generation. Returns false if the leaf
    /// is already reserved or holds a chunk.
    fn claim(&self, coord: ChunkCoord) -> bool;

    /// Drop a reservation that will never be placed. Placed chunks stay.
    fn release(&self, coord: ChunkCoord);

    /// Store a generated chunk. Each leaf accepts exactly one chunk.
    fn place(&self, coord: ChunkCoord, chunk: Arc<Chunk>) -> Result<(), IndexError>;
}

#[derive(Debug, Clone)]
enum Slot {
    Claimed,
    Placed(Arc<Chunk>),
}

/// Flat concurrent chunk store over a bounded box of chunk coordinates
/// `[0, extent)` on every axis.
pub struct ChunkMap {
    slots: DashMap<ChunkCoord, Slot>,
    extent: IVec3,
}

impl ChunkMap {
    pub fn new(extent: IVec3) -> Self {
        Self {
            slots: DashMap::new(),
            extent,
        }
    }

    pub fn extent(&self) -> IVec3 {
        self.extent
    }

    /// Get a placed chunk by coordinate.
    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.slots.get(&coord).and_then(|slot| match slot.value() {
            Slot::Placed(chunk) => Some(Arc::clone(chunk)),
            Slot::Claimed => None,
        })
    }

    pub fn is_placed(&self, coord: ChunkCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Number of leaves holding a chunk.
    pub fn placed_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot.value(), Slot::Placed(_)))
            .count()
    }

    /// Number of leaves reserved but not yet placed.
    pub fn claimed_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot.value(), Slot::Claimed))
            .count()
    }

    /// Coordinates of every placed chunk, in no particular order.
    pub fn placed_coords(&self) -> Vec<ChunkCoord> {
        self.slots
            .iter()
            .filter(|slot| matches!(slot.value(), Slot::Placed(_)))
            .map(|slot| *slot.key())
            .collect()
    }
}

impl SpatialIndex for ChunkMap {
    fn traverse(&self, coord: ChunkCoord, depth: u32) -> Option<IndexNode> {
        self.slots.get(&coord).map(|slot| IndexNode {
            coord,
            depth,
            chunk: match slot.value() {
                Slot::Placed(chunk) => Some(Arc::clone(chunk)),
                Slot::Claimed => None,
            },
        })
    }

    fn check_bounds(&self, coord: ChunkCoord) -> bool {
        coord.cmpge(IVec3::ZERO).all() && coord.cmplt(self.extent).all()
    }

    fn claim(&self, coord: ChunkCoord) -> bool {
        match self.slots.entry(coord) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(Slot::Claimed);
                true
            }
        }
    }

    fn release(&self, coord: ChunkCoord) {
        self.slots
            .remove_if(&coord, |_, slot| matches!(slot, Slot::Claimed));
    }

    fn place(&self, coord: ChunkCoord, chunk: Arc<Chunk>) -> Result<(), IndexError> {
        if !self.check_bounds(coord) {
            return Err(IndexError::OutOfBounds(coord));
        }
        match self.slots.entry(coord) {
            Entry::Occupied(mut occupied) => {
                if matches!(occupied.get(), Slot::Placed(_)) {
                    return Err(IndexError::AlreadyPlaced(coord));
                }
                occupied.insert(Slot::Placed(chunk));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Slot::Placed(chunk));
            }
        }
        Ok(())
    }
}
