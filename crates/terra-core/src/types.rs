use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::constants::AIR_RAW;

/// Newtype for material identifiers. 0 = air/empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u16);

impl MaterialId {
    /// The "no material" sentinel.
    pub const AIR: MaterialId = MaterialId(AIR_RAW);

    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

/// Chunk coordinate in chunk-space (each unit = CHUNK_SIZE1D voxels).
pub type ChunkCoord = IVec3;

/// World coordinate in voxel-space.
pub type WorldCoord = IVec3;
