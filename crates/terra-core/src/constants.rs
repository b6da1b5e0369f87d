//! Single source of truth for shared constants.
//! Chunk geometry is derived from CHUNK_EXPONENT so shifts and sizes agree.

/// log2 of the chunk edge length.
pub const CHUNK_EXPONENT: u32 = 3;

/// Side length of a chunk in voxels.
pub const CHUNK_SIZE1D: u32 = 1 << CHUNK_EXPONENT;

/// Voxels in one face plane of a chunk (8^2).
pub const CHUNK_SIZE2D: u32 = CHUNK_SIZE1D * CHUNK_SIZE1D;

/// Total voxels per chunk (8^3).
pub const CHUNK_SIZE3D: u32 = CHUNK_SIZE2D * CHUNK_SIZE1D;

/// Number of faces on a chunk, one occupancy mask each.
pub const FACE_COUNT: usize = 6;

/// Raw value of the "no material" sentinel. Material 0 = air.
pub const AIR_RAW: u16 = 0;

/// Placements per timing batch reported by the scheduler.
pub const PLACEMENT_BATCH: u64 = 500;

/// Default view distance in world units (voxels).
pub const DEFAULT_VIEW_DISTANCE: i32 = 128;

/// Default horizontal field of view in degrees.
pub const DEFAULT_FOV_DEGREES: f32 = 90.0;

/// Default worker pool size.
pub const DEFAULT_GENERATION_THREADS: usize = 4;

/// Default bound on reserved-but-unfinished chunks.
pub const DEFAULT_MAX_PENDING: usize = 256;

/// Default world extent in chunks along x, y and z.
pub const DEFAULT_WORLD_CHUNKS: [i32; 3] = [256, 32, 256];
