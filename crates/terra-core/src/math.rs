use crate::constants::{CHUNK_SIZE1D, CHUNK_SIZE2D};
use crate::types::{ChunkCoord, WorldCoord};
use glam::IVec3;

/// Convert a world-space voxel coordinate to its containing chunk coordinate.
pub fn world_to_chunk(world: WorldCoord) -> ChunkCoord {
    let cs = CHUNK_SIZE1D as i32;
    IVec3::new(
        world.x.div_euclid(cs),
        world.y.div_euclid(cs),
        world.z.div_euclid(cs),
    )
}

/// World-space origin (minimum corner) of a chunk.
pub fn chunk_origin(chunk: ChunkCoord) -> WorldCoord {
    chunk * CHUNK_SIZE1D as i32
}

/// Linear voxel index inside a chunk. y varies fastest, then x, then z.
#[inline]
pub fn voxel_index(x: u32, y: u32, z: u32) -> usize {
    (y + x * CHUNK_SIZE1D + z * CHUNK_SIZE2D) as usize
}

/// Lateral half-width of the view cone at `depth` world units, rounded up to
/// whole chunks. Never narrower than one chunk and never wider than
/// `max_half_width` rounded up to whole chunks.
pub fn frustum_half_width(fov_degrees: f32, depth: i32, max_half_width: i32) -> i32 {
    let cs = CHUNK_SIZE1D as i32;
    let max_chunks = (max_half_width.max(cs) + cs - 1) / cs;
    let half_angle = (fov_degrees as f64 * 0.5).to_radians();
    let raw = depth.unsigned_abs() as f64 * half_angle.tan();
    // Absorb tan() rounding so exact multiples do not spill into an extra chunk.
    let chunks = (raw / cs as f64 - 1e-6).ceil().min(max_chunks as f64) as i32;
    chunks.clamp(1, max_chunks) * cs
}
