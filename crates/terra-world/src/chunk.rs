use terra_core::constants::{CHUNK_SIZE1D, CHUNK_SIZE2D, CHUNK_SIZE3D, FACE_COUNT};
use terra_core::direction::{Face, ALL_FACES};
use terra_core::math::{voxel_index, world_to_chunk};
use terra_core::types::{ChunkCoord, MaterialId, WorldCoord};

use crate::rle::{self, Run};

const FACE_AREA: usize = CHUNK_SIZE2D as usize;

/// Occupancy of the outermost voxel layer on each of the six chunk faces.
/// Consumed by the mesher to cull faces shared with solid neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceMasks {
    masks: [[bool; FACE_AREA]; FACE_COUNT],
}

impl FaceMasks {
    /// Sample all six boundary planes of a dense chunk buffer.
    pub fn from_dense(voxels: &[MaterialId]) -> Self {
        debug_assert_eq!(voxels.len(), CHUNK_SIZE3D as usize);
        let mut masks = [[false; FACE_AREA]; FACE_COUNT];
        for face in ALL_FACES {
            let mask = &mut masks[face.index()];
            for v in 0..CHUNK_SIZE1D {
                for u in 0..CHUNK_SIZE1D {
                    let (x, y, z) = face.plane_voxel(u, v);
                    mask[(u + v * CHUNK_SIZE1D) as usize] = !voxels[voxel_index(x, y, z)].is_air();
                }
            }
        }
        Self { masks }
    }

    pub fn from_runs(runs: &[Run]) -> Self {
        Self::from_dense(&rle::decode(runs))
    }

    /// Raw mask for one face, indexed `u + v * CHUNK_SIZE1D`.
    pub fn face(&self, face: Face) -> &[bool; FACE_AREA] {
        &self.masks[face.index()]
    }

    pub fn is_occupied(&self, face: Face, u: u32, v: u32) -> bool {
        self.masks[face.index()][(u + v * CHUNK_SIZE1D) as usize]
    }

    /// Number of non-air cells on a face.
    pub fn occupied_count(&self, face: Face) -> usize {
        self.face(face).iter().filter(|&&o| o).count()
    }

    /// True when every cell on the face is non-air.
    pub fn is_face_full(&self, face: Face) -> bool {
        self.face(face).iter().all(|&o| o)
    }
}

/// A generated chunk. Immutable once the filler returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Minimum corner in world voxel units (multiple of CHUNK_SIZE1D).
    pub origin: WorldCoord,
    /// Distinct material count (1 for uniform chunks, 3 for dirt/grass/air surfaces).
    pub materials: u32,
    /// No non-air voxel anywhere.
    pub is_empty: bool,
    /// The terrain surface crosses this chunk.
    pub is_surface: bool,
    /// A single run covers the whole chunk.
    pub is_solid: bool,
    pub runs: Vec<Run>,
    /// Present exactly when the chunk is not uniform.
    pub borders: Option<Box<FaceMasks>>,
}

impl Chunk {
    /// An all-air chunk.
    pub fn empty(origin: WorldCoord) -> Self {
        Self::uniform(origin, MaterialId::AIR)
    }

    /// A chunk made of one material throughout.
    pub fn uniform(origin: WorldCoord, value: MaterialId) -> Self {
        Self {
            origin,
            materials: 1,
            is_empty: value.is_air(),
            is_surface: false,
            is_solid: true,
            runs: vec![Run::new(value, CHUNK_SIZE3D)],
            borders: None,
        }
    }

    /// Build a chunk from a canonical run sequence. Flags and face masks
    /// are derived from the runs; `materials` and `is_surface` come from
    /// the filler that produced them.
    pub fn from_runs(origin: WorldCoord, runs: Vec<Run>, materials: u32, is_surface: bool) -> Self {
        debug_assert!(rle::is_canonical(&runs), "non-canonical runs at {origin}");
        let is_solid = runs.len() == 1;
        let is_empty = runs.iter().all(|r| r.value.is_air());
        let borders = if is_solid {
            None
        } else {
            Some(Box::new(FaceMasks::from_runs(&runs)))
        };
        Self {
            origin,
            materials,
            is_empty,
            is_surface,
            is_solid,
            runs,
            borders,
        }
    }

    /// Encode a dense working buffer. A single resulting run gives a solid
    /// chunk; anything else is a surface chunk whose masks are sampled from
    /// `voxels` before it is dropped.
    pub fn from_dense(origin: WorldCoord, voxels: &[MaterialId]) -> Self {
        let runs = rle::encode(voxels);
        if let [only] = runs.as_slice() {
            return Self::uniform(origin, only.value);
        }
        let mut distinct: Vec<MaterialId> = runs.iter().map(|r| r.value).collect();
        distinct.sort_unstable();
        distinct.dedup();
        Self {
            origin,
            materials: distinct.len() as u32,
            is_empty: false,
            is_surface: true,
            is_solid: false,
            runs,
            borders: Some(Box::new(FaceMasks::from_dense(voxels))),
        }
    }

    /// Chunk-grid coordinate of this chunk.
    pub fn coord(&self) -> ChunkCoord {
        world_to_chunk(self.origin)
    }

    pub fn is_uniform(&self) -> bool {
        self.runs.len() == 1
    }

    /// Dense voxel buffer in flattening order.
    pub fn voxels(&self) -> Vec<MaterialId> {
        rle::decode(&self.runs)
    }

    pub fn material_at(&self, x: u32, y: u32, z: u32) -> MaterialId {
        rle::value_at(&self.runs, voxel_index(x, y, z)).unwrap_or(MaterialId::AIR)
    }

    pub fn borders(&self) -> Option<&FaceMasks> {
        self.borders.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    const STONE: MaterialId = MaterialId(1);

    #[test]
    fn test_uniform_chunk_flags() {
        let chunk = Chunk::uniform(IVec3::new(8, 16, 0), STONE);
        assert!(chunk.is_solid);
        assert!(!chunk.is_empty);
        assert!(chunk.borders().is_none());
        assert_eq!(chunk.coord(), IVec3::new(1, 2, 0));
        assert_eq!(chunk.voxels().len(), CHUNK_SIZE3D as usize);

        let air = Chunk::empty(IVec3::ZERO);
        assert!(air.is_empty && air.is_uniform());
    }

    #[test]
    fn test_face_masks_single_voxel() {
        let mut dense = vec![MaterialId::AIR; CHUNK_SIZE3D as usize];
        // On the -x face at y=3, z=5.
        dense[voxel_index(0, 3, 5)] = STONE;
        let masks = FaceMasks::from_dense(&dense);
        assert!(masks.is_occupied(Face::NegX, 3, 5));
        assert_eq!(masks.occupied_count(Face::NegX), 1);
        assert_eq!(masks.occupied_count(Face::PosX), 0);
        // y=3 and z=5 are interior, so no other face sees it.
        assert_eq!(masks.occupied_count(Face::NegY), 0);
        assert_eq!(masks.occupied_count(Face::NegZ), 0);
    }

    #[test]
    fn test_face_masks_corner_voxel_hits_three_faces() {
        let last = CHUNK_SIZE1D - 1;
        let mut dense = vec![MaterialId::AIR; CHUNK_SIZE3D as usize];
        dense[voxel_index(last, 0, last)] = STONE;
        let masks = FaceMasks::from_dense(&dense);
        // +x face: (u, v) = (y, z)
        assert!(masks.is_occupied(Face::PosX, 0, last));
        // -y face: (u, v) = (x, z)
        assert!(masks.is_occupied(Face::NegY, last, last));
        // +z face: (u, v) = (y, x)
        assert!(masks.is_occupied(Face::PosZ, 0, last));
        assert_eq!(masks.occupied_count(Face::NegX), 0);
        assert_eq!(masks.occupied_count(Face::PosY), 0);
        assert_eq!(masks.occupied_count(Face::NegZ), 0);
    }

    #[test]
    fn test_from_runs_derives_masks_for_layered_chunk() {
        // Bottom half stone, top half air: every column is 4 stone + 4 air.
        let mut dense = vec![MaterialId::AIR; CHUNK_SIZE3D as usize];
        for (i, v) in dense.iter_mut().enumerate() {
            if (i as u32 % CHUNK_SIZE1D) < CHUNK_SIZE1D / 2 {
                *v = STONE;
            }
        }
        let chunk = Chunk::from_runs(IVec3::ZERO, rle::encode(&dense), 2, true);
        assert!(!chunk.is_solid);
        assert!(!chunk.is_empty);
        let masks = chunk.borders().expect("non-uniform chunk has masks");
        assert!(masks.is_face_full(Face::NegY));
        assert_eq!(masks.occupied_count(Face::PosY), 0);
        assert_eq!(masks.occupied_count(Face::NegX), (CHUNK_SIZE2D / 2) as usize);
        assert_eq!(chunk.material_at(5, 2, 7), STONE);
        assert_eq!(chunk.material_at(5, 6, 7), MaterialId::AIR);
    }
}
