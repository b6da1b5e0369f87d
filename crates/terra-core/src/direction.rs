use crate::constants::CHUNK_SIZE1D;

/// One of the six faces of a chunk, named by the axis it faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    NegX = 0,
    PosX = 1,
    NegY = 2,
    PosY = 3,
    NegZ = 4,
    PosZ = 5,
}

/// All six faces, in mask storage order.
pub const ALL_FACES: [Face; 6] = [
    Face::NegX,
    Face::PosX,
    Face::NegY,
    Face::PosY,
    Face::NegZ,
    Face::PosZ,
];

impl Face {
    pub fn index(self) -> usize {
        self as usize
    }

    /// Local voxel coordinate of cell `(u, v)` on this face's outermost layer.
    ///
    /// `(u, v)` are the two remaining axes in flattening order (y before x
    /// before z): `(y, z)` for the X faces, `(x, z)` for the Y faces and
    /// `(y, x)` for the Z faces.
    pub fn plane_voxel(self, u: u32, v: u32) -> (u32, u32, u32) {
        let last = CHUNK_SIZE1D - 1;
        match self {
            Face::NegX => (0, u, v),
            Face::PosX => (last, u, v),
            Face::NegY => (u, 0, v),
            Face::PosY => (u, last, v),
            Face::NegZ => (v, u, 0),
            Face::PosZ => (v, u, last),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faces_in_storage_order() {
        for (i, a) in ALL_FACES.iter().enumerate() {
            assert_eq!(a.index(), i);
        }
    }

    #[test]
    fn test_plane_voxel_stays_on_face() {
        let last = CHUNK_SIZE1D - 1;
        assert_eq!(Face::NegX.plane_voxel(3, 5), (0, 3, 5));
        assert_eq!(Face::PosY.plane_voxel(2, 7), (2, last, 7));
        assert_eq!(Face::PosZ.plane_voxel(1, 6), (6, 1, last));
    }
}
