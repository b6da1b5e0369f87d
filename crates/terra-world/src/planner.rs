use glam::IVec3;
use terra_core::constants::CHUNK_SIZE1D;
use terra_core::math::frustum_half_width;

/// Candidate offsets around the viewpoint in admission order.
///
/// Offsets are in world units on the chunk lattice, with the view looking
/// down `-z`. The list covers every depth in `[-view_distance, view_distance)`
/// and, at each depth, a square cross-section whose half-width grows with
/// the field of view, capped at the view distance. It is sorted by distance from the viewpoint so near
/// chunks are admitted first, and never changes after construction.
#[derive(Debug, Clone)]
pub struct PositionPlanner {
    offsets: Vec<IVec3>,
    view_distance: i32,
    fov_degrees: f32,
}

impl PositionPlanner {
    pub fn new(view_distance: i32, fov_degrees: f32) -> Self {
        let step = CHUNK_SIZE1D as usize;
        let mut offsets = Vec::new();
        for l in (-view_distance..view_distance).step_by(step) {
            let w = frustum_half_width(fov_degrees, l, view_distance);
            for y in (-w..w).step_by(step) {
                for x in (-w..w).step_by(step) {
                    offsets.push(IVec3::new(x, y, -l));
                }
            }
        }
        // Stable: equal distances keep discovery order.
        offsets.sort_by_key(|o| o.length_squared());
        log::debug!(
            "planned {} candidate offsets (view distance {}, fov {})",
            offsets.len(),
            view_distance,
            fov_degrees
        );
        Self {
            offsets,
            view_distance,
            fov_degrees,
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<IVec3> {
        self.offsets.get(index).copied()
    }

    pub fn offsets(&self) -> &[IVec3] {
        &self.offsets
    }

    pub fn iter(&self) -> impl Iterator<Item = IVec3> + '_ {
        self.offsets.iter().copied()
    }

    pub fn view_distance(&self) -> i32 {
        self.view_distance
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sorted_by_distance() {
        for (vd, fov) in [(32, 90.0), (64, 60.0), (40, 120.0)] {
            let planner = PositionPlanner::new(vd, fov);
            let d: Vec<i32> = planner.iter().map(|o| o.length_squared()).collect();
            assert!(d.windows(2).all(|w| w[0] <= w[1]), "vd {vd} fov {fov}");
        }
    }

    #[test]
    fn test_no_duplicates() {
        let planner = PositionPlanner::new(64, 90.0);
        let unique: HashSet<IVec3> = planner.iter().collect();
        assert_eq!(unique.len(), planner.len());
    }

    #[test]
    fn test_deterministic() {
        let a = PositionPlanner::new(48, 75.0);
        let b = PositionPlanner::new(48, 75.0);
        assert_eq!(a.offsets(), b.offsets());
    }

    #[test]
    fn test_offsets_on_chunk_lattice() {
        let cs = CHUNK_SIZE1D as i32;
        let planner = PositionPlanner::new(32, 90.0);
        assert!(planner
            .iter()
            .all(|o| o.x % cs == 0 && o.y % cs == 0 && o.z % cs == 0));
        assert!(planner.iter().all(|o| o.z > -32 && o.z <= 32));
    }

    #[test]
    fn test_cone_widens_with_depth() {
        let planner = PositionPlanner::new(64, 90.0);
        let count_at = |z: i32| planner.iter().filter(|o| o.z == z).count();
        // Depth 0 and +-8 use the one-chunk minimum half-width: 2x2 cells.
        assert_eq!(count_at(0), 4);
        assert_eq!(count_at(-8), 4);
        // Depth 32 at 90 degrees: half-width 32, 8x8 cells.
        assert_eq!(count_at(-32), 64);
        assert!(count_at(-56) > count_at(-32));
    }

    #[test]
    fn test_wide_fov_stays_bounded() {
        let planner = PositionPlanner::new(120, 179.9);
        let per_layer = (2 * 120usize).div_ceil(8).pow(2);
        assert!(planner.len() <= per_layer * 30);
        assert!(planner.iter().all(|o| o.x.abs() <= 120 && o.y.abs() <= 120));
    }

    #[test]
    fn test_equal_distances_keep_row_order() {
        let planner = PositionPlanner::new(32, 90.0);
        // Ties keep enumeration order: depth ascending, then y, then x.
        let first: Vec<IVec3> = planner.iter().take(5).collect();
        assert_eq!(
            first,
            vec![
                IVec3::new(0, 0, 0),
                IVec3::new(0, 0, 8),
                IVec3::new(0, -8, 0),
                IVec3::new(-8, 0, 0),
                IVec3::new(0, 0, -8),
            ]
        );
    }

    #[test]
    fn test_first_offset_is_nearest() {
        let planner = PositionPlanner::new(32, 90.0);
        let first = planner.get(0).expect("non-empty");
        let min = planner.iter().map(|o| o.length_squared()).min().expect("non-empty");
        assert_eq!(first.length_squared(), min);
        assert!(planner.get(planner.len()).is_none());
    }
}
