use glam::{IVec3, Mat3, Vec3};
use terra_core::constants::CHUNK_SIZE1D;
use terra_core::types::ChunkCoord;

use crate::streaming::ForemanHandle;

/// Viewpoint origin (world units) and orientation basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub origin: Vec3,
    pub basis: Mat3,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        origin: Vec3::ZERO,
        basis: Mat3::IDENTITY,
    };

    pub fn new(origin: Vec3, basis: Mat3) -> Self {
        Self { origin, basis }
    }

    /// Unrotated viewpoint at `origin`.
    pub fn at(origin: Vec3) -> Self {
        Self::new(origin, Mat3::IDENTITY)
    }

    /// World position of a planner offset under this transform.
    pub fn to_world(&self, offset: IVec3) -> Vec3 {
        self.origin + self.basis * offset.as_vec3()
    }

    /// Chunk containing a planner offset, truncated toward zero.
    pub fn offset_to_chunk(&self, offset: IVec3) -> ChunkCoord {
        (self.to_world(offset) / CHUNK_SIZE1D as f32).as_ivec3()
    }
}

/// The single viewpoint driving a scheduler. Every mutation resets the
/// scheduler's plan with the new transform.
#[derive(Default)]
pub struct ViewpointTracker {
    transform: ViewTransform,
    foreman: Option<ForemanHandle>,
}

impl ViewpointTracker {
    pub fn new(transform: ViewTransform) -> Self {
        Self {
            transform,
            foreman: None,
        }
    }

    /// Bind to a scheduler and start its first scan. Returns false, changing
    /// nothing, if this tracker is already attached.
    pub fn attach(&mut self, foreman: ForemanHandle) -> bool {
        if self.foreman.is_some() {
            log::debug!("viewpoint already attached, ignoring");
            return false;
        }
        foreman.attach(self.transform);
        self.foreman = Some(foreman);
        true
    }

    pub fn is_attached(&self) -> bool {
        self.foreman.is_some()
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Translate the viewpoint by `delta` world units.
    pub fn move_by(&mut self, delta: Vec3) {
        self.transform.origin += delta;
        self.replan();
    }

    /// Apply `rotation` on top of the current orientation.
    pub fn rotate(&mut self, rotation: Mat3) {
        self.transform.basis *= rotation;
        self.replan();
    }

    pub fn move_to(&mut self, origin: Vec3) {
        self.transform.origin = origin;
        self.replan();
    }

    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
        self.replan();
    }

    fn replan(&self) {
        if let Some(foreman) = &self.foreman {
            foreman.reset(Some(self.transform));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_chunk_translates_and_divides() {
        let t = ViewTransform::at(Vec3::new(64.0, 16.0, 64.0));
        assert_eq!(t.offset_to_chunk(IVec3::ZERO), IVec3::new(8, 2, 8));
        assert_eq!(t.offset_to_chunk(IVec3::new(8, 0, -16)), IVec3::new(9, 2, 6));
    }

    #[test]
    fn test_offset_to_chunk_truncates_toward_zero() {
        let t = ViewTransform::at(Vec3::new(4.0, 0.0, 0.0));
        // -8 + 4 = -4 world units truncates to chunk 0, not -1.
        assert_eq!(t.offset_to_chunk(IVec3::new(-8, 0, 0)), IVec3::ZERO);
        assert_eq!(t.offset_to_chunk(IVec3::new(-16, 0, 0)), IVec3::new(-1, 0, 0));
    }

    #[test]
    fn test_offset_to_chunk_rotates() {
        // Quarter turn about y maps -z onto -x.
        let t = ViewTransform::new(Vec3::ZERO, Mat3::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert_eq!(t.offset_to_chunk(IVec3::new(0, 0, -16)), IVec3::new(-2, 0, 0));
    }

    #[test]
    fn test_unattached_tracker_updates_transform() {
        let mut tracker = ViewpointTracker::default();
        tracker.move_by(Vec3::new(8.0, 0.0, 0.0));
        tracker.move_by(Vec3::new(0.0, 0.0, 8.0));
        assert_eq!(tracker.transform().origin, Vec3::new(8.0, 0.0, 8.0));
        tracker.move_to(Vec3::ONE);
        assert_eq!(tracker.transform().origin, Vec3::ONE);
        assert!(!tracker.is_attached());
    }
}
