use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// What the single-surface filler does with a chunk no column crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollapseMode {
    /// Keep the merged per-column runs. Only a truly uniform chunk ends up
    /// as a single run.
    #[default]
    Exact,
    /// Collapse to one uniform run: buried if any column was buried,
    /// otherwise air. Columns of the other kind are lost.
    Uniform,
}

/// Which filler mode the scheduler workers use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillStrategy {
    /// Buried material with a one-voxel surface material on top.
    SingleSurface { buried: String, surface: String },
    /// Every catalog material applied in order, per its fill kind.
    Layered,
}

impl Default for FillStrategy {
    fn default() -> Self {
        FillStrategy::SingleSurface {
            buried: "dirt".into(),
            surface: "grass".into(),
        }
    }
}

/// Streaming configuration loaded from `streaming.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Depth of the view cone in world units.
    pub view_distance: i32,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    /// Size of the generation worker pool.
    pub generation_threads: usize,
    /// Maximum reserved-but-unfinished chunks before admission blocks.
    pub max_pending: usize,
    /// World extent in chunks (x, y, z); coordinates outside are dropped.
    pub world_chunks: [i32; 3],
    /// Chunks whose base y lies above this are emitted empty without sampling.
    pub max_elevation: Option<i32>,
    pub collapse: CollapseMode,
    pub fill: FillStrategy,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            view_distance: DEFAULT_VIEW_DISTANCE,
            fov_degrees: DEFAULT_FOV_DEGREES,
            generation_threads: DEFAULT_GENERATION_THREADS,
            max_pending: DEFAULT_MAX_PENDING,
            world_chunks: DEFAULT_WORLD_CHUNKS,
            max_elevation: None,
            collapse: CollapseMode::default(),
            fill: FillStrategy::default(),
        }
    }
}

impl StreamingConfig {
    pub fn world_chunks(&self) -> IVec3 {
        IVec3::from_array(self.world_chunks)
    }
}
