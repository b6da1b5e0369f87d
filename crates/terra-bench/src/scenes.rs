use std::f32::consts::FRAC_PI_2;

use terra_core::config::StreamingConfig;
use terra_core::constants::CHUNK_SIZE1D;

/// One viewpoint change applied between settle measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Movement {
    /// Translate by a world-space delta.
    Translate([f32; 3]),
    /// Turn about the vertical axis, in radians.
    Turn(f32),
}

/// Configuration for a single benchmark scene.
pub struct SceneConfig {
    pub name: &'static str,
    /// Height-field seed.
    pub seed: u64,
    /// Viewpoint origin at attach time.
    pub start: [f32; 3],
    /// Applied in order; each one is timed until the scheduler settles.
    pub movements: Vec<Movement>,
}

impl SceneConfig {
    /// Scheduler settles timed per run: the initial attach plus every movement.
    pub fn step_count(&self) -> usize {
        1 + self.movements.len()
    }
}

/// Return the standard suite of scenes, centred in the configured world.
pub fn standard_scenes(config: &StreamingConfig) -> Vec<SceneConfig> {
    let cs = CHUNK_SIZE1D as f32;
    let [wx, wy, wz] = config.world_chunks;
    let centre = [wx as f32 * cs / 2.0, wy as f32 * cs / 2.0, wz as f32 * cs / 2.0];
    let stride = cs * 2.0;

    vec![
        SceneConfig {
            name: "static",
            seed: 42,
            start: centre,
            movements: Vec::new(),
        },
        SceneConfig {
            name: "walk",
            seed: 42,
            start: centre,
            movements: vec![Movement::Translate([0.0, 0.0, -stride]); 8],
        },
        SceneConfig {
            name: "turn",
            seed: 42,
            start: centre,
            movements: vec![Movement::Turn(FRAC_PI_2); 4],
        },
        SceneConfig {
            name: "fly",
            seed: 7,
            start: centre,
            movements: vec![
                Movement::Translate([stride, cs, -stride]),
                Movement::Turn(FRAC_PI_2 / 2.0),
                Movement::Translate([stride, 0.0, -stride]),
                Movement::Turn(-FRAC_PI_2),
                Movement::Translate([-stride, -cs, -stride]),
            ],
        },
    ]
}
