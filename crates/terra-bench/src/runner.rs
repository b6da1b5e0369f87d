use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glam::{Mat3, Vec3};
use terra_core::config::StreamingConfig;
use terra_core::error::TerraError;
use terra_core::material::MaterialCatalog;
use terra_world::dispatch::ChannelMeshSink;
use terra_world::terrain::{HeightField, NoiseHeightField};
use terra_world::viewpoint::ViewTransform;
use terra_world::{StatsSnapshot, World};

use crate::scenes::{Movement, SceneConfig};

/// Longest a single settle may take before the step is recorded as timed out.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Capacity of the mesh hand-off queue drained by the bench.
const MESH_QUEUE: usize = 4096;

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub iterations: u32,
    /// Settle measurements per iteration.
    pub steps: u32,
    /// Chunks placed in the last iteration.
    pub chunks_placed: u64,
    /// Chunks the mesh consumer received in the last iteration.
    pub chunks_meshed: u64,
    pub timed_out_steps: u32,
    /// Time from a viewpoint change until the scheduler settles.
    pub timings: TimingSeries,
    /// Scheduler counters of the last iteration.
    pub stats: StatsSnapshot,
}

/// Streams scripted scenes through a fresh [`World`] per iteration.
pub struct BenchmarkRunner {
    config: StreamingConfig,
    catalog: MaterialCatalog,
    iterations: u32,
}

impl BenchmarkRunner {
    pub fn new(config: StreamingConfig, catalog: MaterialCatalog, iterations: u32) -> Self {
        Self {
            config,
            catalog,
            iterations: iterations.max(1),
        }
    }

    /// Run a single benchmark scene and return timing results.
    pub fn run_scene(&self, scene: &SceneConfig) -> Result<BenchmarkResult, TerraError> {
        log::info!(
            "Running scene '{}' ({} steps x {} iterations)...",
            scene.name,
            scene.step_count(),
            self.iterations
        );

        let mut settle_times = Vec::with_capacity(scene.step_count() * self.iterations as usize);
        let mut timed_out_steps = 0u32;
        let mut last = IterationOutcome::default();

        for _ in 0..self.iterations {
            last = self.run_iteration(scene, &mut settle_times)?;
            timed_out_steps += last.timed_out;
        }

        let timings = compute_timings(&settle_times);
        log::info!(
            "  Done: {} chunks, mean={:.2}ms, p95={:.2}ms, p99={:.2}ms",
            last.stats.placed,
            timings.mean_ms,
            timings.p95_ms,
            timings.p99_ms
        );

        Ok(BenchmarkResult {
            scene_name: scene.name.to_string(),
            iterations: self.iterations,
            steps: scene.step_count() as u32,
            chunks_placed: last.stats.placed,
            chunks_meshed: last.meshed,
            timed_out_steps,
            timings,
            stats: last.stats,
        })
    }

    fn run_iteration(
        &self,
        scene: &SceneConfig,
        settle_times: &mut Vec<f64>,
    ) -> Result<IterationOutcome, TerraError> {
        let (sink, meshes) = ChannelMeshSink::new(MESH_QUEUE);
        // Stands in for the mesh builder: drains until the world drops the sink.
        let consumer = thread::Builder::new()
            .name("bench-mesh-consumer".into())
            .spawn(move || meshes.iter().count() as u64)
            .map_err(|source| TerraError::ThreadSpawn {
                name: "bench-mesh-consumer".into(),
                source,
            })?;

        let field: Arc<dyn HeightField> = Arc::new(NoiseHeightField::new(scene.seed));
        let mut world = World::new(&self.config, &self.catalog, field, Arc::new(sink))?;
        let mut timed_out = 0u32;

        let start = Instant::now();
        world.attach(ViewTransform::at(Vec3::from_array(scene.start)));
        timed_out += record_settle(&world, start, settle_times);

        for movement in &scene.movements {
            let start = Instant::now();
            match *movement {
                Movement::Translate(delta) => world.viewpoint().move_by(Vec3::from_array(delta)),
                Movement::Turn(radians) => world.viewpoint().rotate(Mat3::from_rotation_y(radians)),
            }
            timed_out += record_settle(&world, start, settle_times);
        }

        let stats = world.stats();
        world.shutdown();
        drop(world);
        let meshed = consumer.join().unwrap_or_else(|_| {
            log::warn!("mesh consumer panicked");
            0
        });

        Ok(IterationOutcome {
            stats,
            meshed,
            timed_out,
        })
    }
}

#[derive(Default)]
struct IterationOutcome {
    stats: StatsSnapshot,
    meshed: u64,
    timed_out: u32,
}

/// Wait for the world to settle and push the elapsed time. Returns 1 on timeout.
fn record_settle(world: &World, start: Instant, settle_times: &mut Vec<f64>) -> u32 {
    let settled = world.foreman().wait_settled(SETTLE_TIMEOUT);
    settle_times.push(start.elapsed().as_secs_f64() * 1000.0);
    if settled {
        0
    } else {
        log::warn!("  scheduler did not settle within {SETTLE_TIMEOUT:?}");
        1
    }
}

/// Compute timing statistics from a list of settle times in milliseconds.
pub fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}
