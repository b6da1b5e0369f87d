pub mod chunk;
pub mod chunk_map;
pub mod dispatch;
pub mod filler;
pub mod planner;
pub mod rle;
pub mod state_machine;
pub mod stats;
pub mod streaming;
pub mod terrain;
pub mod viewpoint;

use std::sync::Arc;

use chunk_map::ChunkMap;
use dispatch::MeshSink;
use filler::ChunkFiller;
use streaming::Foreman;
use terra_core::config::StreamingConfig;
use terra_core::error::TerraError;
use terra_core::material::MaterialCatalog;
use terrain::HeightField;
use viewpoint::{ViewTransform, ViewpointTracker};

pub use chunk::{Chunk, FaceMasks};
pub use rle::Run;
pub use state_machine::SchedulerState;
pub use stats::StatsSnapshot;

/// Primary public struct for the terra-world crate.
/// Wires a chunk store, a scheduler and the viewpoint that drives it.
pub struct World {
    chunk_map: Arc<ChunkMap>,
    foreman: Foreman,
    viewpoint: ViewpointTracker,
}

impl World {
    /// Build the pipeline from a validated config and catalog. Threads start
    /// immediately but stay idle until [`World::attach`].
    pub fn new(
        config: &StreamingConfig,
        catalog: &MaterialCatalog,
        field: Arc<dyn HeightField>,
        mesher: Arc<dyn MeshSink>,
    ) -> Result<Self, TerraError> {
        let filler = ChunkFiller::from_config(config, catalog)?;
        let chunk_map = Arc::new(ChunkMap::new(config.world_chunks()));
        let foreman = Foreman::new(config, chunk_map.clone(), field, filler, mesher)?;
        Ok(Self {
            chunk_map,
            foreman,
            viewpoint: ViewpointTracker::default(),
        })
    }

    /// Place the viewpoint at `transform` and start streaming around it.
    /// The transform replaces any moves made beforehand. Only the first call
    /// has any effect.
    pub fn attach(&mut self, transform: ViewTransform) -> bool {
        if self.viewpoint.is_attached() {
            return false;
        }
        self.viewpoint.set_transform(transform);
        self.viewpoint.attach(self.foreman.handle())
    }

    /// Start streaming from wherever the viewpoint currently is.
    pub fn attach_here(&mut self) -> bool {
        let transform = self.viewpoint.transform();
        self.attach(transform)
    }

    /// The viewpoint; its mutators replan the scheduler once attached.
    pub fn viewpoint(&mut self) -> &mut ViewpointTracker {
        &mut self.viewpoint
    }

    pub fn chunk_map(&self) -> &ChunkMap {
        &self.chunk_map
    }

    pub fn foreman(&self) -> &Foreman {
        &self.foreman
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.foreman.stats()
    }

    /// Stop the scheduler and wait for its threads.
    pub fn shutdown(&self) {
        self.foreman.join();
    }
}
