pub mod config;
pub mod constants;
pub mod direction;
pub mod error;
pub mod material;
pub mod math;
pub mod types;

pub use config::{CollapseMode, FillStrategy, StreamingConfig};
pub use error::TerraError;
pub use material::{FillKind, MaterialCatalog, MaterialDef};
pub use types::{ChunkCoord, MaterialId, WorldCoord};
