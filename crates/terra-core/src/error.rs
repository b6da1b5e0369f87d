use thiserror::Error;

/// Errors raised while setting up the streaming pipeline. These are
/// configuration failures: nothing here is retried.
#[derive(Debug, Error)]
pub enum TerraError {
    #[error("material '{0}' not found in catalog")]
    MissingMaterial(String),

    #[error("invalid streaming config: {0}")]
    InvalidConfig(String),

    #[error("failed to spawn {name} thread: {source}")]
    ThreadSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
