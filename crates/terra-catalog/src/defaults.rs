//! Built-in data shipped with the workspace.

use terra_core::config::StreamingConfig;
use terra_core::material::MaterialCatalog;

use crate::loader::{load_materials_from_str, load_streaming_config, LoadError};

/// Buried material of the default single-surface fill.
pub const DIRT: &str = "dirt";
/// Surface material of the default single-surface fill.
pub const GRASS: &str = "grass";

const MATERIALS_RON: &str = include_str!("../../../data/materials.ron");
const STREAMING_RON: &str = include_str!("../../../data/streaming.ron");

/// The shipped material catalog (`data/materials.ron`).
pub fn default_catalog() -> Result<MaterialCatalog, LoadError> {
    load_materials_from_str(MATERIALS_RON)
}

/// The shipped streaming config (`data/streaming.ron`).
pub fn default_config() -> Result<StreamingConfig, LoadError> {
    load_streaming_config(STREAMING_RON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{validate_config, validate_materials};

    #[test]
    fn test_defaults_load_and_validate() {
        let catalog = default_catalog().expect("catalog");
        let config = default_config().expect("config");
        assert!(validate_materials(&catalog).is_ok());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_default_fill_materials_present() {
        let catalog = default_catalog().expect("catalog");
        assert!(catalog.select_by_name(DIRT).is_some());
        assert!(catalog.select_by_name(GRASS).is_some());
    }
}
