use terra_core::config::StreamingConfig;
use terra_core::material::{MaterialCatalog, MaterialDef};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to parse materials RON: {0}")]
    MaterialParseError(String),
    #[error("Failed to parse streaming config RON: {0}")]
    ConfigParseError(String),
}

/// Parse a single materials RON string into a MaterialCatalog.
pub fn load_materials_from_str(ron_str: &str) -> Result<MaterialCatalog, LoadError> {
    let options = ron::Options::default();
    let materials: Vec<MaterialDef> = options
        .from_str(ron_str)
        .map_err(|e| LoadError::MaterialParseError(e.to_string()))?;
    Ok(MaterialCatalog::new(materials))
}

/// Load and merge multiple material sources into a single catalog,
/// preserving source order.
pub fn load_all_materials(sources: &[&str]) -> Result<MaterialCatalog, LoadError> {
    let mut all_materials = Vec::new();
    for source in sources {
        let catalog = load_materials_from_str(source)?;
        all_materials.extend(catalog.materials);
    }
    log::debug!(
        "loaded {} materials from {} sources",
        all_materials.len(),
        sources.len()
    );
    Ok(MaterialCatalog::new(all_materials))
}

/// Parse a streaming config. Missing fields take their defaults.
pub fn load_streaming_config(ron_str: &str) -> Result<StreamingConfig, LoadError> {
    let options = ron::Options::default();
    options
        .from_str(ron_str)
        .map_err(|e| LoadError::ConfigParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_core::config::{CollapseMode, FillStrategy};
    use terra_core::material::FillKind;
    use terra_core::types::MaterialId;

    #[test]
    fn test_load_single_material() {
        let ron = r#"[
            (
                id: 3,
                name: "grass",
                fill: Surface,
            ),
        ]"#;
        let catalog = load_materials_from_str(ron).expect("should parse");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.materials[0].name, "grass");
        assert_eq!(catalog.materials[0].fill, FillKind::Surface);
        assert_eq!(catalog.materials[0].max_depth, None);
    }

    #[test]
    fn test_fill_defaults_to_volumetric() {
        let ron = r#"[(id: 1, name: "stone")]"#;
        let catalog = load_materials_from_str(ron).expect("should parse");
        assert_eq!(catalog.materials[0].fill, FillKind::Volumetric);
    }

    #[test]
    fn test_malformed_ron_rejected() {
        let ron = r#"[this is not valid RON {"#;
        let result = load_materials_from_str(ron);
        assert!(matches!(result, Err(LoadError::MaterialParseError(_))));
    }

    #[test]
    fn test_load_all_merges_in_order() {
        let src1 = r#"[(id: 1, name: "stone")]"#;
        let src2 = r#"[(id: 2, name: "dirt", max_depth: Some(3)), (id: 3, name: "grass", fill: Surface)]"#;
        let catalog = load_all_materials(&[src1, src2]).expect("should merge");
        assert_eq!(catalog.len(), 3);
        let names: Vec<&str> = catalog.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["stone", "dirt", "grass"]);
        assert_eq!(
            catalog.get(MaterialId(2)).and_then(|m| m.max_depth),
            Some(3)
        );
    }

    #[test]
    fn test_shipped_materials_load() {
        let ron = include_str!("../../../data/materials.ron");
        let catalog = load_materials_from_str(ron).expect("should load");
        assert!(catalog.select_by_name("dirt").is_some());
        assert!(catalog.select_by_name("grass").is_some_and(|m| m.is_surface()));
    }

    #[test]
    fn test_shipped_config_loads() {
        let ron = include_str!("../../../data/streaming.ron");
        let config = load_streaming_config(ron).expect("should load");
        assert_eq!(config.world_chunks, [256, 32, 256]);
        assert_eq!(config.max_elevation, Some(160));
        assert_eq!(config.collapse, CollapseMode::Exact);
        assert!(matches!(config.fill, FillStrategy::SingleSurface { .. }));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = load_streaming_config("(view_distance: 64, fill: Layered)")
            .expect("should parse");
        assert_eq!(config.view_distance, 64);
        assert_eq!(config.fill, FillStrategy::Layered);
        assert_eq!(config.generation_threads, StreamingConfig::default().generation_threads);
    }

    #[test]
    fn test_malformed_config_rejected() {
        let result = load_streaming_config("(view_distance: \"far\")");
        assert!(matches!(result, Err(LoadError::ConfigParseError(_))));
    }
}
