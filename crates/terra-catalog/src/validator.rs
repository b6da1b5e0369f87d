use std::collections::HashSet;

use terra_core::config::StreamingConfig;
use terra_core::constants::AIR_RAW;
use terra_core::material::{FillKind, MaterialCatalog};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate material ID {0}")]
    DuplicateMaterialId(u16),
    #[error("Duplicate material name '{0}'")]
    DuplicateMaterialName(String),
    #[error("Material '{0}' uses the reserved air ID")]
    ReservedAirId(String),
    #[error("Material ID {0} has an empty name")]
    EmptyName(u16),
    #[error("Surface material '{0}' sets max_depth, which only applies to volumetric fills")]
    DepthOnSurface(String),
    #[error("view_distance must be positive, got {0}")]
    ViewDistance(i32),
    #[error("fov_degrees must lie in (0, 180), got {0}")]
    FieldOfView(f32),
    #[error("generation_threads must be at least 1")]
    NoWorkers,
    #[error("max_pending must be at least 1")]
    NoPendingSlots,
    #[error("world_chunks must be positive on every axis, got {0:?}")]
    WorldExtent([i32; 3]),
}

/// Validate a material catalog before it is handed to a filler.
pub fn validate_materials(catalog: &MaterialCatalog) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen_ids = HashSet::new();
    let mut seen_names = HashSet::new();
    for mat in catalog.iter() {
        if !seen_ids.insert(mat.id) {
            errors.push(ValidationError::DuplicateMaterialId(mat.id));
        }
        if !seen_names.insert(mat.name.to_ascii_lowercase()) {
            errors.push(ValidationError::DuplicateMaterialName(mat.name.clone()));
        }
        if mat.id == AIR_RAW {
            errors.push(ValidationError::ReservedAirId(mat.name.clone()));
        }
        if mat.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName(mat.id));
        }
        if mat.fill == FillKind::Surface && mat.max_depth.is_some() {
            errors.push(ValidationError::DepthOnSurface(mat.name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the streaming parameters the scheduler is built from.
pub fn validate_config(config: &StreamingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.view_distance <= 0 {
        errors.push(ValidationError::ViewDistance(config.view_distance));
    }
    if !(config.fov_degrees > 0.0 && config.fov_degrees < 180.0) {
        errors.push(ValidationError::FieldOfView(config.fov_degrees));
    }
    if config.generation_threads == 0 {
        errors.push(ValidationError::NoWorkers);
    }
    if config.max_pending == 0 {
        errors.push(ValidationError::NoPendingSlots);
    }
    if config.world_chunks.iter().any(|&n| n <= 0) {
        errors.push(ValidationError::WorldExtent(config.world_chunks));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
