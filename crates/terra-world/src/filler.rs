//! Elevation to voxel conversion.
//!
//! [`ChunkFiller`] turns one elevation sample per `(x, z)` column into the
//! run sequence of a chunk. Columns are visited `z` outer, `x` inner, and each
//! column is laid out bottom to top, which is exactly the flattening order
//! (`y + x·S + z·S²`), so single-surface mode appends runs directly without a
//! dense buffer.

use log::trace;
use terra_core::config::{CollapseMode, FillStrategy, StreamingConfig};
use terra_core::constants::{CHUNK_SIZE1D, CHUNK_SIZE3D};
use terra_core::error::TerraError;
use terra_core::material::{FillKind, MaterialCatalog, MaterialDef};
use terra_core::math::voxel_index;
use terra_core::types::{MaterialId, WorldCoord};

use crate::chunk::Chunk;
use crate::rle::RunEncoder;
use crate::terrain::HeightField;

const S: i32 = CHUNK_SIZE1D as i32;

/// Materials resolved for one filler mode.
#[derive(Debug, Clone, PartialEq)]
pub enum FillMode {
    /// Buried material topped by a one-voxel surface material.
    SingleSurface {
        buried: MaterialId,
        surface: MaterialId,
    },
    /// Catalog materials applied in order; later entries win.
    Layered { layers: Vec<MaterialDef> },
}

#[derive(Debug, Clone)]
pub struct ChunkFiller {
    mode: FillMode,
    collapse: CollapseMode,
    max_elevation: Option<i32>,
}

impl ChunkFiller {
    pub fn single_surface(buried: MaterialId, surface: MaterialId) -> Self {
        Self {
            mode: FillMode::SingleSurface { buried, surface },
            collapse: CollapseMode::default(),
            max_elevation: None,
        }
    }

    pub fn layered(catalog: &MaterialCatalog) -> Self {
        Self {
            mode: FillMode::Layered {
                layers: catalog.iter().cloned().collect(),
            },
            collapse: CollapseMode::default(),
            max_elevation: None,
        }
    }

    pub fn with_collapse(mut self, collapse: CollapseMode) -> Self {
        self.collapse = collapse;
        self
    }

    /// Chunks whose base `y` lies above `max_elevation` skip sampling entirely.
    pub fn with_max_elevation(mut self, max_elevation: Option<i32>) -> Self {
        self.max_elevation = max_elevation;
        self
    }

    /// Resolve the configured strategy against the catalog. Runs once at
    /// setup; a missing material is a configuration error.
    pub fn from_config(
        config: &StreamingConfig,
        catalog: &MaterialCatalog,
    ) -> Result<Self, TerraError> {
        let filler = match &config.fill {
            FillStrategy::SingleSurface { buried, surface } => {
                let lookup = |name: &str| {
                    catalog
                        .select_by_name(name)
                        .map(MaterialDef::material_id)
                        .ok_or_else(|| TerraError::MissingMaterial(name.to_string()))
                };
                Self::single_surface(lookup(buried)?, lookup(surface)?)
            }
            FillStrategy::Layered => {
                if catalog.is_empty() {
                    return Err(TerraError::InvalidConfig(
                        "layered fill needs at least one material".into(),
                    ));
                }
                Self::layered(catalog)
            }
        };
        Ok(filler
            .with_collapse(config.collapse)
            .with_max_elevation(config.max_elevation))
    }

    pub fn mode(&self) -> &FillMode {
        &self.mode
    }

    pub fn collapse(&self) -> CollapseMode {
        self.collapse
    }

    /// Build the chunk whose minimum corner is `origin` (world voxels).
    pub fn fill(&self, origin: WorldCoord, field: &dyn HeightField) -> Chunk {
        if let Some(max) = self.max_elevation {
            if origin.y > max {
                return Chunk::empty(origin);
            }
        }
        match &self.mode {
            FillMode::SingleSurface { buried, surface } => {
                self.fill_single_surface(origin, field, *buried, *surface)
            }
            FillMode::Layered { layers } => fill_layered(origin, field, layers),
        }
    }

    fn fill_single_surface(
        &self,
        origin: WorldCoord,
        field: &dyn HeightField,
        buried: MaterialId,
        surface: MaterialId,
    ) -> Chunk {
        let chunk_layer = origin.y.div_euclid(S);
        let mut encoder = RunEncoder::with_capacity(CHUNK_SIZE1D as usize * 3);
        let mut crossed = false;
        let mut any_buried = false;

        for lz in 0..S {
            for lx in 0..S {
                let e = column_elevation(field, origin.x + lx, origin.z + lz);
                let layer = e.div_euclid(S);
                if layer == chunk_layer {
                    let depth = e.rem_euclid(S) as u32;
                    encoder.push(buried, depth);
                    encoder.push(surface, 1);
                    encoder.push(MaterialId::AIR, CHUNK_SIZE1D - depth - 1);
                    crossed = true;
                } else if layer > chunk_layer {
                    encoder.push(buried, CHUNK_SIZE1D);
                    any_buried = true;
                } else {
                    encoder.push(MaterialId::AIR, CHUNK_SIZE1D);
                }
            }
        }
        debug_assert_eq!(encoder.total_length(), CHUNK_SIZE3D);

        if crossed {
            return Chunk::from_runs(origin, encoder.finish(), 3, true);
        }
        match self.collapse {
            CollapseMode::Uniform => {
                let value = if any_buried { buried } else { MaterialId::AIR };
                Chunk::uniform(origin, value)
            }
            CollapseMode::Exact => {
                let runs = encoder.finish();
                if let [only] = runs.as_slice() {
                    Chunk::uniform(origin, only.value)
                } else {
                    trace!("chunk at {origin} mixes buried and air columns");
                    Chunk::from_runs(origin, runs, 2, false)
                }
            }
        }
    }
}

fn fill_layered(origin: WorldCoord, field: &dyn HeightField, layers: &[MaterialDef]) -> Chunk {
    let mut voxels = vec![MaterialId::AIR; CHUNK_SIZE3D as usize];
    let top = origin.y + S;

    for lz in 0..S {
        for lx in 0..S {
            let e = column_elevation(field, origin.x + lx, origin.z + lz);
            for def in layers {
                // World y range [lo, hi) this material occupies in the column.
                let (lo, hi) = match def.fill {
                    FillKind::Volumetric => {
                        let lo = def
                            .max_depth
                            .map_or(i32::MIN, |d| e.saturating_sub(d as i32));
                        (lo, e)
                    }
                    FillKind::Surface => (e, e.saturating_add(1)),
                };
                let lo = lo.max(origin.y);
                let hi = hi.min(top);
                for wy in lo..hi {
                    let idx = voxel_index(lx as u32, (wy - origin.y) as u32, lz as u32);
                    voxels[idx] = def.material_id();
                }
            }
        }
    }

    Chunk::from_dense(origin, &voxels)
}

/// Elevation sample snapped down to the voxel that holds the surface.
fn column_elevation(field: &dyn HeightField, x: i32, z: i32) -> i32 {
    field.elevation(x, z).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rle;
    use glam::IVec3;
    use terra_core::direction::Face;

    const DIRT: MaterialId = MaterialId(2);
    const GRASS: MaterialId = MaterialId(3);
    const STONE: MaterialId = MaterialId(1);

    fn dirt_grass() -> ChunkFiller {
        ChunkFiller::single_surface(DIRT, GRASS)
    }

    fn def(id: u16, name: &str, fill: FillKind, max_depth: Option<u32>) -> MaterialDef {
        MaterialDef {
            id,
            name: name.into(),
            fill,
            max_depth,
        }
    }

    #[test]
    fn test_below_everywhere_is_single_air_run() {
        let field = |_x: i32, _z: i32| 3.0;
        let chunk = dirt_grass().fill(IVec3::new(0, 16, 0), &field);
        assert_eq!(chunk.runs, vec![rle::Run::new(MaterialId::AIR, CHUNK_SIZE3D)]);
        assert!(chunk.is_empty);
        assert!(!chunk.is_surface);
        assert_eq!(chunk.materials, 1);
        assert!(chunk.borders().is_none());
    }

    #[test]
    fn test_crossing_at_single_column() {
        let field = |x: i32, z: i32| if x == 0 && z == 0 { 10.0 } else { 0.0 };
        let chunk = dirt_grass().fill(IVec3::new(0, 8, 0), &field);
        assert!(chunk.is_surface);
        assert!(!chunk.is_empty);
        assert_eq!(chunk.materials, 3);
        assert_eq!(rle::total_length(&chunk.runs), CHUNK_SIZE3D);
        assert_eq!(
            chunk.runs,
            vec![
                rle::Run::new(DIRT, 2),
                rle::Run::new(GRASS, 1),
                rle::Run::new(MaterialId::AIR, CHUNK_SIZE3D - 3),
            ]
        );
        let masks = chunk.borders().expect("surface chunk has masks");
        assert!(masks.is_occupied(Face::NegX, 2, 0));
        assert!(masks.is_occupied(Face::NegY, 0, 0));
    }

    #[test]
    fn test_fully_buried_chunk_is_solid() {
        let field = |_x: i32, _z: i32| 200.0;
        let chunk = dirt_grass().fill(IVec3::new(8, 0, 8), &field);
        assert!(chunk.is_solid && !chunk.is_empty);
        assert_eq!(chunk.runs, vec![rle::Run::new(DIRT, CHUNK_SIZE3D)]);
    }

    #[test]
    fn test_surface_at_layer_boundary_has_no_buried_run() {
        // Elevation 8 puts the grass voxel at local y = 0 of the chunk at y = 8.
        let field = |_x: i32, _z: i32| 8.0;
        let chunk = dirt_grass().fill(IVec3::new(0, 8, 0), &field);
        assert!(rle::is_canonical(&chunk.runs));
        assert_eq!(chunk.runs[0], rle::Run::new(GRASS, 1));
        assert_eq!(chunk.material_at(3, 0, 3), GRASS);
        assert_eq!(chunk.material_at(3, 1, 3), MaterialId::AIR);
    }

    #[test]
    fn test_negative_elevation() {
        let field = |_x: i32, _z: i32| -3.0;
        let chunk = dirt_grass().fill(IVec3::new(0, -8, 0), &field);
        assert!(chunk.is_surface);
        assert_eq!(chunk.material_at(0, 4, 0), DIRT);
        assert_eq!(chunk.material_at(0, 5, 0), GRASS);
        assert_eq!(chunk.material_at(7, 6, 7), MaterialId::AIR);
    }

    #[test]
    fn test_steep_slope_without_crossing() {
        // Half the columns buried, half open air, none crossing the chunk.
        let field = |x: i32, _z: i32| if x < 4 { 100.0 } else { -100.0 };
        let origin = IVec3::new(0, 8, 0);

        let exact = dirt_grass().fill(origin, &field);
        assert!(!exact.is_solid && !exact.is_empty && !exact.is_surface);
        assert_eq!(exact.materials, 2);
        assert_eq!(exact.material_at(2, 5, 6), DIRT);
        assert_eq!(exact.material_at(6, 5, 6), MaterialId::AIR);
        let masks = exact.borders().expect("mixed chunk has masks");
        assert!(masks.is_face_full(Face::NegX));
        assert_eq!(masks.occupied_count(Face::PosX), 0);

        let approx = dirt_grass()
            .with_collapse(CollapseMode::Uniform)
            .fill(origin, &field);
        assert_eq!(approx.runs, vec![rle::Run::new(DIRT, CHUNK_SIZE3D)]);
        assert_eq!(approx.materials, 1);
    }

    #[test]
    fn test_max_elevation_skips_sampling() {
        let field = |_x: i32, _z: i32| -> f64 { panic!("field sampled above max elevation") };
        let filler = dirt_grass().with_max_elevation(Some(64));
        let chunk = filler.fill(IVec3::new(0, 72, 0), &field);
        assert!(chunk.is_empty && chunk.is_solid);
    }

    #[test]
    fn test_layered_stack() {
        let catalog = MaterialCatalog::new(vec![
            def(1, "stone", FillKind::Volumetric, None),
            def(2, "dirt", FillKind::Volumetric, Some(2)),
            def(3, "grass", FillKind::Surface, None),
        ]);
        let field = |_x: i32, _z: i32| 4.5;
        let chunk = ChunkFiller::layered(&catalog).fill(IVec3::ZERO, &field);

        assert!(chunk.is_surface && !chunk.is_solid);
        assert_eq!(chunk.materials, 4);
        assert_eq!(chunk.material_at(1, 1, 1), STONE);
        assert_eq!(chunk.material_at(1, 2, 1), DIRT);
        assert_eq!(chunk.material_at(1, 3, 1), DIRT);
        assert_eq!(chunk.material_at(1, 4, 1), GRASS);
        assert_eq!(chunk.material_at(1, 5, 1), MaterialId::AIR);

        let masks = chunk.borders().expect("layered surface chunk has masks");
        assert!(masks.is_face_full(Face::NegY));
        assert_eq!(masks.occupied_count(Face::PosY), 0);
        // Five filled voxels per column on each side face.
        assert_eq!(masks.occupied_count(Face::PosZ), 5 * CHUNK_SIZE1D as usize);

        // Every column reads stone, stone, dirt, dirt, grass, then air.
        let air = MaterialId::AIR;
        let column = [STONE, STONE, DIRT, DIRT, GRASS, air, air, air];
        let expected: Vec<MaterialId> = (0..CHUNK_SIZE3D as usize)
            .map(|i| column[i % CHUNK_SIZE1D as usize])
            .collect();
        assert_eq!(rle::decode(&chunk.runs), expected);
        assert_eq!(chunk.runs.len(), 4 * (CHUNK_SIZE1D * CHUNK_SIZE1D) as usize);
    }

    #[test]
    fn test_layered_later_entries_win() {
        let catalog = MaterialCatalog::new(vec![
            def(1, "stone", FillKind::Volumetric, None),
            def(4, "sand", FillKind::Volumetric, None),
        ]);
        let field = |_x: i32, _z: i32| 500.0;
        let chunk = ChunkFiller::layered(&catalog).fill(IVec3::ZERO, &field);
        assert!(chunk.is_solid && !chunk.is_empty);
        assert_eq!(chunk.runs, vec![rle::Run::new(MaterialId(4), CHUNK_SIZE3D)]);
    }

    #[test]
    fn test_layered_above_surface_is_empty() {
        let catalog = MaterialCatalog::new(vec![def(1, "stone", FillKind::Volumetric, None)]);
        let field = |_x: i32, _z: i32| 2.0;
        let chunk = ChunkFiller::layered(&catalog).fill(IVec3::new(0, 8, 0), &field);
        assert!(chunk.is_empty && chunk.is_solid);
    }

    #[test]
    fn test_from_config_resolves_names() {
        let catalog = MaterialCatalog::new(vec![
            def(2, "Dirt", FillKind::Volumetric, None),
            def(3, "Grass", FillKind::Surface, None),
        ]);
        let config = StreamingConfig {
            max_elevation: Some(128),
            ..Default::default()
        };
        let filler = ChunkFiller::from_config(&config, &catalog).expect("names resolve");
        assert_eq!(
            filler.mode(),
            &FillMode::SingleSurface {
                buried: DIRT,
                surface: GRASS
            }
        );
        assert_eq!(filler.collapse(), CollapseMode::Exact);
    }

    #[test]
    fn test_from_config_missing_material() {
        let catalog = MaterialCatalog::new(vec![def(2, "dirt", FillKind::Volumetric, None)]);
        let err = ChunkFiller::from_config(&StreamingConfig::default(), &catalog)
            .expect_err("grass is missing");
        assert!(matches!(err, TerraError::MissingMaterial(name) if name == "grass"));
    }
}
