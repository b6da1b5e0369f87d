use serde::{Deserialize, Serialize};

use crate::types::MaterialId;

/// How a material is laid into a column by the layered filler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillKind {
    /// Every voxel below the column's elevation.
    #[default]
    Volumetric,
    /// Only the single voxel at the column's elevation.
    Surface,
}

/// A single material definition loaded from RON data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    /// Stable material ID. 0 is reserved for air.
    pub id: u16,
    /// Name used for lookups at setup time ("dirt", "grass", ...).
    pub name: String,
    #[serde(default)]
    pub fill: FillKind,
    /// Volumetric materials only: limit the fill to this many voxels below
    /// the surface. None = all the way down.
    #[serde(default)]
    pub max_depth: Option<u32>,
}

impl MaterialDef {
    pub fn material_id(&self) -> MaterialId {
        MaterialId(self.id)
    }

    pub fn is_surface(&self) -> bool {
        self.fill == FillKind::Surface
    }
}

/// Ordered collection of material definitions. Order is significant: the
/// layered filler applies entries front to back and later entries win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialCatalog {
    pub materials: Vec<MaterialDef>,
}

impl MaterialCatalog {
    pub fn new(materials: Vec<MaterialDef>) -> Self {
        Self { materials }
    }

    /// Look up a material by ID. Returns None if not found.
    pub fn get(&self, id: MaterialId) -> Option<&MaterialDef> {
        self.materials.iter().find(|m| m.id == id.0)
    }

    /// Look up a material by name (case-insensitive).
    pub fn select_by_name(&self, name: &str) -> Option<&MaterialDef> {
        self.materials
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Iterate materials in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &MaterialDef> {
        self.materials.iter()
    }

    /// Number of materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
