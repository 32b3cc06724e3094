//! Scene-level geometry and material storage

use crate::graphics::{Geometry, Material};
use std::collections::BTreeMap;
use tracing::debug;

/// Geometries and materials shared by the meshes of a scene, keyed by id
#[derive(Debug, Default)]
pub struct SceneAssets {
    geometries: BTreeMap<String, Geometry>,
    materials: BTreeMap<String, Material>,
}

impl SceneAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a geometry
    pub fn insert_geometry(&mut self, geometry: Geometry) {
        debug!(geometry_id = %geometry.id, vertices = geometry.vertices.len(), "Registered geometry");
        self.geometries.insert(geometry.id.clone(), geometry);
    }

    pub fn geometry(&self, id: &str) -> Option<&Geometry> {
        self.geometries.get(id)
    }

    pub fn geometry_mut(&mut self, id: &str) -> Option<&mut Geometry> {
        self.geometries.get_mut(id)
    }

    pub fn remove_geometry(&mut self, id: &str) -> Option<Geometry> {
        self.geometries.remove(id)
    }

    pub fn geometries(&self) -> impl Iterator<Item = &Geometry> {
        self.geometries.values()
    }

    /// Insert a material unless one with the same id already exists.
    ///
    /// Returns `true` when the material was added.
    pub fn insert_material(&mut self, material: Material) -> bool {
        if self.materials.contains_key(&material.id) {
            return false;
        }
        debug!(material_id = %material.id, "Registered material");
        self.materials.insert(material.id.clone(), material);
        true
    }

    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    pub fn clear(&mut self) {
        self.geometries.clear();
        self.materials.clear();
    }
}
