//! Materials referenced by meshes
//!
//! Materials are scene-level resources keyed by id. A mesh file carries the
//! material its mesh uses, so the same material may appear in several files.

use serde::{Deserialize, Serialize};

/// Surface properties of a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unique_id: u64,
    /// Base color of the material (RGBA)
    pub color: [f32; 4],
    #[serde(default)]
    pub metallic: f32,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
}

fn default_roughness() -> f32 {
    1.0
}

impl Material {
    /// Create a new material with the given color
    pub fn new(id: impl Into<String>, color: [f32; 4]) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            unique_id: 0,
            color,
            metallic: 0.0,
            roughness: 1.0,
        }
    }

    /// Create a material from RGB values (alpha = 1.0)
    pub fn from_rgb(id: impl Into<String>, r: f32, g: f32, b: f32) -> Self {
        Self::new(id, [r, g, b, 1.0])
    }

    /// Uniform gray material
    pub fn gray(id: impl Into<String>, value: f32) -> Self {
        Self::from_rgb(id, value, value, value)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
    pub fn is_finite(&self) -> bool {
        self.metallic.is_finite() && self.roughness.is_finite() && self.color.iter().all(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_from_rgb() {
        let mat = Material::from_rgb("red", 1.0, 0.0, 0.0);
        assert_eq!(mat.color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(mat.name, "red");
    }

    #[test]
    fn test_material_gray() {
        assert_eq!(Material::gray("g", 0.5).color, [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn test_material_defaults_when_fields_missing() {
        let mat: Material = serde_json::from_str(r#"{"id":"m","color":[1,1,1,1]}"#).unwrap();
        assert_eq!(mat.roughness, 1.0);
        assert_eq!(mat.metallic, 0.0);
        assert_eq!(mat.unique_id, 0);
        assert_eq!(mat.name, "");
    }
}
