//! Scene-wide image based lighting settings

use serde::{Deserialize, Serialize};

/// Environment lighting of a scene
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    /// Multiplier applied to the environment texture contribution
    pub intensity: f32,
    pub texture: Option<EnvironmentTexture>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            texture: None,
        }
    }
}

/// Reference to an environment texture on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentTexture {
    /// Path of the texture relative to the project directory
    pub name: String,
    /// Resolved location; written equal to `name`, rebuilt from the
    /// project directory when a scene is loaded.
    pub url: String,
    #[serde(default = "default_level")]
    pub level: f32,
    /// Cube map (true) or equirectangular 2D texture (false)
    #[serde(default)]
    pub is_cube: bool,
}

fn default_level() -> f32 {
    1.0
}

impl Environment {
    pub fn is_finite(&self) -> bool {
        self.intensity.is_finite() && self.texture.as_ref().map_or(true, |t| t.level.is_finite())
    }
}

impl EnvironmentTexture {
    /// Create a cube texture reference from a project-relative path
    pub fn cube(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            url: name.clone(),
            name,
            level: 1.0,
            is_cube: true,
        }
    }
}
