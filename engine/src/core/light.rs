//! Light and shadow generator components
//!
//! Lights are positioned by their [`Transform`](crate::core::entity::Transform);
//! direction-based kinds carry their own direction vector. A light may own a
//! [`ShadowGenerator`], which is persisted as its own entity file and linked
//! back to the light through the light's stable id.

use glam::Vec3;
use hecs::Entity;
use serde::{Deserialize, Serialize};

/// Light component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Light {
    pub kind: LightKind,
    pub intensity: f32,
    /// Diffuse color (RGB)
    pub diffuse: [f32; 3],
    /// Specular color (RGB)
    pub specular: [f32; 3],
    pub range: f32,
    pub enabled: bool,
}

/// Supported light types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LightKind {
    Point,
    Directional {
        direction: Vec3,
    },
    #[serde(rename_all = "camelCase")]
    Spot {
        direction: Vec3,
        angle: f32,
        exponent: f32,
    },
    #[serde(rename_all = "camelCase")]
    Hemispheric {
        direction: Vec3,
        ground_color: [f32; 3],
    },
}

impl Default for Light {
    fn default() -> Self {
        Self::point()
    }
}

impl Light {
    fn with_kind(kind: LightKind) -> Self {
        Self {
            kind,
            intensity: 1.0,
            diffuse: [1.0, 1.0, 1.0],
            specular: [1.0, 1.0, 1.0],
            range: f32::MAX,
            enabled: true,
        }
    }

    /// Omnidirectional light emitting from the entity position
    pub fn point() -> Self {
        Self::with_kind(LightKind::Point)
    }

    /// Infinitely distant light shining along `direction`
    pub fn directional(direction: Vec3) -> Self {
        Self::with_kind(LightKind::Directional { direction })
    }

    /// Cone light
    pub fn spot(direction: Vec3, angle: f32, exponent: f32) -> Self {
        Self::with_kind(LightKind::Spot {
            direction,
            angle,
            exponent,
        })
    }

    /// Ambient sky/ground light
    pub fn hemispheric(direction: Vec3) -> Self {
        Self::with_kind(LightKind::Hemispheric {
            direction,
            ground_color: [0.0, 0.0, 0.0],
        })
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Whether every numeric field, including the kind's, is finite
    pub fn is_finite(&self) -> bool {
        let kind_finite = match self.kind {
            LightKind::Point => true,
            LightKind::Directional { direction } => direction.is_finite(),
            LightKind::Spot {
                direction,
                angle,
                exponent,
            } => direction.is_finite() && angle.is_finite() && exponent.is_finite(),
            LightKind::Hemispheric { direction, ground_color } => {
                direction.is_finite() && ground_color.iter().all(|c| c.is_finite())
            }
        };
        kind_finite
            && self.intensity.is_finite()
            && self.range.is_finite()
            && self.diffuse.iter().chain(&self.specular).all(|c| c.is_finite())
    }

    /// Whether this light type can cast shadows
    pub fn supports_shadows(&self) -> bool {
        !matches!(self.kind, LightKind::Hemispheric { .. })
    }
}

/// Shadow-map settings shared by the live component and its descriptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowSettings {
    #[serde(flatten)]
    pub kind: ShadowGeneratorKind,
    pub map_size: u32,
    pub bias: f32,
    pub normal_bias: f32,
    pub darkness: f32,
}

impl ShadowSettings {
    pub fn is_finite(&self) -> bool {
        let lambda_finite = match self.kind {
            ShadowGeneratorKind::Standard => true,
            ShadowGeneratorKind::Cascaded { lambda, .. } => lambda.is_finite(),
        };
        lambda_finite && self.bias.is_finite() && self.normal_bias.is_finite() && self.darkness.is_finite()
    }
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            kind: ShadowGeneratorKind::Standard,
            map_size: 1024,
            bias: 0.00005,
            normal_bias: 0.0,
            darkness: 0.0,
        }
    }
}

/// Shadow generator flavors, tagged by class name on disk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "className")]
pub enum ShadowGeneratorKind {
    #[serde(rename = "ShadowGenerator")]
    Standard,
    #[serde(rename = "CascadedShadowGenerator", rename_all = "camelCase")]
    Cascaded { num_cascades: u32, lambda: f32 },
}

/// Shadow generator owned by a light entity
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowGenerator {
    /// Stable id, used as the shadow generator's file name
    pub id: String,
    pub settings: ShadowSettings,
    /// Meshes casting shadows into this generator's map
    pub render_list: Vec<Entity>,
}

impl ShadowGenerator {
    pub fn new(id: impl Into<String>, settings: ShadowSettings) -> Self {
        Self {
            id: id.into(),
            settings,
            render_list: Vec::new(),
        }
    }

    /// Add a caster, ignoring duplicates
    pub fn add_caster(&mut self, mesh: Entity) {
        if !self.render_list.contains(&mesh) {
            self.render_list.push(mesh);
        }
    }

    pub fn remove_caster(&mut self, mesh: Entity) {
        self.render_list.retain(|&e| e != mesh);
    }
}

/// Shadow casters read from a descriptor, keyed by mesh stable id.
///
/// Resolved into [`ShadowGenerator::render_list`] once all meshes are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingRenderList(pub Vec<String>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_kind_json_tag() {
        let light = Light::directional(Vec3::new(0.0, -1.0, 0.0));
        let json = serde_json::to_value(light).unwrap();
        assert_eq!(json["kind"]["type"], "directional");
        assert_eq!(json["kind"]["direction"], serde_json::json!([0.0, -1.0, 0.0]));
    }

    #[test]
    fn test_hemispheric_cannot_cast_shadows() {
        assert!(Light::point().supports_shadows());
        assert!(!Light::hemispheric(Vec3::Y).supports_shadows());
    }

    #[test]
    fn test_shadow_settings_class_name() {
        let settings = ShadowSettings {
            kind: ShadowGeneratorKind::Cascaded {
                num_cascades: 4,
                lambda: 0.5,
            },
            ..Default::default()
        };
        let json = serde_json::to_value(settings).unwrap();
        assert_eq!(json["className"], "CascadedShadowGenerator");
        assert_eq!(json["numCascades"], 4);
        assert_eq!(json["mapSize"], 1024);

        let back: ShadowSettings = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn test_render_list_ignores_duplicates() {
        let mut world = hecs::World::new();
        let mesh = world.spawn(());
        let mut generator = ShadowGenerator::new("shadow", ShadowSettings::default());
        generator.add_caster(mesh);
        generator.add_caster(mesh);
        assert_eq!(generator.render_list, vec![mesh]);

        generator.remove_caster(mesh);
        assert!(generator.render_list.is_empty());
    }
}
