//! On-disk descriptor records
//!
//! One JSON file per entity. Descriptors are built fresh from the live world
//! on every save and discarded once a load has rebuilt the entities.

use crate::core::camera::Camera;
use crate::core::entity::{Entity, Transform, World};
use crate::core::environment::{Environment, EnvironmentTexture};
use crate::core::light::{Light, ShadowSettings};
use crate::graphics::{BoundingBox, Geometry, Material, Vertex};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Fields shared by every scene-graph node descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeHeader {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Absent in hand-written files; such a node keeps a fresh id and no parent link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<u64>,
    /// Unique id of the parent node, absent for roots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub transform: Transform,
}

impl NodeHeader {
    /// Snapshot the common fields of a node; `None` when it has no stable id
    pub fn from_entity(world: &World, entity: Entity) -> Option<Self> {
        let id = world.entity_id(entity)?;
        let transform = world.get::<Transform>(entity).map(|t| *t).unwrap_or_default();
        Some(Self {
            id,
            name: world.name(entity),
            unique_id: world.unique_id(entity),
            parent_id: world.parent(entity).and_then(|parent| world.unique_id(parent)),
            transform,
        })
    }
}

/// `nodes/<id>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    #[serde(flatten)]
    pub node: NodeHeader,
}

/// `meshes/<id>.json`: the mesh plus the resources it needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshFile {
    pub meshes: Vec<MeshDescriptor>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub geometries: GeometriesDescriptor,
}

/// A single mesh entry of a [`MeshFile`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshDescriptor {
    #[serde(flatten)]
    pub node: NodeHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_unique_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
    /// Project-relative path of the geometry file to stream in after creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_loading_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box_minimum: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box_maximum: Option<[f32; 3]>,
}

impl MeshDescriptor {
    /// Cached bounds, if both corners were written
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match (self.bounding_box_minimum, self.bounding_box_maximum) {
            (Some(min), Some(max)) => Some(BoundingBox::new(Vec3::from(min), Vec3::from(max))),
            _ => None,
        }
    }
}

/// Inline geometry section of a [`MeshFile`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometriesDescriptor {
    #[serde(default)]
    pub vertex_data: Vec<VertexDataDescriptor>,
}

/// Geometry stored inline in JSON, used when its binary file could not be written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexDataDescriptor {
    pub id: String,
    #[serde(default)]
    pub unique_id: u64,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl From<&Geometry> for VertexDataDescriptor {
    fn from(geometry: &Geometry) -> Self {
        Self {
            id: geometry.id.clone(),
            unique_id: geometry.unique_id,
            vertices: geometry.vertices.clone(),
            indices: geometry.indices.clone(),
        }
    }
}

impl From<VertexDataDescriptor> for Geometry {
    fn from(data: VertexDataDescriptor) -> Self {
        let mut geometry = Geometry::new(data.id, data.vertices, data.indices);
        geometry.unique_id = data.unique_id;
        geometry
    }
}

/// `lights/<id>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightDescriptor {
    #[serde(flatten)]
    pub node: NodeHeader,
    pub light: Light,
}

/// `shadowGenerators/<id>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowGeneratorDescriptor {
    pub id: String,
    /// Stable id of the light owning the generator
    pub light_id: String,
    pub settings: ShadowSettings,
    /// Stable ids of the shadow-casting meshes
    #[serde(default)]
    pub render_list: Vec<String>,
}

/// Camera node as stored in `config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    #[serde(flatten)]
    pub node: NodeHeader,
    pub camera: Camera,
}

/// `config.json`: environment settings and the editor camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneConfig {
    pub environment: EnvironmentDescriptor,
    pub editor_camera: CameraDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentDescriptor {
    pub environment_intensity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_texture: Option<EnvironmentTexture>,
}

impl From<&Environment> for EnvironmentDescriptor {
    fn from(environment: &Environment) -> Self {
        Self {
            environment_intensity: environment.intensity,
            // The url is written as the project-relative name and resolved on load
            environment_texture: environment.texture.as_ref().map(|texture| EnvironmentTexture {
                url: texture.name.clone(),
                ..texture.clone()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::light::ShadowGeneratorKind;
    use serde_json::json;

    fn header() -> NodeHeader {
        NodeHeader {
            id: "node".to_string(),
            name: "Node".to_string(),
            unique_id: Some(7),
            parent_id: None,
            transform: Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
        }
    }

    #[test]
    fn test_header_is_flattened_and_camel_case() {
        let descriptor = NodeDescriptor {
            node: NodeHeader {
                parent_id: Some(3),
                ..header()
            },
        };
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["id"], "node");
        assert_eq!(value["uniqueId"], 7);
        assert_eq!(value["parentId"], 3);
        assert_eq!(value["transform"]["position"], json!([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_root_has_no_parent_field() {
        let value = serde_json::to_value(NodeDescriptor { node: header() }).unwrap();
        assert!(value.get("parentId").is_none());

        let back: NodeDescriptor = serde_json::from_value(value).unwrap();
        assert_eq!(back.node.parent_id, None);
    }

    #[test]
    fn test_mesh_descriptor_fields() {
        let descriptor = MeshDescriptor {
            node: header(),
            geometry_id: Some("geo".to_string()),
            geometry_unique_id: Some(9),
            material_id: None,
            delay_loading_file: Some("scene/geometries/geo.babylonbinarymeshdata".to_string()),
            bounding_box_minimum: Some([-1.0, -1.0, -1.0]),
            bounding_box_maximum: Some([1.0, 1.0, 1.0]),
        };
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["delayLoadingFile"], "scene/geometries/geo.babylonbinarymeshdata");
        assert_eq!(value["boundingBoxMinimum"], json!([-1.0, -1.0, -1.0]));
        assert!(value.get("materialId").is_none());

        let bounds = descriptor.bounding_box().unwrap();
        assert_eq!(bounds.maximum, Vec3::ONE);
    }

    #[test]
    fn test_mesh_file_tolerates_missing_sections() {
        let file: MeshFile = serde_json::from_value(json!({
            "meshes": [{ "id": "m", "uniqueId": 1 }]
        }))
        .unwrap();
        assert!(file.materials.is_empty());
        assert!(file.geometries.vertex_data.is_empty());
        assert_eq!(file.meshes[0].node.transform, Transform::default());
        assert!(file.meshes[0].bounding_box().is_none());
    }

    #[test]
    fn test_shadow_generator_descriptor() {
        let descriptor = ShadowGeneratorDescriptor {
            id: "shadow".to_string(),
            light_id: "sun".to_string(),
            settings: ShadowSettings {
                kind: ShadowGeneratorKind::Cascaded {
                    num_cascades: 4,
                    lambda: 0.5,
                },
                ..Default::default()
            },
            render_list: vec!["a".to_string(), "b".to_string()],
        };
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["lightId"], "sun");
        assert_eq!(value["settings"]["className"], "CascadedShadowGenerator");

        let back: ShadowGeneratorDescriptor = serde_json::from_value(value).unwrap();
        assert_eq!(back, descriptor);
    }

    #[test]
    fn test_environment_texture_url_written_as_name() {
        let environment = Environment {
            intensity: 0.5,
            texture: Some(EnvironmentTexture {
                url: "/abs/project/env/sky.env".to_string(),
                ..EnvironmentTexture::cube("env/sky.env")
            }),
        };
        let descriptor = EnvironmentDescriptor::from(&environment);
        let texture = descriptor.environment_texture.unwrap();
        assert_eq!(texture.url, "env/sky.env");
        assert_eq!(descriptor.environment_intensity, 0.5);
    }
}
