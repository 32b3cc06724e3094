//! Geometry data and the mesh component
//!
//! A [`Geometry`] holds vertex and index data and lives in the scene's
//! geometry library, keyed by its id. Mesh entities reference a geometry by
//! id through their [`MeshRenderer`] component, which also tracks whether a
//! delay-loaded geometry has arrived yet.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Vertex layout stored in geometries and geometry files
///
/// Tightly packed so a vertex slice can be written to disk byte for byte.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],
    /// Surface normal vector (normalized)
    pub normal: [f32; 3],
    /// Texture coordinates (UV mapping)
    pub uv: [f32; 2],
}

impl Vertex {
    /// Create a new vertex with the given attributes
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Axis-aligned bounds of a mesh in local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub minimum: Vec3,
    pub maximum: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            minimum: Vec3::ZERO,
            maximum: Vec3::ZERO,
        }
    }
}

impl BoundingBox {
    pub fn new(minimum: Vec3, maximum: Vec3) -> Self {
        Self { minimum, maximum }
    }

    /// Bounds of a vertex set; empty input yields a zero box
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        let mut positions = vertices.iter().map(|v| Vec3::from(v.position));
        let Some(first) = positions.next() else {
            return Self::default();
        };
        let (minimum, maximum) = positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Self { minimum, maximum }
    }

    pub fn center(&self) -> Vec3 {
        (self.minimum + self.maximum) * 0.5
    }

    pub fn is_finite(&self) -> bool {
        self.minimum.is_finite() && self.maximum.is_finite()
    }
}

/// Vertex and index data of a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Stable id, used as the geometry file name
    pub id: String,
    pub unique_id: u64,
    /// Vertex data for the mesh
    pub vertices: Vec<Vertex>,
    /// Index data for triangle assembly
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Create a new geometry from vertices and indices
    pub fn new(id: impl Into<String>, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            id: id.into(),
            unique_id: 0,
            vertices,
            indices,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    /// Whether every vertex component is a finite number
    pub fn is_finite(&self) -> bool {
        bytemuck::cast_slice::<Vertex, f32>(&self.vertices)
            .iter()
            .all(|value| value.is_finite())
    }

    /// Create a cube geometry with the given size
    ///
    /// The cube is centered at the origin with each side having length `size`.
    pub fn cube(id: impl Into<String>, size: f32) -> Self {
        let half = size * 0.5;

        let positions = [
            [-half, -half, -half], // 0: left bottom back
            [half, -half, -half],  // 1: right bottom back
            [half, half, -half],   // 2: right top back
            [-half, half, -half],  // 3: left top back
            [-half, -half, half],  // 4: left bottom front
            [half, -half, half],   // 5: right bottom front
            [half, half, half],    // 6: right top front
            [-half, half, half],   // 7: left top front
        ];

        // Each face needs 4 unique vertices (for proper normals and UVs)
        let vertices = vec![
            // Front face (positive Z)
            Vertex::new(positions[4], [0.0, 0.0, 1.0], [0.0, 1.0]),
            Vertex::new(positions[5], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::new(positions[6], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new(positions[7], [0.0, 0.0, 1.0], [0.0, 0.0]),
            // Back face (negative Z)
            Vertex::new(positions[1], [0.0, 0.0, -1.0], [0.0, 1.0]),
            Vertex::new(positions[0], [0.0, 0.0, -1.0], [1.0, 1.0]),
            Vertex::new(positions[3], [0.0, 0.0, -1.0], [1.0, 0.0]),
            Vertex::new(positions[2], [0.0, 0.0, -1.0], [0.0, 0.0]),
            // Top face (positive Y)
            Vertex::new(positions[7], [0.0, 1.0, 0.0], [0.0, 1.0]),
            Vertex::new(positions[6], [0.0, 1.0, 0.0], [1.0, 1.0]),
            Vertex::new(positions[2], [0.0, 1.0, 0.0], [1.0, 0.0]),
            Vertex::new(positions[3], [0.0, 1.0, 0.0], [0.0, 0.0]),
            // Bottom face (negative Y)
            Vertex::new(positions[0], [0.0, -1.0, 0.0], [0.0, 1.0]),
            Vertex::new(positions[1], [0.0, -1.0, 0.0], [1.0, 1.0]),
            Vertex::new(positions[5], [0.0, -1.0, 0.0], [1.0, 0.0]),
            Vertex::new(positions[4], [0.0, -1.0, 0.0], [0.0, 0.0]),
            // Right face (positive X)
            Vertex::new(positions[5], [1.0, 0.0, 0.0], [0.0, 1.0]),
            Vertex::new(positions[1], [1.0, 0.0, 0.0], [1.0, 1.0]),
            Vertex::new(positions[2], [1.0, 0.0, 0.0], [1.0, 0.0]),
            Vertex::new(positions[6], [1.0, 0.0, 0.0], [0.0, 0.0]),
            // Left face (negative X)
            Vertex::new(positions[0], [-1.0, 0.0, 0.0], [0.0, 1.0]),
            Vertex::new(positions[4], [-1.0, 0.0, 0.0], [1.0, 1.0]),
            Vertex::new(positions[7], [-1.0, 0.0, 0.0], [1.0, 0.0]),
            Vertex::new(positions[3], [-1.0, 0.0, 0.0], [0.0, 0.0]),
        ];

        let mut indices = Vec::with_capacity(36);
        for i in 0..6 {
            let base = i * 4;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::new(id, vertices, indices)
    }

    /// Create a double-sided plane on the XZ plane, centered at the origin
    pub fn plane(id: impl Into<String>, width: f32, depth: f32) -> Self {
        let half_width = width * 0.5;
        let half_depth = depth * 0.5;

        let vertices = vec![
            Vertex::new([-half_width, 0.0, -half_depth], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex::new([half_width, 0.0, -half_depth], [0.0, 1.0, 0.0], [1.0, 0.0]),
            Vertex::new([half_width, 0.0, half_depth], [0.0, 1.0, 0.0], [1.0, 1.0]),
            Vertex::new([-half_width, 0.0, half_depth], [0.0, 1.0, 0.0], [0.0, 1.0]),
        ];

        let indices = vec![
            0, 1, 2, 0, 2, 3, // top
            0, 2, 1, 0, 3, 2, // bottom
        ];

        Self::new(id, vertices, indices)
    }

    /// Create a UV sphere
    ///
    /// # Arguments
    /// * `radius` - Radius of the sphere
    /// * `sectors` - Number of longitude divisions (minimum 3)
    /// * `stacks` - Number of latitude divisions (minimum 2)
    pub fn sphere(id: impl Into<String>, radius: f32, sectors: u32, stacks: u32) -> Self {
        let sectors = sectors.max(3);
        let stacks = stacks.max(2);

        let mut vertices = Vec::new();

        let sector_step = 2.0 * std::f32::consts::PI / sectors as f32;
        let stack_step = std::f32::consts::PI / stacks as f32;

        for i in 0..=stacks {
            let stack_angle = std::f32::consts::PI / 2.0 - i as f32 * stack_step;
            let xy = radius * stack_angle.cos();
            let z = radius * stack_angle.sin();

            for j in 0..=sectors {
                let sector_angle = j as f32 * sector_step;

                let x = xy * sector_angle.cos();
                let y = xy * sector_angle.sin();

                let position = [x, z, y];
                let normal = [x / radius, z / radius, y / radius];
                let uv = [j as f32 / sectors as f32, i as f32 / stacks as f32];

                vertices.push(Vertex::new(position, normal, uv));
            }
        }

        let mut indices = Vec::new();
        for i in 0..stacks {
            for j in 0..sectors {
                let first = i * (sectors + 1) + j;
                let second = first + sectors + 1;

                indices.extend_from_slice(&[first, second, first + 1]);
                indices.extend_from_slice(&[second, second + 1, first + 1]);
            }
        }

        Self::new(id, vertices, indices)
    }
}

/// Progress of a geometry that is streamed in after its mesh was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelayLoadState {
    /// Geometry was available when the mesh was created
    #[default]
    None,
    NotLoaded,
    Loading,
    Loaded,
    /// Geometry file could not be read; the mesh stays without geometry
    Failed,
}

impl DelayLoadState {
    /// Whether the mesh still waits for its geometry
    pub fn is_pending(&self) -> bool {
        matches!(self, DelayLoadState::NotLoaded | DelayLoadState::Loading)
    }
}

/// Mesh component linking an entity to a geometry and a material
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshRenderer {
    pub geometry_id: Option<String>,
    pub material_id: Option<String>,
    /// Local-space bounds, cached on disk so they exist before the geometry arrives
    pub bounding_box: BoundingBox,
    pub delay_load_state: DelayLoadState,
    /// Project-relative geometry file the mesh was loaded from
    pub delay_loading_file: Option<String>,
}

impl MeshRenderer {
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            geometry_id: Some(geometry.id.clone()),
            bounding_box: geometry.bounding_box(),
            ..Default::default()
        }
    }

    pub fn with_material(mut self, material_id: impl Into<String>) -> Self {
        self.material_id = Some(material_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32); // 8 floats * 4 bytes
    }

    #[test]
    fn test_cube_vertices() {
        let cube = Geometry::cube("cube", 1.0);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
    }

    #[test]
    fn test_plane() {
        let plane = Geometry::plane("plane", 10.0, 10.0);
        assert_eq!(plane.vertices.len(), 4);
        assert_eq!(plane.indices.len(), 12);
        for vertex in &plane.vertices {
            assert_eq!(vertex.position[1], 0.0);
        }
    }

    #[test]
    fn test_sphere() {
        let sphere = Geometry::sphere("sphere", 1.0, 16, 8);
        assert_eq!(sphere.vertices.len(), (16 + 1) * (8 + 1));
        assert_eq!(sphere.indices.len(), 16 * 8 * 6);
    }

    #[test]
    fn test_cube_bounding_box() {
        let cube = Geometry::cube("cube", 2.0);
        let bounds = cube.bounding_box();
        assert_eq!(bounds.minimum, Vec3::splat(-1.0));
        assert_eq!(bounds.maximum, Vec3::splat(1.0));
        assert_eq!(bounds.center(), Vec3::ZERO);
    }

    #[test]
    fn test_empty_bounding_box() {
        assert_eq!(BoundingBox::from_vertices(&[]), BoundingBox::default());
    }

    #[test]
    fn test_delay_load_pending() {
        assert!(DelayLoadState::NotLoaded.is_pending());
        assert!(DelayLoadState::Loading.is_pending());
        assert!(!DelayLoadState::Loaded.is_pending());
        assert!(!DelayLoadState::Failed.is_pending());
        assert!(!DelayLoadState::None.is_pending());
    }
}
