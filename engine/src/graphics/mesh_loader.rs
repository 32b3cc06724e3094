//! Importing geometry from external model files
//!
//! Only Wavefront OBJ is supported. The first model of a file becomes the
//! imported geometry.

use crate::graphics::mesh::{Geometry, Vertex};
use glam::Vec3;
use std::path::Path;
use tracing::{debug, info};

/// Errors that can occur during mesh loading
#[derive(Debug, thiserror::Error)]
pub enum MeshLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ loading error: {0}")]
    ObjLoad(#[from] tobj::LoadError),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("No mesh data found in file")]
    NoMeshData,
}

/// Load a geometry from a model file, giving it `geometry_id`
pub fn load_geometry_from_file(path: &Path, geometry_id: &str) -> Result<Geometry, MeshLoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "obj" => load_obj(path, geometry_id),
        ext => Err(MeshLoadError::UnsupportedFormat(ext.to_string())),
    }
}

fn load_obj(path: &Path, geometry_id: &str) -> Result<Geometry, MeshLoadError> {
    info!("Importing OBJ file: {:?}", path);

    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj(path, &options)?;
    let model = models.into_iter().next().ok_or(MeshLoadError::NoMeshData)?;
    let mesh = model.mesh;

    let vertex_count = mesh.positions.len() / 3;
    debug!(
        model = %model.name,
        vertices = vertex_count,
        indices = mesh.indices.len(),
        "Read OBJ model"
    );

    let has_normals = mesh.normals.len() >= vertex_count * 3;
    let has_uvs = mesh.texcoords.len() >= vertex_count * 2;

    let mut vertices: Vec<Vertex> = (0..vertex_count)
        .map(|i| {
            let position = [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ];
            let normal = if has_normals {
                [mesh.normals[i * 3], mesh.normals[i * 3 + 1], mesh.normals[i * 3 + 2]]
            } else {
                [0.0; 3]
            };
            let uv = if has_uvs {
                [mesh.texcoords[i * 2], mesh.texcoords[i * 2 + 1]]
            } else {
                [0.0; 2]
            };
            Vertex::new(position, normal, uv)
        })
        .collect();

    if !has_normals {
        compute_smooth_normals(&mut vertices, &mesh.indices);
    }

    Ok(Geometry::new(geometry_id, vertices, mesh.indices))
}

/// Area-weighted vertex normals from the triangle list
fn compute_smooth_normals(vertices: &mut [Vertex], indices: &[u32]) {
    let mut sums = vec![Vec3::ZERO; vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        if a.max(b).max(c) >= vertices.len() {
            continue;
        }
        let p = |i: usize| Vec3::from(vertices[i].position);
        let face = (p(b) - p(a)).cross(p(c) - p(a));
        for i in [a, b, c] {
            sums[i] += face;
        }
    }

    for (vertex, sum) in vertices.iter_mut().zip(sums) {
        vertex.normal = sum.normalize_or_zero().to_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format() {
        let result = load_geometry_from_file(Path::new("test.fbx"), "g");
        assert!(matches!(result, Err(MeshLoadError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_obj_triangle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let geometry = load_geometry_from_file(&path, "tri").unwrap();
        assert_eq!(geometry.id, "tri");
        assert_eq!(geometry.vertices.len(), 3);
        assert_eq!(geometry.indices, vec![0, 1, 2]);
        assert_eq!(geometry.vertices[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_file_normals_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lit.obj");
        std::fs::write(
            &path,
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 1 0\nf 1//1 2//1 3//1\n",
        )
        .unwrap();

        let geometry = load_geometry_from_file(&path, "lit").unwrap();
        assert!(geometry.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    }
}
