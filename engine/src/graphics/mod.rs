//! Graphics resources
//!
//! Geometry, materials and the mesh component, plus primitive generators and
//! model file import.

pub mod assets;
pub mod material;
pub mod mesh;
pub mod mesh_library;
pub mod mesh_loader;

// Re-export commonly used types
pub use assets::SceneAssets;
pub use material::Material;
pub use mesh::{BoundingBox, DelayLoadState, Geometry, MeshRenderer, Vertex};
pub use mesh_library::PrimitiveLibrary;
pub use mesh_loader::{load_geometry_from_file, MeshLoadError};
