//! Scene graph and scene-directory persistence for the editor
//!
//! This crate provides the live scene graph (nodes, meshes, lights, cameras,
//! shadow generators, geometry and material storage) and the pipeline that
//! saves it to, and loads it from, a directory of per-entity files.

pub mod config;
pub mod core;
pub mod graphics;
pub mod io;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    // Entity system types
    pub use crate::core::entity::{
        Entity, EntityId, EntityKind, Name, Parent, Transform, TransformNode, UniqueId, World,
    };

    // Camera and light types
    pub use crate::core::camera::{Camera, CameraMode, EditorCamera};
    pub use crate::core::environment::{Environment, EnvironmentTexture};
    pub use crate::core::light::{Light, LightKind, ShadowGenerator, ShadowSettings};

    // Math types
    pub use glam::{Mat4, Quat, Vec3};

    // Graphics types
    pub use crate::graphics::{DelayLoadState, Geometry, Material, MeshRenderer, Vertex};

    // IO types
    pub use crate::io::{
        load_scene, save_scene, FileSystem, LoadReport, OsFileSystem, SaveReport, SceneError,
    };

    // Config types
    pub use crate::config::SceneLayout;
}

/// Initialize logging for the engine
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
