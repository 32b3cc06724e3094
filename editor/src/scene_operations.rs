//! Scene operation handlers
//!
//! This module provides the actual implementation of scene operations
//! that are triggered from the editor UI. New entities get a random stable
//! id and a fresh unique id from the world's allocator.

use crate::editor_state::EditorState;
use engine::core::entity::Entity;
use engine::graphics::{load_geometry_from_file, MeshLoadError};
use engine::prelude::*;
use engine::utils::paths::{relative_to, to_slash};
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// A fresh stable id for a new entity or resource
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Replace the world with a default scene: editor camera, sun light, a cube
/// and a ground plane
pub fn create_default_scene(state: &mut EditorState) {
    info!("Creating default scene");

    state.world.clear();
    state.selected_entity = None;

    state.world.spawn_editor_camera(
        new_id(),
        "Editor Camera",
        Transform::from_position(Vec3::new(0.0, 5.0, 10.0)).looking_at(Vec3::ZERO, Vec3::Y),
        Camera::perspective(60.0, 0.1, 1000.0).with_target(Vec3::ZERO),
    );

    state.world.spawn_light(
        new_id(),
        "Default Light",
        Transform::from_position(Vec3::new(0.0, 10.0, 0.0)),
        Light::directional(Vec3::new(-0.5, -1.0, -0.5)),
    );

    let cube_material = Material::gray(new_id(), 0.8).with_name("Default Cube");
    spawn_primitive(state, "cube", "Default Cube", Vec3::ZERO, Some(cube_material));

    let ground_material = Material::gray(new_id(), 0.3).with_name("Ground Plane");
    spawn_primitive(
        state,
        "ground",
        "Ground Plane",
        Vec3::new(0.0, -1.0, 0.0),
        Some(ground_material),
    );

    info!("Default scene created with {} entities", state.world.len());
    state.on_nodes_added.notify(&());
}

/// Add an empty transform node at the origin
pub fn add_transform_node(state: &mut EditorState) -> Entity {
    let entity = state
        .world
        .spawn_transform_node(new_id(), "New Transform Node", Transform::default());
    added(state, entity)
}

/// Add a point light at the origin
pub fn add_point_light(state: &mut EditorState) -> Entity {
    let entity = state
        .world
        .spawn_light(new_id(), "New Point Light", Transform::default(), Light::point());
    added(state, entity)
}

/// Add a directional light pointing straight down
pub fn add_directional_light(state: &mut EditorState) -> Entity {
    let entity = state.world.spawn_light(
        new_id(),
        "New Directional Light",
        Transform::default(),
        Light::directional(Vec3::NEG_Y),
    );
    added(state, entity)
}

/// Add a mesh built from a named primitive
///
/// Returns `None` when the primitive library has no generator of that name.
pub fn add_primitive(state: &mut EditorState, primitive: &str) -> Option<Entity> {
    if !state.primitives.has_primitive(primitive) {
        warn!(primitive, "Unknown primitive");
        state.console.warn(format!("Unknown primitive: {primitive}"));
        return None;
    }
    let entity = spawn_primitive(state, primitive, primitive, Vec3::ZERO, None)?;
    Some(added(state, entity))
}

/// Remove an entity from the scene
///
/// Children become roots. The selection is cleared if it pointed at the
/// removed entity.
pub fn remove_entity(state: &mut EditorState, entity: Entity) -> bool {
    let name = state.world.name(entity);
    if !state.world.remove_entity(entity) {
        return false;
    }
    if state.selected_entity == Some(entity) {
        state.selected_entity = None;
    }
    state.console.log(format!("Removed {name}"));
    true
}

/// Import the first model of a mesh file as a new mesh
///
/// The mesh is added to the render list of every shadow generator in the
/// scene.
pub fn import_mesh_file(state: &mut EditorState, path: &Path) -> Result<Entity, MeshLoadError> {
    let geometry = load_geometry_from_file(path, &new_id())?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Imported Mesh")
        .to_string();

    let mesh = MeshRenderer::new(&geometry);
    state.world.assets_mut().insert_geometry(geometry);
    let entity = state.world.spawn_mesh(new_id(), name.as_str(), Transform::default(), mesh);

    for (_, generator) in state.world.query_mut::<&mut ShadowGenerator>() {
        generator.add_caster(entity);
    }

    state.console.log(format!("Imported {name} from {}", path.display()));
    Ok(added(state, entity))
}

/// Use a texture as the scene's environment
///
/// Paths inside the open project are stored relative to the project
/// directory.
pub fn set_environment_texture(state: &mut EditorState, path: &Path) {
    let name = match state.project_dir() {
        Some(project_dir) => to_slash(&relative_to(path, project_dir)),
        None => to_slash(path),
    };
    info!(texture = %name, "Setting environment texture");
    state.world.environment_mut().texture = Some(EnvironmentTexture::cube(name));
}

fn spawn_primitive(
    state: &mut EditorState,
    primitive: &str,
    name: &str,
    position: Vec3,
    material: Option<Material>,
) -> Option<Entity> {
    let geometry = state.primitives.generate(primitive, &new_id())?;
    let mut mesh = MeshRenderer::new(&geometry);
    if let Some(material) = material {
        mesh = mesh.with_material(material.id.clone());
        state.world.assets_mut().insert_material(material);
    }
    state.world.assets_mut().insert_geometry(geometry);
    Some(
        state
            .world
            .spawn_mesh(new_id(), name, Transform::from_position(position), mesh),
    )
}

fn added(state: &mut EditorState, entity: Entity) -> Entity {
    state.console.log(format!("Added {}", state.world.name(entity)));
    state.on_nodes_added.notify(&());
    entity
}
