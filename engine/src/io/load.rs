//! Reading a scene directory back into a world
//!
//! Entities are created in kind order (editor camera, meshes, transform
//! nodes, lights, shadow generators) with their parent references parked,
//! then linked in a single pass once everything exists. Geometry stored in
//! separate files is streamed in on the rayon pool after its mesh exists.

use super::descriptor::{
    LightDescriptor, MeshFile, NodeDescriptor, NodeHeader, SceneConfig, ShadowGeneratorDescriptor,
};
use super::entity_mapper::resolve_references;
use super::error::SceneError;
use super::fs::{read_json, FileSystem};
use super::geometry_file;
use super::report::{EntityFailure, LoadReport};
use crate::config::SceneLayout;
use crate::core::entity::{Entity, EntityKind, UniqueId, WaitingParent, World};
use crate::core::environment::EnvironmentTexture;
use crate::core::light::{ShadowGenerator, WaitingRenderList};
use crate::graphics::{BoundingBox, DelayLoadState, Geometry, MeshRenderer};
use crate::utils::paths::to_slash;
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use tracing::{debug, error, info, warn};

/// A mesh whose geometry is still being read from disk
#[derive(Debug)]
struct PendingMesh {
    entity: Entity,
    entity_id: String,
    geometry_unique_id: Option<u64>,
    has_cached_bounds: bool,
}

/// Descriptor files found in a scene directory, per kind
#[derive(Debug, Default)]
struct SceneListing {
    nodes: Vec<PathBuf>,
    meshes: Vec<PathBuf>,
    lights: Vec<PathBuf>,
    shadow_generators: Vec<PathBuf>,
}

/// Load the scene stored in `scene_dir` into `world`
///
/// A missing or unreadable `config.json` fails the load before the world is
/// touched. Any other unreadable file is recorded in the report and skipped;
/// what was loaded stays in the world.
pub fn load_scene(
    world: &mut World,
    fs: &dyn FileSystem,
    layout: &SceneLayout,
    project_dir: &Path,
    scene_dir: &Path,
) -> Result<LoadReport, SceneError> {
    let mut report = LoadReport::default();
    let mut renumber = Vec::new();
    let listing = list_scene(fs, layout, scene_dir, &mut report)?;

    let config_path = layout.config_path(scene_dir);
    if !fs.exists(&config_path) {
        error!(path = ?config_path, "Scene configuration not found");
        return Err(SceneError::MissingConfig(config_path));
    }
    let config: SceneConfig = read_json(fs, &config_path)?;

    info!(
        scene = ?scene_dir,
        meshes = listing.meshes.len(),
        nodes = listing.nodes.len(),
        lights = listing.lights.len(),
        shadow_generators = listing.shadow_generators.len(),
        "Loading scene"
    );

    apply_config(world, config, project_dir, &mut renumber, &mut report);
    report.record(EntityKind::Camera);

    load_meshes(world, fs, layout, project_dir, &listing.meshes, &mut renumber, &mut report);

    for (path, result) in read_all::<NodeDescriptor>(fs, &listing.nodes) {
        match result {
            Ok(descriptor) => {
                let node = descriptor.node;
                let entity = world.spawn_transform_node(node.id.clone(), node.name.clone(), node.transform);
                adopt_header(world, entity, EntityKind::TransformNode, &node, &mut renumber, &mut report);
                report.record(EntityKind::TransformNode);
            }
            Err(e) => fail(&mut report, EntityKind::TransformNode, &path, e),
        }
    }

    for (path, result) in read_all::<LightDescriptor>(fs, &listing.lights) {
        match result {
            Ok(descriptor) => {
                let node = descriptor.node;
                let entity = world.spawn_light(node.id.clone(), node.name.clone(), node.transform, descriptor.light);
                adopt_header(world, entity, EntityKind::Light, &node, &mut renumber, &mut report);
                report.record(EntityKind::Light);
            }
            Err(e) => fail(&mut report, EntityKind::Light, &path, e),
        }
    }

    for (path, result) in read_all::<ShadowGeneratorDescriptor>(fs, &listing.shadow_generators) {
        let descriptor = match result {
            Ok(descriptor) => descriptor,
            Err(e) => {
                fail(&mut report, EntityKind::ShadowGenerator, &path, e);
                continue;
            }
        };
        let light = world
            .find_by_id(&descriptor.light_id)
            .filter(|&entity| world.is_light(entity));
        let Some(light) = light else {
            let e = SceneError::MissingLight(descriptor.light_id.clone());
            warn!(shadow_generator = %descriptor.id, error = %e, "Skipping shadow generator");
            report
                .failures
                .push(EntityFailure::new(EntityKind::ShadowGenerator, &e).with_id(descriptor.id).with_path(path));
            continue;
        };

        let generator = ShadowGenerator::new(descriptor.id, descriptor.settings);
        if world
            .inner_mut()
            .insert(light, (generator, WaitingRenderList(descriptor.render_list)))
            .is_ok()
        {
            report.record(EntityKind::ShadowGenerator);
        }
    }

    // Fresh ids are only safe once every stored id has been reserved
    for entity in renumber {
        let unique_id = world.allocate_unique_id();
        let _ = world.insert_one(entity, UniqueId(unique_id));
    }

    let outcome = resolve_references(world);
    for (generator_id, mesh_id) in outcome.missing_casters {
        report.failures.push(
            EntityFailure::new(EntityKind::ShadowGenerator, format!("shadow caster {mesh_id:?} not found"))
                .with_id(generator_id),
        );
    }
    report.unresolved_parents = outcome.unresolved;

    info!(
        scene = ?scene_dir,
        entities = world.len(),
        parents_resolved = outcome.resolved,
        unresolved_parents = report.unresolved_parents.len(),
        failures = report.failures.len(),
        "Loaded scene"
    );

    Ok(report)
}

/// Make sure the descriptor directories exist and list their JSON files
fn list_scene(
    fs: &dyn FileSystem,
    layout: &SceneLayout,
    scene_dir: &Path,
    report: &mut LoadReport,
) -> Result<SceneListing, SceneError> {
    let mut list = |dir: &str, kind: EntityKind| -> Result<Vec<PathBuf>, SceneError> {
        let path = scene_dir.join(dir);
        fs.create_dir_all(&path).map_err(|e| SceneError::io(&path, e))?;
        match fs.list_files(&path) {
            Ok(files) => Ok(files
                .into_iter()
                .filter(|file| file.extension().is_some_and(|ext| ext == "json"))
                .collect()),
            Err(e) => {
                error!(path = ?path, error = %e, "Failed to list scene directory");
                report.failures.push(EntityFailure::new(kind, &e).with_path(&path));
                Ok(Vec::new())
            }
        }
    };

    Ok(SceneListing {
        nodes: list(&layout.nodes_dir, EntityKind::TransformNode)?,
        meshes: list(&layout.meshes_dir, EntityKind::Mesh)?,
        lights: list(&layout.lights_dir, EntityKind::Light)?,
        shadow_generators: list(&layout.shadow_generators_dir, EntityKind::ShadowGenerator)?,
    })
}

/// Read and parse descriptor files in parallel, keeping the listing order
fn read_all<T>(fs: &dyn FileSystem, files: &[PathBuf]) -> Vec<(PathBuf, Result<T, SceneError>)>
where
    T: DeserializeOwned + Send,
{
    files
        .par_iter()
        .map(|path| (path.clone(), read_json::<T>(fs, path)))
        .collect()
}

fn fail(report: &mut LoadReport, kind: EntityKind, path: &Path, error: SceneError) {
    error!(kind = %kind, path = ?path, error = %error, "Failed to load entity");
    report.failures.push(EntityFailure::new(kind, &error).with_path(path));
}

/// Carry the persisted unique id over and park the parent reference
///
/// A node without a persisted unique id is queued in `renumber` for a fresh
/// id and is not linked to a parent. An id that cannot be reserved is
/// queued the same way and reported.
fn adopt_header(
    world: &mut World,
    entity: Entity,
    kind: EntityKind,
    node: &NodeHeader,
    renumber: &mut Vec<Entity>,
    report: &mut LoadReport,
) {
    let Some(unique_id) = node.unique_id else {
        debug!(entity_id = %node.id, "No unique id stored, parent link skipped");
        renumber.push(entity);
        return;
    };
    if world.reserve_unique_id(unique_id) {
        let _ = world.insert_one(entity, UniqueId(unique_id));
    } else {
        warn!(entity_id = %node.id, unique_id, "Unique id out of range, assigning a fresh one");
        renumber.push(entity);
        report.failures.push(
            EntityFailure::new(kind, format!("unique id {unique_id} is out of range, a new one was assigned"))
                .with_id(node.id.clone()),
        );
    }
    if let Some(parent_id) = node.parent_id {
        let _ = world.insert_one(entity, WaitingParent(parent_id));
    }
}

fn apply_config(
    world: &mut World,
    config: SceneConfig,
    project_dir: &Path,
    renumber: &mut Vec<Entity>,
    report: &mut LoadReport,
) {
    let camera = config.editor_camera;
    let entity = world.spawn_editor_camera(
        camera.node.id.clone(),
        camera.node.name.clone(),
        camera.node.transform,
        camera.camera,
    );
    adopt_header(world, entity, EntityKind::Camera, &camera.node, renumber, report);

    let environment = world.environment_mut();
    environment.intensity = config.environment.environment_intensity;
    environment.texture = config
        .environment
        .environment_texture
        .map(|texture| EnvironmentTexture {
            url: to_slash(&project_dir.join(&texture.name)),
            ..texture
        });
    debug!(
        intensity = environment.intensity,
        texture = ?environment.texture.as_ref().map(|t| &t.url),
        "Applied scene environment"
    );
}

fn load_meshes(
    world: &mut World,
    fs: &dyn FileSystem,
    layout: &SceneLayout,
    project_dir: &Path,
    files: &[PathBuf],
    renumber: &mut Vec<Entity>,
    report: &mut LoadReport,
) {
    // Keyed by project-relative geometry file
    let mut pending: BTreeMap<String, Vec<PendingMesh>> = BTreeMap::new();
    let mut geometry_ids: BTreeMap<String, String> = BTreeMap::new();

    for (path, result) in read_all::<MeshFile>(fs, files) {
        let file = match result {
            Ok(file) => file,
            Err(e) => {
                fail(report, EntityKind::Mesh, &path, e);
                continue;
            }
        };

        for material in file.materials {
            world.reserve_unique_id(material.unique_id);
            world.assets_mut().insert_material(material);
        }
        for data in file.geometries.vertex_data {
            let geometry = Geometry::from(data);
            world.reserve_unique_id(geometry.unique_id);
            world.assets_mut().insert_geometry(geometry);
        }

        for descriptor in file.meshes {
            let cached_bounds = descriptor.bounding_box();
            let geometry_ready = descriptor
                .geometry_id
                .as_deref()
                .is_some_and(|id| world.assets().geometry(id).is_some());

            let mut renderer = MeshRenderer {
                geometry_id: descriptor.geometry_id.clone(),
                material_id: descriptor.material_id.clone(),
                bounding_box: cached_bounds.unwrap_or_default(),
                delay_load_state: DelayLoadState::None,
                delay_loading_file: descriptor.delay_loading_file.clone(),
            };
            if geometry_ready {
                if cached_bounds.is_none() {
                    if let Some(geometry) = descriptor.geometry_id.as_deref().and_then(|id| world.assets().geometry(id)) {
                        renderer.bounding_box = geometry.bounding_box();
                    }
                }
            } else if descriptor.delay_loading_file.is_some() {
                renderer.delay_load_state = DelayLoadState::NotLoaded;
            }

            let node = descriptor.node;
            let entity = world.spawn_mesh(node.id.clone(), node.name.clone(), node.transform, renderer);
            adopt_header(world, entity, EntityKind::Mesh, &node, renumber, report);
            report.record(EntityKind::Mesh);

            if let (false, Some(file)) = (geometry_ready, descriptor.delay_loading_file) {
                let geometry_id = descriptor
                    .geometry_id
                    .clone()
                    .unwrap_or_else(|| geometry_id_from_file(&file, &layout.geometry_extension));
                geometry_ids.entry(file.clone()).or_insert(geometry_id);
                pending.entry(file).or_default().push(PendingMesh {
                    entity,
                    entity_id: node.id,
                    geometry_unique_id: descriptor.geometry_unique_id,
                    has_cached_bounds: cached_bounds.is_some(),
                });
            }
        }
    }

    if !pending.is_empty() {
        stream_geometries(world, fs, layout, project_dir, geometry_ids, pending, report);
    }
}

/// Read delay-loaded geometry files on the rayon pool and attach them as they arrive
///
/// The reads are driven from a separate thread so the calling thread can poll
/// even when it is itself a pool worker. While nothing has arrived it helps
/// the pool with queued work, then waits one layout interval. There is no
/// upper bound on the wait.
fn stream_geometries(
    world: &mut World,
    fs: &dyn FileSystem,
    layout: &SceneLayout,
    project_dir: &Path,
    geometry_ids: BTreeMap<String, String>,
    mut pending: BTreeMap<String, Vec<PendingMesh>>,
    report: &mut LoadReport,
) {
    for meshes in pending.values() {
        for mesh in meshes {
            if let Ok(renderer) = world.query_one_mut::<&mut MeshRenderer>(mesh.entity) {
                renderer.delay_load_state = DelayLoadState::Loading;
            }
        }
    }

    let (sender, receiver) = mpsc::channel::<(String, Result<Geometry, SceneError>)>();
    let poll_interval = layout.delay_load_poll_interval;
    let geometry_ids = &geometry_ids;

    std::thread::scope(|scope| {
        scope.spawn(move || {
            geometry_ids.par_iter().for_each_with(sender, |sender, (file, geometry_id)| {
                let result = read_geometry(fs, &project_dir.join(file), geometry_id);
                // The receiver only goes away once nothing is pending
                let _ = sender.send((file.clone(), result));
            });
        });

        while !pending.is_empty() {
            let received = match receiver.try_recv() {
                Ok(message) => Ok(message),
                Err(TryRecvError::Disconnected) => Err(RecvTimeoutError::Disconnected),
                Err(TryRecvError::Empty) => {
                    if let Some(rayon::Yield::Executed) = rayon::yield_now() {
                        continue;
                    }
                    receiver.recv_timeout(poll_interval)
                }
            };
            match received {
                Ok((file, result)) => {
                    let Some(meshes) = pending.remove(&file) else {
                        continue;
                    };
                    attach_geometry(world, &file, result, meshes, report);
                }
                Err(RecvTimeoutError::Timeout) => {
                    debug!(waiting = pending.len(), "Waiting for delay-loaded geometry");
                }
                Err(RecvTimeoutError::Disconnected) => {
                    for (file, meshes) in std::mem::take(&mut pending) {
                        let error = SceneError::io(
                            &project_dir.join(&file),
                            std::io::Error::new(std::io::ErrorKind::Interrupted, "geometry reader stopped"),
                        );
                        attach_geometry(world, &file, Err(error), meshes, report);
                    }
                }
            }
        }
    });
}

fn read_geometry(fs: &dyn FileSystem, path: &Path, geometry_id: &str) -> Result<Geometry, SceneError> {
    let bytes = fs.read(path).map_err(|e| SceneError::io(path, e))?;
    geometry_file::decode(geometry_id, &bytes).map_err(|source| SceneError::InvalidGeometryFile {
        path: path.to_path_buf(),
        source,
    })
}

fn attach_geometry(
    world: &mut World,
    file: &str,
    result: Result<Geometry, SceneError>,
    meshes: Vec<PendingMesh>,
    report: &mut LoadReport,
) {
    match result {
        Ok(mut geometry) => {
            if let Some(unique_id) = meshes.iter().find_map(|mesh| mesh.geometry_unique_id) {
                geometry.unique_id = unique_id;
                world.reserve_unique_id(unique_id);
            }
            let bounds: BoundingBox = geometry.bounding_box();
            let geometry_id = geometry.id.clone();
            debug!(geometry_id = %geometry_id, file, meshes = meshes.len(), "Delay-loaded geometry");
            world.assets_mut().insert_geometry(geometry);

            for mesh in meshes {
                if let Ok(renderer) = world.query_one_mut::<&mut MeshRenderer>(mesh.entity) {
                    renderer.delay_load_state = DelayLoadState::Loaded;
                    renderer.geometry_id = Some(geometry_id.clone());
                    if !mesh.has_cached_bounds {
                        renderer.bounding_box = bounds;
                    }
                }
            }
        }
        Err(e) => {
            error!(file, error = %e, "Failed to load geometry");
            for mesh in meshes {
                if let Ok(renderer) = world.query_one_mut::<&mut MeshRenderer>(mesh.entity) {
                    renderer.delay_load_state = DelayLoadState::Failed;
                }
                report.failures.push(
                    EntityFailure::new(EntityKind::Geometry, &e)
                        .with_id(mesh.entity_id)
                        .with_path(file),
                );
            }
        }
    }
}

/// Geometry id encoded in a geometry file name
fn geometry_id_from_file(file: &str, extension: &str) -> String {
    let name = file.rsplit('/').next().unwrap_or(file);
    name.strip_suffix(extension)
        .and_then(|stem| stem.strip_suffix('.'))
        .unwrap_or(name)
        .to_string()
}
