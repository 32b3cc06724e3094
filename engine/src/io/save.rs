//! Writing a live world to a scene directory
//!
//! The world is walked once on the calling thread to build every descriptor.
//! Geometry files are then written in parallel, followed by every JSON
//! descriptor. Each attempted path is claimed, and a final sweep removes any
//! file in the scene directory nobody claimed.

use super::descriptor::{
    CameraDescriptor, EnvironmentDescriptor, GeometriesDescriptor, LightDescriptor, MeshDescriptor,
    MeshFile, NodeDescriptor, NodeHeader, SceneConfig, ShadowGeneratorDescriptor,
    VertexDataDescriptor,
};
use super::error::SceneError;
use super::fs::{to_json_bytes, FileSystem};
use super::geometry_file;
use super::report::{EntityFailure, SaveReport};
use crate::config::SceneLayout;
use crate::core::camera::Camera;
use crate::core::entity::{Entity, EntityKind, Transform, World};
use crate::core::light::{Light, ShadowGenerator};
use crate::graphics::{Geometry, Material, MeshRenderer};
use crate::utils::paths::{relative_to, to_slash};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Id written for the editor camera when the world has none
const DEFAULT_EDITOR_CAMERA_ID: &str = "editor-camera";

/// Any descriptor that ends up in its own JSON file
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Descriptor {
    Node(NodeDescriptor),
    Mesh(MeshFile),
    Light(LightDescriptor),
    ShadowGenerator(ShadowGeneratorDescriptor),
    Config(SceneConfig),
}

#[derive(Debug)]
struct DescriptorJob {
    kind: EntityKind,
    entity_id: String,
    path: PathBuf,
    descriptor: Descriptor,
}

struct GeometryJob<'w> {
    geometry: &'w Geometry,
    path: PathBuf,
}

struct MeshJob {
    entity_id: String,
    path: PathBuf,
    file: MeshFile,
}

/// Everything a save is going to write
struct SavePlan<'w> {
    geometries: Vec<GeometryJob<'w>>,
    meshes: Vec<MeshJob>,
    descriptors: Vec<DescriptorJob>,
    claimed: HashSet<PathBuf>,
}

impl<'w> SavePlan<'w> {
    fn new() -> Self {
        Self {
            geometries: Vec::new(),
            meshes: Vec::new(),
            descriptors: Vec::new(),
            claimed: HashSet::new(),
        }
    }

    /// Claim a descriptor path; a second entity with the same id is a failure
    fn claim(&mut self, kind: EntityKind, entity_id: &str, path: &Path, report: &mut SaveReport) -> bool {
        if self.claimed.insert(path.to_path_buf()) {
            return true;
        }
        warn!(kind = %kind, entity_id, path = ?path, "Duplicate entity id, skipping");
        report.failures.push(
            EntityFailure::new(kind, "another entity with the same id was already written")
                .with_id(entity_id)
                .with_path(path),
        );
        false
    }

    fn push(&mut self, kind: EntityKind, entity_id: String, path: PathBuf, descriptor: Descriptor) {
        self.descriptors.push(DescriptorJob {
            kind,
            entity_id,
            path,
            descriptor,
        });
    }

    /// Drop the inline copy of a geometry once its binary file is on disk
    fn strip_inline(&mut self, geometry_id: &str) {
        for job in &mut self.meshes {
            job.file
                .geometries
                .vertex_data
                .retain(|data| data.id != geometry_id);
        }
    }

    /// Keep the inline copy and stop pointing at a file that was not written
    fn keep_inline(&mut self, geometry_id: &str) {
        for job in &mut self.meshes {
            for mesh in &mut job.file.meshes {
                if mesh.geometry_id.as_deref() == Some(geometry_id) {
                    mesh.delay_loading_file = None;
                }
            }
        }
    }
}

/// Save `world` into `scene_dir`
///
/// `project_dir` is the directory geometry file pointers are written relative
/// to. Failures of individual entities are collected in the returned report;
/// only a missing scene directory or an uncreatable sub-directory fail the
/// whole save.
pub fn save_scene(
    world: &World,
    fs: &dyn FileSystem,
    layout: &SceneLayout,
    project_dir: &Path,
    scene_dir: &Path,
) -> Result<SaveReport, SceneError> {
    if !fs.is_dir(scene_dir) {
        error!(path = ?scene_dir, "The scene path is not a directory");
        return Err(SceneError::NotADirectory(scene_dir.to_path_buf()));
    }

    for dir in layout.all_dirs() {
        let path = scene_dir.join(dir);
        fs.create_dir_all(&path).map_err(|e| SceneError::io(&path, e))?;
    }

    info!(scene = ?scene_dir, entities = world.len(), "Saving scene");

    let mut report = SaveReport::default();
    let mut plan = build_plan(world, layout, project_dir, scene_dir, &mut report);

    // Geometry files first so mesh descriptors know whether to keep inline data
    let results: Vec<_> = plan
        .geometries
        .par_iter()
        .map(|job| fs.write(&job.path, &geometry_file::encode(job.geometry)))
        .collect();

    let mut written_geometries = Vec::new();
    let mut failed_geometries = Vec::new();
    for (job, result) in plan.geometries.iter().zip(results) {
        match result {
            Ok(()) => {
                debug!(geometry_id = %job.geometry.id, path = ?job.path, "Wrote geometry file");
                report.written.push(job.path.clone());
                written_geometries.push(job.geometry.id.clone());
            }
            Err(e) => {
                error!(geometry_id = %job.geometry.id, path = ?job.path, error = %e, "Failed to write geometry");
                report.failures.push(
                    EntityFailure::new(EntityKind::Geometry, &e)
                        .with_id(job.geometry.id.clone())
                        .with_path(&job.path),
                );
                failed_geometries.push(job.geometry.id.clone());
            }
        }
    }
    for geometry_id in &written_geometries {
        plan.strip_inline(geometry_id);
    }
    for geometry_id in &failed_geometries {
        plan.keep_inline(geometry_id);
    }

    let meshes = std::mem::take(&mut plan.meshes);
    for job in meshes {
        plan.push(EntityKind::Mesh, job.entity_id, job.path, Descriptor::Mesh(job.file));
    }

    let indent = layout.json_indent;
    let results: Vec<_> = plan
        .descriptors
        .par_iter()
        .map(|job| {
            let bytes = to_json_bytes(&job.descriptor, indent).map_err(|e| SceneError::json(&job.path, e))?;
            fs.write(&job.path, &bytes).map_err(|e| SceneError::io(&job.path, e))
        })
        .collect();

    for (job, result) in plan.descriptors.iter().zip(results) {
        match result {
            Ok(()) => {
                debug!(kind = %job.kind, entity_id = %job.entity_id, path = ?job.path, "Wrote descriptor");
                report.written.push(job.path.clone());
            }
            Err(e) => {
                error!(kind = %job.kind, entity_id = %job.entity_id, error = %e, "Failed to write descriptor");
                report.failures.push(
                    EntityFailure::new(job.kind, &e)
                        .with_id(job.entity_id.clone())
                        .with_path(&job.path),
                );
            }
        }
    }

    sweep_stale_files(fs, scene_dir, &plan.claimed, &mut report);

    info!(
        scene = ?scene_dir,
        written = report.written.len(),
        removed = report.removed.len(),
        failures = report.failures.len(),
        "Saved scene"
    );

    Ok(report)
}

fn build_plan<'w>(
    world: &'w World,
    layout: &SceneLayout,
    project_dir: &Path,
    scene_dir: &Path,
    report: &mut SaveReport,
) -> SavePlan<'w> {
    let mut plan = SavePlan::new();
    let geometries_rel = relative_to(scene_dir, project_dir).join(&layout.geometries_dir);

    for entity in sorted_by_id(world, EntityKind::Mesh) {
        let Some(node) = NodeHeader::from_entity(world, entity) else {
            continue;
        };
        let path = match layout.entity_path(scene_dir, EntityKind::Mesh, &node.id) {
            Ok(path) => path,
            Err(e) => {
                error!(entity_id = %node.id, error = %e, "Failed to serialize mesh");
                report.failures.push(EntityFailure::new(EntityKind::Mesh, &e).with_id(node.id));
                continue;
            }
        };
        if !plan.claim(EntityKind::Mesh, &node.id, &path, report) {
            continue;
        }

        let renderer = world
            .get::<MeshRenderer>(entity)
            .map(|r| (*r).clone())
            .unwrap_or_default();
        let geometry = renderer
            .geometry_id
            .as_deref()
            .and_then(|id| world.assets().geometry(id));
        let material = renderer
            .material_id
            .as_deref()
            .and_then(|id| world.assets().material(id));

        let finite = node.transform.is_finite()
            && material.map_or(true, Material::is_finite)
            && match geometry {
                Some(geometry) => geometry.is_finite(),
                None => renderer.bounding_box.is_finite(),
            };
        if !finite {
            // The previous files stay on disk untouched
            if let Some(geometry) = geometry {
                if let Ok(file_name) = layout.geometry_file_name(&geometry.id) {
                    plan.claimed.insert(scene_dir.join(&layout.geometries_dir).join(file_name));
                }
            }
            if let Some(existing) = &renderer.delay_loading_file {
                plan.claimed.insert(project_dir.join(existing));
            }
            reject_non_finite(EntityKind::Mesh, &node.id, &path, report);
            continue;
        }

        let mut descriptor = MeshDescriptor {
            node,
            geometry_id: renderer.geometry_id.clone(),
            geometry_unique_id: geometry.map(|g| g.unique_id),
            material_id: renderer.material_id.clone(),
            delay_loading_file: None,
            bounding_box_minimum: None,
            bounding_box_maximum: None,
        };
        let mut file = MeshFile {
            meshes: Vec::new(),
            materials: Vec::new(),
            geometries: GeometriesDescriptor::default(),
        };

        match geometry {
            Some(geometry) => {
                let bounds = geometry.bounding_box();
                descriptor.bounding_box_minimum = Some(bounds.minimum.to_array());
                descriptor.bounding_box_maximum = Some(bounds.maximum.to_array());

                match layout.geometry_file_name(&geometry.id) {
                    Ok(file_name) => {
                        let blob_path = scene_dir.join(&layout.geometries_dir).join(&file_name);
                        descriptor.delay_loading_file =
                            Some(to_slash(&geometries_rel.join(&file_name)));
                        file.geometries.vertex_data.push(VertexDataDescriptor::from(geometry));
                        // Shared geometries are written once
                        if plan.claimed.insert(blob_path.clone()) {
                            plan.geometries.push(GeometryJob {
                                geometry,
                                path: blob_path,
                            });
                        }
                    }
                    Err(e) => {
                        warn!(geometry_id = %geometry.id, error = %e, "Geometry id is not a valid file name, keeping data inline");
                        file.geometries.vertex_data.push(VertexDataDescriptor::from(geometry));
                    }
                }
            }
            None => {
                // Geometry never arrived: keep pointing at the file it should come from
                if let Some(existing) = &renderer.delay_loading_file {
                    plan.claimed.insert(project_dir.join(existing));
                    descriptor.delay_loading_file = Some(existing.clone());
                }
                if renderer.geometry_id.is_some() {
                    descriptor.bounding_box_minimum = Some(renderer.bounding_box.minimum.to_array());
                    descriptor.bounding_box_maximum = Some(renderer.bounding_box.maximum.to_array());
                }
            }
        }

        if let Some(material) = material {
            file.materials.push(material.clone());
        }

        let entity_id = descriptor.node.id.clone();
        file.meshes.push(descriptor);
        plan.meshes.push(MeshJob { entity_id, path, file });
    }

    for entity in sorted_by_id(world, EntityKind::TransformNode) {
        let Some(node) = NodeHeader::from_entity(world, entity) else {
            continue;
        };
        if let Some(path) = descriptor_path(&mut plan, layout, scene_dir, EntityKind::TransformNode, &node.id, report) {
            if !node.transform.is_finite() {
                reject_non_finite(EntityKind::TransformNode, &node.id, &path, report);
                continue;
            }
            plan.push(EntityKind::TransformNode, node.id.clone(), path, Descriptor::Node(NodeDescriptor { node }));
        }
    }

    for entity in sorted_by_id(world, EntityKind::Light) {
        let Some(node) = NodeHeader::from_entity(world, entity) else {
            continue;
        };
        let Ok(light) = world.get::<Light>(entity).map(|l| *l) else {
            continue;
        };

        if let Ok(generator) = world.get::<ShadowGenerator>(entity) {
            let descriptor = ShadowGeneratorDescriptor {
                id: generator.id.clone(),
                light_id: node.id.clone(),
                settings: generator.settings,
                render_list: generator
                    .render_list
                    .iter()
                    .filter_map(|&mesh| world.entity_id(mesh))
                    .collect(),
            };
            if let Some(path) =
                descriptor_path(&mut plan, layout, scene_dir, EntityKind::ShadowGenerator, &generator.id, report)
            {
                if !generator.settings.is_finite() {
                    reject_non_finite(EntityKind::ShadowGenerator, &generator.id, &path, report);
                } else {
                    plan.push(
                        EntityKind::ShadowGenerator,
                        generator.id.clone(),
                        path,
                        Descriptor::ShadowGenerator(descriptor),
                    );
                }
            }
        }

        if let Some(path) = descriptor_path(&mut plan, layout, scene_dir, EntityKind::Light, &node.id, report) {
            if !node.transform.is_finite() || !light.is_finite() {
                reject_non_finite(EntityKind::Light, &node.id, &path, report);
                continue;
            }
            plan.push(EntityKind::Light, node.id.clone(), path, Descriptor::Light(LightDescriptor { node, light }));
        }
    }

    let config_path = layout.config_path(scene_dir);
    plan.claimed.insert(config_path.clone());
    let config = SceneConfig {
        environment: EnvironmentDescriptor::from(world.environment()),
        editor_camera: editor_camera_descriptor(world),
    };
    let camera = &config.editor_camera;
    if !world.environment().is_finite() || !camera.node.transform.is_finite() || !camera.camera.is_finite() {
        reject_non_finite(EntityKind::Config, &layout.config_file, &config_path, report);
    } else {
        plan.push(EntityKind::Config, layout.config_file.clone(), config_path, Descriptor::Config(config));
    }

    plan
}

fn descriptor_path(
    plan: &mut SavePlan<'_>,
    layout: &SceneLayout,
    scene_dir: &Path,
    kind: EntityKind,
    id: &str,
    report: &mut SaveReport,
) -> Option<PathBuf> {
    match layout.entity_path(scene_dir, kind, id) {
        Ok(path) => plan.claim(kind, id, &path, report).then_some(path),
        Err(e) => {
            error!(kind = %kind, entity_id = id, error = %e, "Failed to serialize entity");
            report.failures.push(EntityFailure::new(kind, &e).with_id(id));
            None
        }
    }
}

/// JSON has no spelling for NaN or infinity; serde_json would write `null`
/// and the entity could not be read back
fn reject_non_finite(kind: EntityKind, entity_id: &str, path: &Path, report: &mut SaveReport) {
    warn!(kind = %kind, entity_id, path = ?path, "Non-finite number, keeping the previous file");
    report.failures.push(
        EntityFailure::new(kind, "contains a non-finite number")
            .with_id(entity_id)
            .with_path(path),
    );
}

fn editor_camera_descriptor(world: &World) -> CameraDescriptor {
    if let Some(entity) = world.editor_camera() {
        if let (Some(node), Ok(camera)) = (NodeHeader::from_entity(world, entity), world.get::<Camera>(entity)) {
            return CameraDescriptor { node, camera: *camera };
        }
    }

    debug!("No editor camera in the world, writing a default one");
    CameraDescriptor {
        node: NodeHeader {
            id: DEFAULT_EDITOR_CAMERA_ID.to_string(),
            name: "Editor Camera".to_string(),
            unique_id: None,
            parent_id: None,
            transform: Transform::default(),
        },
        camera: Camera::default(),
    }
}

/// Entities of one kind ordered by stable id, so reports are deterministic
fn sorted_by_id(world: &World, kind: EntityKind) -> Vec<Entity> {
    let mut entities: Vec<(String, Entity)> = world
        .entities_of_kind(kind)
        .into_iter()
        .filter_map(|entity| world.entity_id(entity).map(|id| (id, entity)))
        .collect();
    entities.sort_by(|a, b| a.0.cmp(&b.0));
    entities.into_iter().map(|(_, entity)| entity).collect()
}

/// Remove every file below `scene_dir` that the save did not claim
fn sweep_stale_files(fs: &dyn FileSystem, scene_dir: &Path, claimed: &HashSet<PathBuf>, report: &mut SaveReport) {
    let files = match fs.walk_files(scene_dir) {
        Ok(files) => files,
        Err(e) => {
            error!(scene = ?scene_dir, error = %e, "Failed to list scene files, skipping cleanup");
            report
                .failures
                .push(EntityFailure::new(EntityKind::Config, &e).with_path(scene_dir));
            return;
        }
    };

    for file in files {
        if claimed.contains(&file) {
            continue;
        }
        match fs.remove_file(&file) {
            Ok(()) => {
                debug!(path = ?file, "Removed stale file");
                report.removed.push(file);
            }
            Err(e) => {
                warn!(path = ?file, error = %e, "Failed to remove stale file");
                report
                    .failures
                    .push(EntityFailure::new(kind_of_path(&file), &e).with_path(file));
            }
        }
    }
}

/// Best guess at what a stray file held, for failure reports
fn kind_of_path(path: &Path) -> EntityKind {
    let dir = path
        .parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    match dir {
        "nodes" => EntityKind::TransformNode,
        "meshes" => EntityKind::Mesh,
        "lights" => EntityKind::Light,
        "shadowGenerators" => EntityKind::ShadowGenerator,
        "geometries" => EntityKind::Geometry,
        _ => EntityKind::Config,
    }
}
