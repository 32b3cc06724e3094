//! Shared fixtures for the persistence integration tests

#![allow(dead_code)]

use engine::config::SceneLayout;
use engine::io::{FileSystem, OsFileSystem};
use engine::prelude::*;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Project directory with an empty `scene/` sub-directory
pub struct TestProject {
    pub dir: tempfile::TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("scene")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn scene(&self) -> PathBuf {
        self.dir.path().join("scene")
    }

    pub fn save(&self, world: &World) -> SaveReport {
        self.save_with(world, &OsFileSystem)
    }

    pub fn save_with(&self, world: &World, fs: &dyn FileSystem) -> SaveReport {
        save_scene(world, fs, &SceneLayout::default(), self.root(), &self.scene()).unwrap()
    }

    pub fn load(&self) -> (World, LoadReport) {
        self.load_with(&OsFileSystem)
    }

    pub fn load_with(&self, fs: &dyn FileSystem) -> (World, LoadReport) {
        let mut world = World::new();
        let report = load_scene(&mut world, fs, &SceneLayout::default(), self.root(), &self.scene()).unwrap();
        (world, report)
    }

    /// Every file of the scene with its contents, keyed by scene-relative path
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        let scene = self.scene();
        OsFileSystem
            .walk_files(&scene)
            .unwrap()
            .into_iter()
            .map(|path| {
                let contents = std::fs::read(&path).unwrap();
                let relative = path.strip_prefix(&scene).unwrap().to_string_lossy().replace('\\', "/");
                (relative, contents)
            })
            .collect()
    }
}

/// A scene exercising every entity kind
///
/// `root` (node) holds `crate` (mesh) and `sun` (directional light with a
/// cascaded shadow generator casting `crate` and `floor`); `lamp` (point
/// light) hangs under `crate`; `floor` (mesh) and the editor camera are roots.
pub fn build_sample_world() -> World {
    let mut world = World::new();

    world.spawn_editor_camera(
        "editor-camera",
        "Editor Camera",
        Transform::from_position(Vec3::new(0.0, 5.0, -10.0)).looking_at(Vec3::ZERO, Vec3::Y),
        Camera::perspective(45.0, 0.1, 500.0).with_target(Vec3::ZERO),
    );
    world.environment_mut().intensity = 0.8;
    world.environment_mut().texture = Some(EnvironmentTexture::cube("textures/sky.env"));

    world.assets_mut().insert_material(Material::from_rgb("wood", 0.6, 0.4, 0.2));
    world.assets_mut().insert_material(Material::gray("concrete", 0.5));

    let crate_geometry = Geometry::cube("crate-geometry", 1.0);
    let floor_geometry = Geometry::plane("floor-geometry", 20.0, 20.0);
    let crate_renderer = MeshRenderer::new(&crate_geometry).with_material("wood");
    let floor_renderer = MeshRenderer::new(&floor_geometry).with_material("concrete");
    world.assets_mut().insert_geometry(crate_geometry);
    world.assets_mut().insert_geometry(floor_geometry);

    let root = world.spawn_transform_node("root", "Root", Transform::default());
    let crate_mesh = world.spawn_mesh(
        "crate",
        "Crate",
        Transform::from_position(Vec3::new(0.0, 0.5, 0.0)).with_scale(Vec3::splat(2.0)),
        crate_renderer,
    );
    let floor = world.spawn_mesh("floor", "Floor", Transform::default(), floor_renderer);
    world.set_parent(crate_mesh, Some(root)).unwrap();

    let sun = world.spawn_light(
        "sun",
        "Sun",
        Transform::from_position(Vec3::new(10.0, 20.0, 10.0)),
        Light::directional(Vec3::new(-1.0, -2.0, -1.0).normalize()).with_intensity(2.0),
    );
    world.set_parent(sun, Some(root)).unwrap();
    let mut generator = ShadowGenerator::new(
        "sun-shadows",
        ShadowSettings {
            kind: engine::core::light::ShadowGeneratorKind::Cascaded {
                num_cascades: 4,
                lambda: 0.7,
            },
            map_size: 2048,
            ..Default::default()
        },
    );
    generator.add_caster(crate_mesh);
    generator.add_caster(floor);
    world.insert_one(sun, generator).unwrap();

    let lamp = world.spawn_light("lamp", "Lamp", Transform::from_position(Vec3::Y), Light::point());
    world.set_parent(lamp, Some(crate_mesh)).unwrap();

    world
}

/// Parent edges of a world as `child id -> parent id`
pub fn parent_edges(world: &World) -> BTreeMap<String, Option<String>> {
    world
        .query::<&EntityId>()
        .iter()
        .map(|(entity, id)| {
            let parent = world.parent(entity).and_then(|p| world.entity_id(p));
            (id.as_str().to_string(), parent)
        })
        .collect()
}

/// File system that fails writes to paths ending with one of the given suffixes
pub struct FailingWrites {
    pub suffixes: Vec<String>,
}

impl FailingWrites {
    pub fn new(suffixes: &[&str]) -> Self {
        Self {
            suffixes: suffixes.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn should_fail(&self, path: &Path) -> bool {
        let path = path.to_string_lossy().replace('\\', "/");
        self.suffixes.iter().any(|suffix| path.ends_with(suffix.as_str()))
    }
}

impl FileSystem for FailingWrites {
    fn is_dir(&self, path: &Path) -> bool {
        OsFileSystem.is_dir(path)
    }

    fn exists(&self, path: &Path) -> bool {
        OsFileSystem.exists(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        OsFileSystem.create_dir_all(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        OsFileSystem.list_files(dir)
    }

    fn walk_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        OsFileSystem.walk_files(dir)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        OsFileSystem.read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if self.should_fail(path) {
            return Err(io::Error::new(io::ErrorKind::Other, "simulated write failure"));
        }
        OsFileSystem.write(path, contents)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        OsFileSystem.remove_file(path)
    }
}

/// File system that lists directories in reverse order
pub struct ReversedListing;

impl FileSystem for ReversedListing {
    fn is_dir(&self, path: &Path) -> bool {
        OsFileSystem.is_dir(path)
    }

    fn exists(&self, path: &Path) -> bool {
        OsFileSystem.exists(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        OsFileSystem.create_dir_all(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = OsFileSystem.list_files(dir)?;
        files.reverse();
        Ok(files)
    }

    fn walk_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = OsFileSystem.walk_files(dir)?;
        files.reverse();
        Ok(files)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        OsFileSystem.read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        OsFileSystem.write(path, contents)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        OsFileSystem.remove_file(path)
    }
}
