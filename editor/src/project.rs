//! Project file management
//!
//! A project file records the editor version that wrote it and the scene
//! directory that was open, relative to the project file's directory.
//! Opening a project loads that scene; saving a project saves it.

use crate::editor_state::EditorState;
use engine::io::fs::to_json_bytes;
use engine::io::{load_scene, save_scene, FileSystem, LoadReport, SaveReport, SceneError};
use engine::utils::paths::{relative_to, to_slash};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Contents of a project file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    pub version: String,
    /// Scene directory relative to the project file's directory
    #[serde(default)]
    pub last_opened_scene: Option<String>,
}

/// Errors that can occur while opening or saving a project
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Failed to access project file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid project file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No project is open")]
    NoProjectOpen,

    #[error("Scene directory {} contains the project file {}", scene.display(), project.display())]
    SceneContainsProject { scene: PathBuf, project: PathBuf },

    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl ProjectDescriptor {
    /// Read a project file
    pub fn load_from(fs: &dyn FileSystem, path: &Path) -> Result<Self, ProjectError> {
        let bytes = fs.read(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let descriptor = serde_json::from_slice(&bytes).map_err(|source| ProjectError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded project file from {:?}", path);
        Ok(descriptor)
    }

    /// Write a project file
    pub fn save_to(&self, fs: &dyn FileSystem, path: &Path, indent: usize) -> Result<(), ProjectError> {
        let bytes = to_json_bytes(self, indent).map_err(|source| ProjectError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs.write(path, &bytes).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved project file to {:?}", path);
        Ok(())
    }
}

/// Open the project at `path` and load its last opened scene
///
/// The current world is replaced. Returns the scene load report, or `None`
/// when the project has no scene yet. Per-entity failures are also written
/// to the console.
pub fn load_project(
    state: &mut EditorState,
    fs: &dyn FileSystem,
    path: &Path,
) -> Result<Option<LoadReport>, ProjectError> {
    let descriptor = ProjectDescriptor::load_from(fs, path)?;
    let project_dir = path.parent().unwrap_or(Path::new("")).to_path_buf();

    state.project_path = Some(path.to_path_buf());
    state.last_opened_scene_path = descriptor
        .last_opened_scene
        .as_deref()
        .map(|scene| project_dir.join(scene));
    state.selected_entity = None;
    state.world.clear();

    let Some(scene_dir) = state.last_opened_scene_path.clone() else {
        debug!(project = ?path, "Project has no scene to open");
        return Ok(None);
    };

    let report = load_scene(&mut state.world, fs, &state.layout, &project_dir, &scene_dir)?;
    state.console.report_load(&report);
    state.console.log(format!("Loaded scene {}", to_slash(&scene_dir)));
    state.on_scene_loaded.notify(&scene_dir);
    Ok(Some(report))
}

/// Write the project file and save the open scene
///
/// Fails with [`ProjectError::NoProjectOpen`] when no project path is set.
/// A scene directory holding the project file is refused before anything is
/// written, since the scene save removes every file it did not write. The
/// scene directory is created if needed.
pub fn save_project(state: &mut EditorState, fs: &dyn FileSystem) -> Result<Option<SaveReport>, ProjectError> {
    let project_path = state.project_path.clone().ok_or(ProjectError::NoProjectOpen)?;
    let project_dir = project_path.parent().unwrap_or(Path::new("")).to_path_buf();

    if let Some(scene_dir) = state.last_opened_scene_path.as_deref() {
        if project_path.starts_with(scene_dir) {
            warn!(scene = ?scene_dir, project = ?project_path, "Refusing to save a scene over its project file");
            return Err(ProjectError::SceneContainsProject {
                scene: scene_dir.to_path_buf(),
                project: project_path,
            });
        }
    }

    let descriptor = ProjectDescriptor {
        version: env!("CARGO_PKG_VERSION").to_string(),
        last_opened_scene: state
            .last_opened_scene_path
            .as_deref()
            .map(|scene| to_slash(&relative_to(scene, &project_dir))),
    };
    descriptor.save_to(fs, &project_path, state.layout.json_indent)?;

    let report = match state.last_opened_scene_path.clone() {
        Some(scene_dir) => {
            fs.create_dir_all(&scene_dir).map_err(|source| SceneError::Io {
                path: scene_dir.clone(),
                source,
            })?;
            let report = save_scene(&state.world, fs, &state.layout, &project_dir, &scene_dir)?;
            state.console.report_save(&report);
            Some(report)
        }
        None => None,
    };

    state.console.log("Project saved");
    state.on_project_saved.notify(&project_path);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::io::OsFileSystem;

    #[test]
    fn test_descriptor_format() {
        let descriptor = ProjectDescriptor {
            version: "1.0.0".to_string(),
            last_opened_scene: Some("scenes/main".to_string()),
        };
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value, serde_json::json!({"version": "1.0.0", "lastOpenedScene": "scenes/main"}));

        let empty: ProjectDescriptor = serde_json::from_str(r#"{"version":"1.0.0","lastOpenedScene":null}"#).unwrap();
        assert_eq!(empty.last_opened_scene, None);
    }

    #[test]
    fn test_save_without_project_fails() {
        let mut state = EditorState::new();
        let result = save_project(&mut state, &OsFileSystem);
        assert!(matches!(result, Err(ProjectError::NoProjectOpen)));
    }

    #[test]
    fn test_scene_directory_holding_project_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("demo.project");
        std::fs::write(&project_path, r#"{"version":"0.1.0"}"#).unwrap();

        for scene_dir in [dir.path().to_path_buf(), dir.path().parent().unwrap().to_path_buf()] {
            let mut state = EditorState::new();
            state.world.spawn_transform_node("n", "N", engine::prelude::Transform::default());
            state.project_path = Some(project_path.clone());
            state.last_opened_scene_path = Some(scene_dir);

            let result = save_project(&mut state, &OsFileSystem);

            assert!(matches!(result, Err(ProjectError::SceneContainsProject { .. })));
            assert_eq!(std::fs::read_to_string(&project_path).unwrap(), r#"{"version":"0.1.0"}"#);
            assert!(!dir.path().join("nodes").exists());
        }
    }

    #[test]
    fn test_invalid_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.project");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let mut state = EditorState::new();
        let result = load_project(&mut state, &OsFileSystem, &path);
        assert!(matches!(result, Err(ProjectError::Json { .. })));
        assert!(state.project_path.is_none());
    }

    #[test]
    fn test_missing_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = EditorState::new();
        let result = load_project(&mut state, &OsFileSystem, &dir.path().join("nope.project"));
        assert!(matches!(result, Err(ProjectError::Io { .. })));
    }
}
