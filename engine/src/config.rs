//! Configuration of the on-disk scene directory layout

use crate::core::entity::EntityKind;
use crate::io::SceneError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Names and formats used inside a scene directory
#[derive(Debug, Clone)]
pub struct SceneLayout {
    /// Directory name for transform node descriptors
    pub nodes_dir: String,
    /// Directory name for mesh descriptors
    pub meshes_dir: String,
    /// Directory name for light descriptors
    pub lights_dir: String,
    /// Directory name for binary geometry files
    pub geometries_dir: String,
    /// Directory name for shadow generator descriptors
    pub shadow_generators_dir: String,
    /// File holding the environment and the editor camera
    pub config_file: String,
    /// Extension of binary geometry files
    pub geometry_extension: String,
    /// Spaces per indentation level in written JSON
    pub json_indent: usize,
    /// How long the loader waits between checks on delay-loaded geometry
    pub delay_load_poll_interval: Duration,
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            nodes_dir: "nodes".to_string(),
            meshes_dir: "meshes".to_string(),
            lights_dir: "lights".to_string(),
            geometries_dir: "geometries".to_string(),
            shadow_generators_dir: "shadowGenerators".to_string(),
            config_file: "config.json".to_string(),
            geometry_extension: "babylonbinarymeshdata".to_string(),
            json_indent: 4,
            delay_load_poll_interval: Duration::from_millis(150),
        }
    }
}

impl SceneLayout {
    /// Reject ids that cannot be used as a file name
    pub fn validate_id(id: &str) -> Result<(), SceneError> {
        // Validate id to prevent path traversal
        if id.is_empty() || id.contains("..") || id.contains('/') || id.contains('\\') {
            return Err(SceneError::InvalidEntityId(id.to_string()));
        }
        Ok(())
    }

    /// Directory holding descriptors of the given kind, if it has one
    pub fn dir_for(&self, kind: EntityKind) -> Option<&str> {
        match kind {
            EntityKind::TransformNode => Some(&self.nodes_dir),
            EntityKind::Mesh => Some(&self.meshes_dir),
            EntityKind::Light => Some(&self.lights_dir),
            EntityKind::ShadowGenerator => Some(&self.shadow_generators_dir),
            EntityKind::Geometry => Some(&self.geometries_dir),
            EntityKind::Camera | EntityKind::Config => None,
        }
    }

    /// Every sub-directory of a scene directory
    pub fn all_dirs(&self) -> [&str; 5] {
        [
            &self.nodes_dir,
            &self.meshes_dir,
            &self.lights_dir,
            &self.geometries_dir,
            &self.shadow_generators_dir,
        ]
    }

    /// Path of the JSON descriptor for an entity
    pub fn entity_path(&self, scene_dir: &Path, kind: EntityKind, id: &str) -> Result<PathBuf, SceneError> {
        Self::validate_id(id)?;
        let dir = self
            .dir_for(kind)
            .ok_or_else(|| SceneError::InvalidEntityId(format!("{kind} entities have no descriptor directory")))?;
        let path = scene_dir.join(dir).join(format!("{id}.json"));
        debug!(kind = %kind, id, path = ?path, "Generated entity path");
        Ok(path)
    }

    /// File name of the binary data of a geometry
    pub fn geometry_file_name(&self, geometry_id: &str) -> Result<String, SceneError> {
        Self::validate_id(geometry_id)?;
        Ok(format!("{geometry_id}.{}", self.geometry_extension))
    }

    /// Path of the scene configuration file
    pub fn config_path(&self, scene_dir: &Path) -> PathBuf {
        scene_dir.join(&self.config_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_path() {
        let layout = SceneLayout::default();
        let path = layout
            .entity_path(Path::new("project/scene"), EntityKind::ShadowGenerator, "abc")
            .unwrap();
        assert_eq!(path, PathBuf::from("project/scene/shadowGenerators/abc.json"));
    }

    #[test]
    fn test_geometry_file_name() {
        let layout = SceneLayout::default();
        assert_eq!(
            layout.geometry_file_name("geo").unwrap(),
            "geo.babylonbinarymeshdata"
        );
    }

    #[test]
    fn test_rejects_path_traversal() {
        for id in ["../evil", "some/path", "some\\path", ""] {
            assert!(matches!(
                SceneLayout::validate_id(id),
                Err(SceneError::InvalidEntityId(_))
            ));
        }
    }

    #[test]
    fn test_cameras_have_no_descriptor_dir() {
        let layout = SceneLayout::default();
        assert!(layout
            .entity_path(Path::new("s"), EntityKind::Camera, "cam")
            .is_err());
    }

    #[test]
    fn test_default_layout() {
        let layout = SceneLayout::default();
        assert_eq!(layout.config_file, "config.json");
        assert_eq!(layout.json_indent, 4);
        assert_eq!(layout.delay_load_poll_interval, Duration::from_millis(150));
        assert_eq!(layout.all_dirs().len(), 5);
    }
}
