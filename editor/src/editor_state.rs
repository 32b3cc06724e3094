//! Main editor state management
//!
//! This module contains the EditorState struct which owns the live world,
//! the open project and scene paths, the console and the change observers.

use crate::console::Console;
use crate::observables::Observable;
use engine::config::SceneLayout;
use engine::core::entity::{Entity, World};
use engine::graphics::PrimitiveLibrary;
use std::path::{Path, PathBuf};
use tracing::info;

/// Main editor state that manages all editor functionality
pub struct EditorState {
    /// The scene being edited
    pub world: World,
    /// Layout used when saving and loading scenes
    pub layout: SceneLayout,
    /// Path of the open project file
    pub project_path: Option<PathBuf>,
    /// Scene directory saved with the project
    pub last_opened_scene_path: Option<PathBuf>,
    /// Currently selected entity in the hierarchy
    pub selected_entity: Option<Entity>,
    pub console: Console,
    pub primitives: PrimitiveLibrary,
    /// Fired after nodes were added to the world
    pub on_nodes_added: Observable<()>,
    /// Fired with the scene directory after a scene was loaded
    pub on_scene_loaded: Observable<PathBuf>,
    /// Fired with the project file after the project was saved
    pub on_project_saved: Observable<PathBuf>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    /// Create a new editor state with an empty world and no project
    pub fn new() -> Self {
        info!("Initializing editor state");
        Self {
            world: World::new(),
            layout: SceneLayout::default(),
            project_path: None,
            last_opened_scene_path: None,
            selected_entity: None,
            console: Console::new(),
            primitives: PrimitiveLibrary::new(),
            on_nodes_added: Observable::new(),
            on_scene_loaded: Observable::new(),
            on_project_saved: Observable::new(),
        }
    }

    /// Directory containing the project file
    pub fn project_dir(&self) -> Option<&Path> {
        self.project_path.as_deref().and_then(Path::parent)
    }

    /// Select an entity, or clear the selection
    pub fn select(&mut self, entity: Option<Entity>) {
        self.selected_entity = entity.filter(|&e| self.world.contains(e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::core::entity::Transform;

    #[test]
    fn test_project_dir() {
        let mut state = EditorState::new();
        assert!(state.project_dir().is_none());

        state.project_path = Some(PathBuf::from("/projects/demo/demo.project"));
        assert_eq!(state.project_dir(), Some(Path::new("/projects/demo")));
    }

    #[test]
    fn test_select_ignores_dead_entities() {
        let mut state = EditorState::new();
        let node = state.world.spawn_transform_node("n", "Node", Transform::default());
        state.select(Some(node));
        assert_eq!(state.selected_entity, Some(node));

        state.world.remove_entity(node);
        state.select(Some(node));
        assert_eq!(state.selected_entity, None);
    }
}
