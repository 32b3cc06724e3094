//! Headless core of the scene editor
//!
//! This crate provides the editor state around a live scene, the project
//! file wrapper that opens and saves scenes, scene editing operations, and
//! the console and observers a UI layer hooks into.

pub mod console;
pub mod editor_state;
pub mod observables;
pub mod project;
pub mod scene_operations;

pub use console::{Console, ConsoleLine, LogLevel};
pub use editor_state::EditorState;
pub use observables::{Observable, ObserverHandle};
pub use project::{load_project, save_project, ProjectDescriptor, ProjectError};
