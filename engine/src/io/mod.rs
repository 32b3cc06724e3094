//! Scene directory persistence
//!
//! A scene is stored as a directory with one JSON descriptor per entity,
//! binary geometry files, and a `config.json` holding the environment and
//! the editor camera. [`save_scene`] writes a world into such a directory
//! and removes stale files; [`load_scene`] rebuilds a world from it.

pub mod descriptor;
mod entity_mapper;
mod error;
pub mod fs;
pub mod geometry_file;
mod load;
mod report;
mod save;

pub use entity_mapper::{resolve_references, EntityMapper, ResolveOutcome, PARENT_SEARCH_ORDER};
pub use error::{GeometryFileError, SceneError};
pub use fs::{FileSystem, OsFileSystem};
pub use load::load_scene;
pub use report::{EntityFailure, LoadReport, SaveReport};
pub use save::save_scene;
