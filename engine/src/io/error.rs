//! Errors raised by the persistence pipeline

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during scene operations
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("The scene path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Scene configuration not found: {}", .0.display())]
    MissingConfig(PathBuf),

    #[error("Invalid entity id: {0:?}")]
    InvalidEntityId(String),

    #[error("Invalid geometry file {}: {source}", path.display())]
    InvalidGeometryFile {
        path: PathBuf,
        #[source]
        source: GeometryFileError,
    },

    #[error("No light with id {0:?} to attach the shadow generator to")]
    MissingLight(String),
}

impl SceneError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        SceneError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        SceneError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Problems decoding a binary geometry file
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeometryFileError {
    #[error("file is shorter than the geometry header")]
    TooShort,

    #[error("unknown file signature")]
    BadMagic,

    #[error("unsupported geometry file version {0}")]
    UnsupportedVersion(u32),

    #[error("expected {expected} bytes of geometry data, found {actual}")]
    Truncated { expected: usize, actual: usize },
}
