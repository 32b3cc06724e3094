//! Cross-platform path utilities for handling Windows and Unix paths

use std::path::{Component, Path, PathBuf};

/// Render a path with forward slashes, as stored inside descriptor files
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Express `path` relative to `base`
///
/// Falls back to `path` itself when it does not live below `base`. Only
/// lexical prefixes are compared; nothing is resolved on disk.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path = strip_current_dir(path);
    let base = strip_current_dir(base);
    match path.strip_prefix(&base) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => path,
    }
}

fn strip_current_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}
