//! File-system seam used by the save and load pipelines
//!
//! The pipelines never touch `std::fs` directly so tests can inject
//! failures or reorder directory listings.

use super::error::SceneError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File operations needed to persist a scene directory
pub trait FileSystem: Send + Sync {
    fn is_dir(&self, path: &Path) -> bool;

    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and its parents if missing
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Files directly inside `dir`, sorted by path
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Files anywhere below `dir`, sorted by path
    fn walk_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the contents of `path`; a failed write leaves the previous file intact
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn walk_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir) {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(contents)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;
        debug!(path = ?path, bytes = contents.len(), "Wrote file");
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(fs: &dyn FileSystem, path: &Path) -> Result<T, SceneError> {
    let bytes = fs.read(path).map_err(|e| SceneError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| SceneError::json(path, e))
}

/// Pretty-print a value as JSON with the given indentation, ending with a newline
pub fn to_json_bytes<T: Serialize>(value: &T, indent: usize) -> serde_json::Result<Vec<u8>> {
    let indent = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");

        OsFileSystem.write(&path, b"first").unwrap();
        OsFileSystem.write(&path, b"second").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        // No temp files left behind
        assert_eq!(OsFileSystem.list_files(dir.path()).unwrap(), vec![path]);
    }

    #[test]
    fn test_list_files_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("sub/c.json"), "{}").unwrap();

        let listed = OsFileSystem.list_files(dir.path()).unwrap();
        assert_eq!(listed, vec![dir.path().join("a.json"), dir.path().join("b.json")]);

        let walked = OsFileSystem.walk_files(dir.path()).unwrap();
        assert_eq!(walked.len(), 3);
        assert!(walked.contains(&dir.path().join("sub/c.json")));
    }

    #[test]
    fn test_json_indent() {
        let bytes = to_json_bytes(&json!({"a": 1}), 4).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\n    \"a\": 1\n}\n");
    }

    #[test]
    fn test_read_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let result: Result<serde_json::Value, _> = read_json(&OsFileSystem, &path);
        match result {
            Err(SceneError::Json { path: error_path, .. }) => assert_eq!(error_path, path),
            other => panic!("expected JSON error, got {other:?}"),
        }
    }
}
