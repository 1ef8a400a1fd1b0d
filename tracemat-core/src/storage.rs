//! File store abstraction
//!
//! Every read and write the core performs goes through a [`FileStore`], so the parsers and the
//! table session can run against the local disk or an in-memory map in tests.

use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{TraceError, TraceResult};

/// Whole-file I/O plus the path helpers the table parser needs
pub trait FileStore {
    /// Reads the full contents of a file
    fn read_file(&self, path: &Path) -> TraceResult<String>;

    /// Replaces the full contents of a file
    fn write_file(&self, path: &Path, text: &str) -> TraceResult<()>;

    /// Lists files in `dir` whose extension is `ext` (without the dot), sorted by path
    fn list_files_with_extension(&self, dir: &Path, ext: &str) -> TraceResult<Vec<PathBuf>>;

    /// Directory containing `path`, or an empty path when there is none
    fn directory_of(&self, path: &Path) -> PathBuf {
        path.parent().map(Path::to_path_buf).unwrap_or_default()
    }

    /// Joins a file name onto a directory
    fn join_path(&self, dir: &Path, name: &str) -> PathBuf {
        dir.join(name)
    }
}

/// Final component of `path` as a string, empty when it has none
pub fn file_name_from_path(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("")
        .to_string()
}

/// Store backed by the local file system
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

impl FileStore for LocalFileStore {
    fn read_file(&self, path: &Path) -> TraceResult<String> {
        fs::read_to_string(path).map_err(|e| TraceError::io(path, e))
    }

    fn write_file(&self, path: &Path, text: &str) -> TraceResult<()> {
        fs::write(path, text).map_err(|e| TraceError::io(path, e))?;
        debug!("wrote {} bytes to {:?}", text.len(), path);
        Ok(())
    }

    fn list_files_with_extension(&self, dir: &Path, ext: &str) -> TraceResult<Vec<PathBuf>> {
        // A missing directory is an error rather than an empty match
        fs::metadata(dir).map_err(|e| TraceError::io(dir, e))?;

        let dir_text = dir.to_str().ok_or_else(|| {
            TraceError::io(
                dir,
                io::Error::new(io::ErrorKind::InvalidInput, "directory is not valid UTF-8"),
            )
        })?;
        let pattern = format!(
            "{}/*.{}",
            glob::Pattern::escape(dir_text),
            glob::Pattern::escape(ext)
        );

        let entries = glob::glob(&pattern).map_err(|e| {
            TraceError::io(dir, io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                TraceError::io(path, e.into_error())
            })?;
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        debug!("found {} *.{} files in {:?}", files.len(), ext, dir);

        Ok(files)
    }
}

/// Store backed by a map of path to contents, for tests and previews
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: RwLock<BTreeMap<PathBuf, String>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_file(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let files = match self.files.get_mut() {
            Ok(files) => files,
            Err(err) => err.into_inner(),
        };
        files.insert(path.into(), text.into());
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) -> TraceResult<()> {
        let path = path.into();
        let mut files = self.files.write().map_err(|_| poisoned(&path))?;
        files.insert(path, text.into());
        Ok(())
    }

    /// Current contents of a file, if present
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .read()
            .ok()
            .and_then(|files| files.get(path.as_ref()).cloned())
    }
}

fn poisoned(path: &Path) -> TraceError {
    TraceError::io(path, io::Error::new(io::ErrorKind::Other, "file map poisoned"))
}

impl FileStore for MemoryFileStore {
    fn read_file(&self, path: &Path) -> TraceResult<String> {
        let files = self.files.read().map_err(|_| poisoned(path))?;
        files.get(path).cloned().ok_or_else(|| {
            TraceError::io(path, io::Error::new(io::ErrorKind::NotFound, "no such file"))
        })
    }

    fn write_file(&self, path: &Path, text: &str) -> TraceResult<()> {
        self.insert(path, text)
    }

    fn list_files_with_extension(&self, dir: &Path, ext: &str) -> TraceResult<Vec<PathBuf>> {
        let files = self.files.read().map_err(|_| poisoned(dir))?;

        Ok(files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(ext))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_local_store_round_trip() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("x.list");
        let store = LocalFileStore::new();

        store.write_file(&path, "1, Alpha\n")?;
        assert_eq!(store.read_file(&path)?, "1, Alpha\n");

        Ok(())
    }

    #[test]
    fn test_local_store_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = LocalFileStore::new()
            .read_file(&dir.path().join("missing.list"))
            .unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_list_files_with_extension_sorted() -> anyhow::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("b.list"), "")?;
        fs::write(dir.path().join("a.list"), "")?;
        fs::write(dir.path().join("c.table"), "")?;

        let store = LocalFileStore::new();
        let lists = store.list_files_with_extension(dir.path(), "list")?;
        let names: Vec<String> = lists.iter().map(|p| file_name_from_path(p)).collect();
        assert_eq!(names, vec!["a.list", "b.list"]);

        let tables = store.list_files_with_extension(dir.path(), "table")?;
        assert_eq!(tables.len(), 1);

        Ok(())
    }

    #[test]
    fn test_path_helpers() {
        let store = MemoryFileStore::new();
        let dir = store.directory_of(Path::new("/data/matrix.table"));
        assert_eq!(dir, PathBuf::from("/data"));
        assert_eq!(store.join_path(&dir, "x.list"), PathBuf::from("/data/x.list"));
        assert_eq!(store.directory_of(Path::new("")), PathBuf::new());
        assert_eq!(file_name_from_path(Path::new("/data/x.list")), "x.list");
    }

    #[test]
    fn test_memory_store_listing() -> anyhow::Result<()> {
        let store = MemoryFileStore::new()
            .with_file("/d/a.list", "")
            .with_file("/d/t.table", "")
            .with_file("/other/b.list", "");

        let lists = store.list_files_with_extension(Path::new("/d"), "list")?;
        assert_eq!(lists, vec![PathBuf::from("/d/a.list")]);

        Ok(())
    }

    #[test]
    fn test_listing_missing_directory_is_io_error() {
        let dir = tempdir().unwrap();
        let err = LocalFileStore::new()
            .list_files_with_extension(&dir.path().join("absent"), "list")
            .unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_listing_escapes_pattern_characters() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("trace [v2]");
        fs::create_dir(&nested)?;
        fs::write(nested.join("x.list"), "")?;
        fs::create_dir(nested.join("sub.list"))?;

        let lists = LocalFileStore::new().list_files_with_extension(&nested, "list")?;
        assert_eq!(lists, vec![nested.join("x.list")]);

        Ok(())
    }

    #[test]
    fn test_poisoned_memory_store_reports_errors() {
        let store = std::sync::Arc::new(MemoryFileStore::new().with_file("/d/x.list", "1, A"));
        let holder = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = holder.files.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(store.write_file(Path::new("/d/y.list"), "2, B").unwrap_err().is_io());
        assert!(store.read_file(Path::new("/d/x.list")).unwrap_err().is_io());
        assert!(store.insert("/d/z.list", "").is_err());
    }
}
