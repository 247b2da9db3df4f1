//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading content from a root directory on the
//! local filesystem.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::storage::{DirEntry, FileStat, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage implementation.
///
/// All paths are resolved relative to `root`. Hidden entries (dot files) are
/// never listed.
///
/// # Example
///
/// ```ignore
/// use std::path::{Path, PathBuf};
/// use skdocs_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("data/pages"));
/// let body = storage.read(Path::new("v1/en-US/Doc/01_Get_Started/01_Introduction.html"))?;
/// ```
#[derive(Debug)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory of this storage.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate that a path doesn't escape the root directory.
    ///
    /// Rejects absolute paths and paths containing parent directory
    /// components (`..`).
    fn resolve(&self, path: &Path) -> Result<PathBuf, StorageError> {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));

        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(self.root.join(path))
    }
}

impl Storage for FsStorage {
    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>, StorageError> {
        let full_path = self.resolve(path)?;
        let read_dir = fs::read_dir(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry
                .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            // Follows symlinks so linked category folders behave like real ones
            let is_dir = entry.path().is_dir();
            entries.push(DirEntry { name, is_dir });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::trace!(path = %full_path.display(), count = entries.len(), "Listed directory");
        Ok(entries)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        let full_path = self.resolve(path)?;
        fs::read_to_string(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))
    }

    fn stat(&self, path: &Path) -> Result<FileStat, StorageError> {
        let full_path = self.resolve(path)?;
        let metadata = fs::metadata(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;
        let modified = metadata
            .modified()
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;

        Ok(FileStat {
            size: metadata.len(),
            accessed: metadata.accessed().unwrap_or(modified),
            modified,
            created: metadata.created().unwrap_or(modified),
        })
    }
}
