//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use crate::storage::{DirEntry, FileStat, Storage, StorageError, StorageErrorKind};

const BACKEND: &str = "Mock";

/// Timestamp reported for files without an explicit stat.
fn default_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

/// Mock storage for testing.
///
/// Stores files in memory. Directories are implied by file paths; empty
/// directories can be added with [`MockStorage::with_dir`]. Every call is
/// counted so tests can assert how often the backend was hit.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use skdocs_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("v1/en-US/Doc/01_Get_Started/01_Intro.html", "<h1>Intro</h1>");
///
/// let entries = storage.list_dir(Path::new("v1/en-US/Doc")).unwrap();
/// assert_eq!(storage.list_calls(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<HashMap<PathBuf, String>>,
    stats: RwLock<HashMap<PathBuf, FileStat>>,
    dirs: RwLock<HashSet<PathBuf>>,
    failing: RwLock<HashSet<PathBuf>>,
    list_calls: AtomicUsize,
    read_calls: AtomicUsize,
    stat_calls: AtomicUsize,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.set_file(path, content);
        self
    }

    /// Add an empty directory.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.dirs.write().unwrap().insert(path.into());
        self
    }

    /// Override the stat reported for a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_stat(self, path: impl Into<PathBuf>, stat: FileStat) -> Self {
        self.stats.write().unwrap().insert(path.into(), stat);
        self
    }

    /// Make every operation on `path` fail with a permission error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, path: impl Into<PathBuf>) -> Self {
        self.failing.write().unwrap().insert(path.into());
        self
    }

    /// Replace or add a file after construction.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_file(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), content.into());
    }

    /// Stop failing operations on `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_failure(&self, path: &Path) {
        self.failing.write().unwrap().remove(path);
    }

    /// Number of [`Storage::list_dir`] calls so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of [`Storage::read`] calls so far.
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Number of [`Storage::stat`] calls so far.
    pub fn stat_calls(&self) -> usize {
        self.stat_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self, path: &Path) -> Result<(), StorageError> {
        if self.failing.read().unwrap().contains(path) {
            return Err(StorageError::new(StorageErrorKind::PermissionDenied)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }
}

impl Storage for MockStorage {
    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>, StorageError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(path)?;

        let files = self.files.read().unwrap();
        let dirs = self.dirs.read().unwrap();

        let mut known = path.as_os_str().is_empty() || dirs.contains(path);
        let mut children: BTreeMap<String, bool> = BTreeMap::new();

        let file_paths = files.keys().map(|p| (p, false));
        let dir_paths = dirs.iter().map(|p| (p, true));
        for (candidate, candidate_is_dir) in file_paths.chain(dir_paths) {
            let Ok(rest) = candidate.strip_prefix(path) else {
                continue;
            };
            let mut components = rest.components();
            let Some(first) = components.next() else {
                continue;
            };
            known = true;
            let is_dir = candidate_is_dir || components.next().is_some();
            let name = first.as_os_str().to_string_lossy().into_owned();
            *children.entry(name).or_insert(false) |= is_dir;
        }

        if !known {
            return Err(StorageError::not_found(path).with_backend(BACKEND));
        }

        Ok(children
            .into_iter()
            .map(|(name, is_dir)| DirEntry { name, is_dir })
            .collect())
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(path)?;

        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn stat(&self, path: &Path) -> Result<FileStat, StorageError> {
        self.stat_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(path)?;

        if let Some(stat) = self.stats.read().unwrap().get(path) {
            return Ok(*stat);
        }
        let files = self.files.read().unwrap();
        let content = files
            .get(path)
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))?;

        Ok(FileStat {
            size: content.len() as u64,
            accessed: default_time(),
            modified: default_time(),
            created: default_time(),
        })
    }
}
