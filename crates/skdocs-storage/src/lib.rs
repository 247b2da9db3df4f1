//! File-system access for SK Docs content.
//!
//! This crate provides a [`Storage`] trait that abstracts the three file-system
//! operations the content layer needs: listing a directory, reading a page body
//! and reading file timestamps. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Call-count instrumentation** to verify cache behaviour
//! - **Clean separation** between content resolution and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `list_dir()`, `read()` and `stat()` methods
//! - [`FsStorage`] implementation rooted at a content directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::{Path, PathBuf};
//! use skdocs_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("data/pages"));
//! for entry in storage.list_dir(Path::new("v1/en-US/Doc"))? {
//!     println!("{} (dir: {})", entry.name, entry.is_dir);
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{DirEntry, FileStat, Storage, StorageError, StorageErrorKind};
