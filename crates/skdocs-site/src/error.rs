//! Resolve error taxonomy.

use skdocs_meta::StoreError;
use skdocs_storage::StorageError;

/// Error returned by the directory, index and page resolvers.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Requested version, language, type, category or page does not exist.
    #[error("Not found: {what}")]
    NotFound {
        /// Human-readable description of the missing item.
        what: String,
    },
    /// More than one category folder strips to the same name.
    #[error("Category {folder:?} is ambiguous: {}", .matches.join(", "))]
    AmbiguousFolder {
        /// Requested category.
        folder: String,
        /// On-disk folder names that matched.
        matches: Vec<String>,
    },
    /// More than one page file strips to the same slug.
    #[error("Page {page:?} is ambiguous: {}", .matches.join(", "))]
    AmbiguousPage {
        /// Requested page slug.
        page: String,
        /// On-disk file names that matched.
        matches: Vec<String>,
    },
    /// File-system failure other than "not found".
    #[error("Storage error: {0}")]
    Storage(StorageError),
    /// Metadata store failure.
    #[error("Metadata store error: {0}")]
    Store(#[from] StoreError),
}

impl ResolveError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// True if the requested content does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<StorageError> for ResolveError {
    fn from(err: StorageError) -> Self {
        if err.is_not_found() {
            let what = err
                .path()
                .map_or_else(|| "path".to_owned(), |p| p.display().to_string());
            Self::NotFound { what }
        } else {
            Self::Storage(err)
        }
    }
}
