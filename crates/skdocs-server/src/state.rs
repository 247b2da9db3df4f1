//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use skdocs_meta::MetadataStore;
use skdocs_site::DocsCache;

use crate::search::SearchClient;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Cached page and index reads.
    pub(crate) docs: DocsCache,
    /// Metadata store for vote writes.
    pub(crate) store: Arc<dyn MetadataStore>,
    /// Search backend (`None` disables search routes).
    pub(crate) search: Option<Arc<SearchClient>>,
    /// Versions accepted in request paths.
    pub(crate) versions: Vec<String>,
    /// Languages accepted in request paths.
    pub(crate) languages: Vec<String>,
}
