//! Content resolution and caching for SK Docs.
//!
//! This crate provides:
//! - [`DocsCache`]: cached page and index reads, the entry point for callers
//! - [`PageResolver`]: uncached page resolution from storage and metadata
//! - [`resolve_index`]: table of contents of one `Doc`/`Guide` partition
//! - [`resolve_category_folder`]: `NN_`-prefixed folder lookup
//! - [`ProductLinks`]: product tag classification
//!
//! # Quick Start
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use skdocs_meta::SqlMetadataStore;
//! use skdocs_site::{CacheSettings, DocType, DocsCache, PageLocation, ProductLinks};
//! use skdocs_storage::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("data/pages")));
//! let store = Arc::new(SqlMetadataStore::connect_lazy("sqlite::memory:", 1)?);
//! let cache = DocsCache::new(storage, store, ProductLinks::default(), CacheSettings::default());
//!
//! let index = cache.get_cached_index("v1", "en-US", DocType::Doc).await?;
//! let page = cache
//!     .get_cached_file(&PageLocation::new("v1", "en-US", DocType::Doc, "Products"), "Bots")
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod docs_cache;
mod error;
mod html;
mod icons;
mod index;
mod layout;
mod page;
mod products;
mod recommended;

pub use docs_cache::{
    CacheDetails, CacheScope, CacheSettings, DocsCache, IndexCacheDetails, PageCacheDetails,
    ParseCacheScopeError,
};
pub use error::ResolveError;
pub use html::{PageExtract, extract_page};
pub use icons::{FALLBACK_ICON, icon_for};
pub use index::{CategoryItem, IndexItem, resolve_index};
pub use layout::{
    DEFAULT_PAGE_FILE, DocType, PAGE_EXTENSION, ParseDocTypeError, page_slug,
    resolve_category_folder, strip_order_prefix, type_dir,
};
pub use page::{
    DEFAULT_PAGE_NAME, DocumentationFile, PageLocation, PageName, PageResolver, RelatedItem,
};
pub use products::{DocumentationProduct, ProductLinks};
pub use recommended::{RecommendedItem, resolve_recommended};
