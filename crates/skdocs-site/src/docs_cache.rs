//! Cached page and index reads.
//!
//! [`DocsCache`] is built once at startup and shared by every request. It
//! owns two independent tables, pages and indices, each with the same TTL.
//! Entries expire a fixed time after insertion; reads never extend them.
//! Concurrent misses on one key resolve once, failed resolves are never
//! stored, and clearing drops a whole table.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use skdocs_cache::{Clock, SystemClock, TtlCache};
use skdocs_meta::MetadataStore;
use skdocs_storage::Storage;

use crate::error::ResolveError;
use crate::index::IndexItem;
use crate::layout::DocType;
use crate::page::{DocumentationFile, PageLocation, PageName, PageResolver};
use crate::products::ProductLinks;
use crate::recommended::RecommendedItem;

/// Tables are swept for expired entries once they hold this many times the
/// expected page count.
const PURGE_FACTOR: usize = 4;

/// Cache tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheSettings {
    /// Entry lifetime. Zero disables caching.
    pub ttl: Duration,
    /// Number of pages in the content tree, used for `percentage_cached`.
    pub expected_page_count: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            expected_page_count: 97,
        }
    }
}

/// Cache table selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheScope {
    Pages,
    Indices,
    All,
}

impl CacheScope {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pages => "pages",
            Self::Indices => "indices",
            Self::All => "all",
        }
    }
}

impl fmt::Display for CacheScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`CacheScope`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cache type: {0:?}")]
pub struct ParseCacheScopeError(String);

impl FromStr for CacheScope {
    type Err = ParseCacheScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pages" => Ok(Self::Pages),
            "indices" => Ok(Self::Indices),
            "all" => Ok(Self::All),
            other => Err(ParseCacheScopeError(other.to_owned())),
        }
    }
}

/// Page table report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageCacheDetails {
    pub size: usize,
    /// Share of the expected page count held in the table, two decimals.
    pub percentage_cached: f64,
    pub last_addition: Option<DateTime<Utc>>,
}

/// Index table report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndexCacheDetails {
    pub size: usize,
    pub last_addition: Option<DateTime<Utc>>,
}

/// Report returned by [`DocsCache::cache_details`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CacheDetails {
    Pages(PageCacheDetails),
    Indices(IndexCacheDetails),
    All {
        pages: PageCacheDetails,
        indices: IndexCacheDetails,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct PageKey {
    location: PageLocation,
    name: PageName,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct IndexKey {
    version: String,
    language: String,
    doc_type: DocType,
}

/// Cached documentation reads.
#[derive(Debug)]
pub struct DocsCache {
    resolver: PageResolver,
    pages: TtlCache<PageKey, DocumentationFile>,
    indices: TtlCache<IndexKey, Vec<IndexItem>>,
    expected_page_count: usize,
}

impl DocsCache {
    /// Create a cache with empty tables on the system clock.
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        store: Arc<dyn MetadataStore>,
        products: ProductLinks,
        settings: CacheSettings,
    ) -> Self {
        Self::with_clock(storage, store, products, settings, Arc::new(SystemClock))
    }

    /// Create a cache with empty tables on the given clock.
    #[must_use]
    pub fn with_clock(
        storage: Arc<dyn Storage>,
        store: Arc<dyn MetadataStore>,
        products: ProductLinks,
        settings: CacheSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver: PageResolver::new(storage, store, products),
            pages: TtlCache::new(settings.ttl, Arc::clone(&clock)),
            indices: TtlCache::new(settings.ttl, clock),
            expected_page_count: settings.expected_page_count,
        }
    }

    /// Seed the related-image picker.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.resolver = self.resolver.with_rng_seed(seed);
        self
    }

    /// Return a listed page, resolving and charging a view on miss.
    ///
    /// A hit returns the stored record as is, view count included.
    ///
    /// # Errors
    ///
    /// Returns the resolve error of a miss. Errors are not cached.
    pub async fn get_cached_file(
        &self,
        location: &PageLocation,
        name: &str,
    ) -> Result<DocumentationFile, ResolveError> {
        self.get_cached_page(location, PageName::Named(name.to_owned()))
            .await
    }

    /// Return a category's landing page, resolving and charging a view on
    /// miss.
    ///
    /// # Errors
    ///
    /// Returns the resolve error of a miss. Errors are not cached.
    pub async fn get_cached_default(
        &self,
        location: &PageLocation,
    ) -> Result<DocumentationFile, ResolveError> {
        self.get_cached_page(location, PageName::Default).await
    }

    /// Re-resolve a listed page without charging a view and replace its
    /// cached entry.
    ///
    /// # Errors
    ///
    /// Returns the resolve error; the previous entry is kept in that case.
    pub async fn refresh_file(
        &self,
        location: &PageLocation,
        name: &str,
    ) -> Result<DocumentationFile, ResolveError> {
        let name = PageName::Named(name.to_owned());
        let file = self
            .resolver
            .resolve(location, &name, false)
            .await
            .inspect_err(|e| log_resolve_error(e, location, &name))?;

        tracing::debug!(%location, page = %name, "Refreshed cached page");
        self.pages.insert(
            PageKey {
                location: location.clone(),
                name,
            },
            file.clone(),
        );
        self.purge_if_oversized();
        Ok(file)
    }

    async fn get_cached_page(
        &self,
        location: &PageLocation,
        name: PageName,
    ) -> Result<DocumentationFile, ResolveError> {
        let key = PageKey {
            location: location.clone(),
            name,
        };
        if let Some(file) = self.pages.get(&key) {
            tracing::debug!(%location, page = %key.name, "Page cache hit");
            return Ok(file);
        }

        let resolver = &self.resolver;
        let page = key.name.clone();
        let name = &page;
        let result = self
            .pages
            .get_or_try_insert_with(key, move || async move {
                let started = Instant::now();
                let file = resolver.resolve(location, name, true).await;
                tracing::debug!(
                    %location,
                    page = %name,
                    elapsed_ms = started.elapsed().as_millis(),
                    "Page cache miss"
                );
                file
            })
            .await
            .inspect_err(|e| log_resolve_error(e, location, name));

        self.purge_if_oversized();
        result
    }

    /// Return the table of contents of a partition, resolving on miss.
    ///
    /// # Errors
    ///
    /// Returns the resolve error of a miss. Errors are not cached.
    pub async fn get_cached_index(
        &self,
        version: &str,
        language: &str,
        doc_type: DocType,
    ) -> Result<Vec<IndexItem>, ResolveError> {
        let key = IndexKey {
            version: version.to_owned(),
            language: language.to_owned(),
            doc_type,
        };
        if let Some(index) = self.indices.get(&key) {
            tracing::debug!(version, language, doc_type = %doc_type, "Index cache hit");
            return Ok(index);
        }

        let resolver = &self.resolver;
        let result = self
            .indices
            .get_or_try_insert_with(key, move || async move {
                let started = Instant::now();
                let index = resolver.resolve_index(version, language, doc_type);
                tracing::debug!(
                    version,
                    language,
                    doc_type = %doc_type,
                    elapsed_ms = started.elapsed().as_millis(),
                    "Index cache miss"
                );
                index
            })
            .await
            .inspect_err(|e| {
                if !e.is_not_found() {
                    tracing::error!(version, language, doc_type = %doc_type, error = %e, "Failed to resolve index");
                }
            });

        self.purge_if_oversized();
        result
    }

    /// Return the featured pages of one language and type.
    ///
    /// Always read through; featured rows are edited in the database and
    /// are small.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Store`] if the metadata store fails.
    pub async fn get_recommended(
        &self,
        language: &str,
        doc_type: DocType,
    ) -> Result<Vec<RecommendedItem>, ResolveError> {
        self.resolver
            .resolve_recommended(language, doc_type)
            .await
            .inspect_err(|e| {
                tracing::error!(language, doc_type = %doc_type, error = %e, "Failed to load recommended items");
            })
    }

    /// Drop every entry of the selected table(s).
    pub fn clear_cache(&self, scope: CacheScope) {
        if matches!(scope, CacheScope::Pages | CacheScope::All) {
            self.pages.clear();
        }
        if matches!(scope, CacheScope::Indices | CacheScope::All) {
            self.indices.clear();
        }
        tracing::info!(scope = %scope, "Cleared documentation cache");
    }

    /// Report size and last insertion of the selected table(s).
    #[must_use]
    pub fn cache_details(&self, scope: CacheScope) -> CacheDetails {
        match scope {
            CacheScope::Pages => CacheDetails::Pages(self.page_details()),
            CacheScope::Indices => CacheDetails::Indices(self.index_details()),
            CacheScope::All => CacheDetails::All {
                pages: self.page_details(),
                indices: self.index_details(),
            },
        }
    }

    /// Drop expired entries from both tables and return how many went.
    pub fn purge_expired(&self) -> usize {
        self.pages.purge_expired() + self.indices.purge_expired()
    }

    fn page_details(&self) -> PageCacheDetails {
        let size = self.pages.len();
        PageCacheDetails {
            size,
            percentage_cached: percentage(size, self.expected_page_count),
            last_addition: self.pages.last_insertion(),
        }
    }

    fn index_details(&self) -> IndexCacheDetails {
        IndexCacheDetails {
            size: self.indices.len(),
            last_addition: self.indices.last_insertion(),
        }
    }

    fn purge_if_oversized(&self) {
        let limit = self.expected_page_count.max(1).saturating_mul(PURGE_FACTOR);
        if self.pages.len() > limit || self.indices.len() > limit {
            let purged = self.purge_expired();
            tracing::debug!(purged, "Purged expired cache entries");
        }
    }
}

/// `size / total` as a percentage rounded to two decimals.
#[allow(clippy::cast_precision_loss)]
fn percentage(size: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = size as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

fn log_resolve_error(err: &ResolveError, location: &PageLocation, name: &PageName) {
    if !err.is_not_found() {
        tracing::error!(%location, page = %name, error = %err, "Failed to resolve page");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;
    use skdocs_cache::ManualClock;
    use skdocs_meta::{MetadataRow, MockMetadataStore, RecommendedRow};
    use skdocs_storage::MockStorage;

    const TTL: Duration = Duration::from_secs(24 * 60 * 60);

    struct Fixture {
        storage: Arc<MockStorage>,
        store: Arc<MockMetadataStore>,
        clock: Arc<ManualClock>,
        cache: Arc<DocsCache>,
    }

    fn row(id: i64, name: &str) -> MetadataRow {
        MetadataRow {
            id,
            doc_type: "Doc".to_owned(),
            category: "Products".to_owned(),
            name: name.to_owned(),
            products: None,
            related: None,
            icon: None,
            view_count: 0,
        }
    }

    fn fixture_with(ttl: Duration) -> Fixture {
        let storage = Arc::new(
            MockStorage::new()
                .with_file("v1/en-US/Doc/01_Get_Started/01_Introduction.html", "<h1>Intro</h1>")
                .with_file("v1/en-US/Doc/02_Products/00_Default.html", "<h1>Products</h1>")
                .with_file("v1/en-US/Doc/02_Products/01_Bots.html", "<h1>Bots</h1>")
                .with_file("v1/en-US/Doc/02_Products/02_Nexus.html", "<h1>Nexus</h1>")
                .with_file("v1/en-US/Guide/01_Plans/01_Basic.html", "<h1>Basic</h1>"),
        );
        let store = Arc::new(
            MockMetadataStore::new()
                .with_row(row(1, "Bots"))
                .with_row(row(2, "Nexus"))
                .with_row(row(3, "Default"))
                .with_recommended(
                    "en-US",
                    RecommendedRow {
                        id: 1,
                        doc_type: "Doc".to_owned(),
                        category: "Products".to_owned(),
                        page: "Bots".to_owned(),
                        anchor: None,
                        icon: None,
                        time: Some(3),
                    },
                ),
        );
        let clock = Arc::new(ManualClock::default());
        let cache = DocsCache::with_clock(
            Arc::clone(&storage) as Arc<dyn Storage>,
            Arc::clone(&store) as Arc<dyn MetadataStore>,
            ProductLinks::default(),
            CacheSettings {
                ttl,
                expected_page_count: 4,
            },
            Arc::clone(&clock) as Arc<dyn Clock>,
        )
        .with_rng_seed(1);

        Fixture {
            storage,
            store,
            clock,
            cache: Arc::new(cache),
        }
    }

    fn fixture() -> Fixture {
        fixture_with(TTL)
    }

    fn products() -> PageLocation {
        PageLocation::new("v1", "en-US", DocType::Doc, "Products")
    }

    fn storage_calls(storage: &MockStorage) -> usize {
        storage.list_calls() + storage.read_calls() + storage.stat_calls()
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let fx = fixture();

        let first = fx.cache.get_cached_file(&products(), "Bots").await.unwrap();
        let calls_after_miss = storage_calls(&fx.storage);
        let second = fx.cache.get_cached_file(&products(), "Bots").await.unwrap();

        assert_eq!(first.file_contents, second.file_contents);
        assert_eq!(storage_calls(&fx.storage), calls_after_miss);
        assert_eq!(fx.store.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_view_charged_once_per_miss() {
        let fx = fixture();

        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();

        assert_eq!(fx.store.view_count(1), Some(1));
    }

    #[tokio::test]
    async fn test_refresh_does_not_charge_and_replaces_entry() {
        let fx = fixture();
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();
        fx.storage
            .set_file("v1/en-US/Doc/02_Products/01_Bots.html", "<h1>Bots v2</h1>");

        let refreshed = fx.cache.refresh_file(&products(), "Bots").await.unwrap();
        let cached = fx.cache.get_cached_file(&products(), "Bots").await.unwrap();

        assert_eq!(refreshed.file_contents, "<h1>Bots v2</h1>");
        assert_eq!(cached.file_contents, "<h1>Bots v2</h1>");
        assert_eq!(fx.store.view_count(1), Some(1));
        assert_eq!(fx.store.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_clear_pages_forces_fresh_resolve() {
        let fx = fixture();
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();

        fx.cache.clear_cache(CacheScope::Pages);
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();

        assert_eq!(fx.store.fetch_calls(), 2);
        assert_eq!(fx.store.view_count(1), Some(2));
    }

    #[tokio::test]
    async fn test_clear_all_clears_both_tables() {
        let fx = fixture();
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();
        fx.cache
            .get_cached_index("v1", "en-US", DocType::Doc)
            .await
            .unwrap();

        fx.cache.clear_cache(CacheScope::All);

        let CacheDetails::All { pages, indices } = fx.cache.cache_details(CacheScope::All) else {
            panic!("expected both reports");
        };
        assert_eq!(pages.size, 0);
        assert_eq!(indices.size, 0);
    }

    #[tokio::test]
    async fn test_clear_indices_keeps_pages() {
        let fx = fixture();
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();
        fx.cache
            .get_cached_index("v1", "en-US", DocType::Doc)
            .await
            .unwrap();

        fx.cache.clear_cache(CacheScope::Indices);

        assert_eq!(
            fx.cache.cache_details(CacheScope::Indices),
            CacheDetails::Indices(IndexCacheDetails {
                size: 0,
                last_addition: Some(fx.clock.now()),
            })
        );
        let CacheDetails::Pages(pages) = fx.cache.cache_details(CacheScope::Pages) else {
            panic!("expected page report");
        };
        assert_eq!(pages.size, 1);
    }

    #[tokio::test]
    async fn test_entry_fresh_just_before_ttl() {
        let fx = fixture();
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();

        fx.clock.advance(TTL - Duration::from_millis(1));
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();

        assert_eq!(fx.store.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_entry_stale_just_after_ttl() {
        let fx = fixture();
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();

        fx.clock.advance(TTL + Duration::from_millis(1));
        let file = fx.cache.get_cached_file(&products(), "Bots").await.unwrap();

        assert_eq!(fx.store.fetch_calls(), 2);
        // The second miss sees the first miss's charge
        assert_eq!(file.view_count, 1);
    }

    #[tokio::test]
    async fn test_failed_resolve_is_not_cached() {
        let fx = fixture();
        fx.store.set_unavailable(true);

        let err = fx.cache.get_cached_file(&products(), "Bots").await.unwrap_err();
        assert!(matches!(err, ResolveError::Store(_)));

        fx.store.set_unavailable(false);
        let file = fx.cache.get_cached_file(&products(), "Bots").await.unwrap();

        assert_eq!(file.name, "Bots");
        assert_eq!(fx.store.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let fx = fixture();

        let err = fx.cache.get_cached_file(&products(), "Ghost").await.unwrap_err();
        assert!(err.is_not_found());

        fx.storage
            .set_file("v1/en-US/Doc/02_Products/03_Ghost.html", "<h1>Boo</h1>");
        let file = fx.cache.get_cached_file(&products(), "Ghost").await.unwrap();

        assert_eq!(file.file_contents, "<h1>Boo</h1>");
    }

    #[tokio::test]
    async fn test_default_and_named_pages_use_distinct_keys() {
        let fx = fixture();

        let landing = fx.cache.get_cached_default(&products()).await.unwrap();
        let named = fx.cache.get_cached_file(&products(), "Bots").await.unwrap();

        assert_eq!(landing.file_contents, "<h1>Products</h1>");
        assert_eq!(named.file_contents, "<h1>Bots</h1>");
        assert_eq!(fx.store.view_count(3), Some(1));
    }

    #[tokio::test]
    async fn test_concurrent_misses_resolve_once() {
        let fx = fixture();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&fx.cache);
                tokio::spawn(async move { cache.get_cached_file(&products(), "Bots").await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(fx.store.fetch_calls(), 1);
        assert_eq!(fx.store.view_count(1), Some(1));
    }

    #[tokio::test]
    async fn test_index_cached_and_expires() {
        let fx = fixture();

        let index = fx
            .cache
            .get_cached_index("v1", "en-US", DocType::Doc)
            .await
            .unwrap();
        let lists_after_miss = fx.storage.list_calls();
        fx.cache
            .get_cached_index("v1", "en-US", DocType::Doc)
            .await
            .unwrap();

        let categories: Vec<&str> = index.iter().map(|i| i.category.as_str()).collect();
        assert_eq!(categories, vec!["Get_Started", "Products"]);
        assert_eq!(fx.storage.list_calls(), lists_after_miss);

        fx.clock.advance(TTL);
        fx.cache
            .get_cached_index("v1", "en-US", DocType::Doc)
            .await
            .unwrap();
        assert!(fx.storage.list_calls() > lists_after_miss);
    }

    #[tokio::test]
    async fn test_index_tables_are_keyed_by_type() {
        let fx = fixture();

        let doc = fx
            .cache
            .get_cached_index("v1", "en-US", DocType::Doc)
            .await
            .unwrap();
        let guide = fx
            .cache
            .get_cached_index("v1", "en-US", DocType::Guide)
            .await
            .unwrap();

        assert_eq!(doc.len(), 2);
        assert_eq!(guide.len(), 1);
        assert_eq!(guide[0].category, "Plans");
    }

    #[tokio::test]
    async fn test_missing_index_is_not_found() {
        let fx = fixture();

        let err = fx
            .cache
            .get_cached_index("v2", "en-US", DocType::Doc)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_page_details_report() {
        let fx = fixture();
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();
        fx.clock.advance(Duration::from_secs(5));
        fx.cache.get_cached_file(&products(), "Nexus").await.unwrap();
        fx.cache
            .get_cached_file(
                &PageLocation::new("v1", "en-US", DocType::Doc, "Get_Started"),
                "Introduction",
            )
            .await
            .unwrap();

        assert_eq!(
            fx.cache.cache_details(CacheScope::Pages),
            CacheDetails::Pages(PageCacheDetails {
                size: 3,
                percentage_cached: 75.0,
                last_addition: Some(fx.clock.now()),
            })
        );
    }

    #[test]
    fn test_details_before_any_insert() {
        let fx = fixture();

        let json = serde_json::to_value(fx.cache.cache_details(CacheScope::All)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "pages": { "size": 0, "percentage_cached": 0.0, "last_addition": null },
                "indices": { "size": 0, "last_addition": null },
            })
        );
    }

    #[tokio::test]
    async fn test_disabled_cache_always_resolves() {
        let fx = fixture_with(Duration::ZERO);

        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();

        assert_eq!(fx.store.fetch_calls(), 2);
        assert_eq!(fx.store.view_count(1), Some(2));
    }

    #[tokio::test]
    async fn test_purge_expired_drops_stale_entries() {
        let fx = fixture();
        fx.cache.get_cached_file(&products(), "Bots").await.unwrap();
        fx.clock.advance(TTL);
        fx.cache.get_cached_file(&products(), "Nexus").await.unwrap();

        assert_eq!(fx.cache.purge_expired(), 1);

        let CacheDetails::Pages(pages) = fx.cache.cache_details(CacheScope::Pages) else {
            panic!("expected page report");
        };
        assert_eq!(pages.size, 1);
    }

    #[tokio::test]
    async fn test_oversized_table_is_swept() {
        let fx = fixture_with(Duration::ZERO);
        // expected_page_count is 4, so the sweep kicks in above 16 entries
        let location = PageLocation::new("v1", "en-US", DocType::Doc, "Get_Started");
        for i in 0..20 {
            fx.storage
                .set_file(format!("v1/en-US/Doc/01_Get_Started/{i:02}_Page{i}.html"), "");
            fx.cache
                .get_cached_file(&location, &format!("Page{i}"))
                .await
                .unwrap();
        }

        let CacheDetails::Pages(pages) = fx.cache.cache_details(CacheScope::Pages) else {
            panic!("expected page report");
        };
        assert!(pages.size <= 16, "table grew to {}", pages.size);
    }

    #[test]
    fn test_cache_scope_parse() {
        assert_eq!("pages".parse::<CacheScope>(), Ok(CacheScope::Pages));
        assert_eq!("indices".parse::<CacheScope>(), Ok(CacheScope::Indices));
        assert_eq!("all".parse::<CacheScope>(), Ok(CacheScope::All));
        assert!("files".parse::<CacheScope>().is_err());
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        assert!((percentage(1, 97) - 1.03).abs() < f64::EPSILON);
        assert!((percentage(97, 97) - 100.0).abs() < f64::EPSILON);
        assert!(percentage(3, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_settings() {
        let settings = CacheSettings::default();

        assert_eq!(
            TimeDelta::from_std(settings.ttl).unwrap(),
            TimeDelta::hours(24)
        );
        assert_eq!(settings.expected_page_count, 97);
    }

    #[tokio::test]
    async fn test_recommended_items_are_read_through() {
        let f = fixture();

        let items = f.cache.get_recommended("en-US", DocType::Doc).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].page, "Bots");
        assert_eq!(items[0].time, Some(3));

        f.store.set_unavailable(true);
        let err = f
            .cache
            .get_recommended("en-US", DocType::Doc)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Store(_)));
    }
}
