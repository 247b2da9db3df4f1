//! Page resolution.
//!
//! A [`DocumentationFile`] joins three sources: the page body and file
//! timestamps from [`Storage`], chapters and description extracted from the
//! body, and view count, products and related pages from the
//! [`MetadataStore`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use skdocs_meta::{MetadataRow, MetadataStore};
use skdocs_storage::Storage;

use crate::error::ResolveError;
use crate::html::extract_page;
use crate::icons::icon_for;
use crate::index::{IndexItem, resolve_index};
use crate::layout::{
    DEFAULT_PAGE_FILE, DocType, is_listed_page, page_slug, resolve_category_folder,
};
use crate::products::{DocumentationProduct, ProductLinks, split_tags};
use crate::recommended::{RecommendedItem, resolve_recommended};

/// Store-side name of a category's landing page.
pub const DEFAULT_PAGE_NAME: &str = "Default";

/// Category a page lives in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PageLocation {
    pub version: String,
    pub language: String,
    pub doc_type: DocType,
    /// Category name without order prefix.
    pub folder: String,
}

impl PageLocation {
    /// Create a location.
    #[must_use]
    pub fn new(
        version: impl Into<String>,
        language: impl Into<String>,
        doc_type: DocType,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            language: language.into(),
            doc_type,
            folder: folder.into(),
        }
    }
}

impl fmt::Display for PageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.version, self.language, self.doc_type, self.folder
        )
    }
}

/// Page within a category.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PageName {
    /// The category's landing page (`00_Default.html`).
    Default,
    /// A listed page, by slug.
    Named(String),
}

impl PageName {
    /// Name the page is stored under in the metadata store.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => DEFAULT_PAGE_NAME,
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for PageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentationFile {
    pub name: String,
    pub category: String,
    #[serde(rename = "type")]
    pub doc_type: DocType,
    pub version: String,
    pub language: String,
    pub file_contents: String,
    pub description: String,
    pub size: u64,
    /// View count read before this fetch was charged.
    pub view_count: i64,
    pub access_time: DateTime<Utc>,
    pub modification_time: DateTime<Utc>,
    pub creation_time: DateTime<Utc>,
    /// Chapter anchors in document order. Always empty for landing pages.
    pub chapters: Vec<String>,
    pub products: Vec<DocumentationProduct>,
    pub related: Vec<RelatedItem>,
}

/// Summary card of a related page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedItem {
    pub id: i64,
    pub category: String,
    pub page: String,
    pub icon: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    /// Image of a product picked at random from the resolved page's tags.
    pub image_url: Option<String>,
}

/// Resolves pages from storage and the metadata store.
///
/// Holds no cache; see [`crate::DocsCache`].
pub struct PageResolver {
    storage: Arc<dyn Storage>,
    store: Arc<dyn MetadataStore>,
    products: ProductLinks,
    rng: Mutex<StdRng>,
}

impl fmt::Debug for PageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageResolver")
            .field("products", &self.products)
            .finish_non_exhaustive()
    }
}

impl PageResolver {
    /// Create a resolver.
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        store: Arc<dyn MetadataStore>,
        products: ProductLinks,
    ) -> Self {
        Self {
            storage,
            store,
            products,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Seed the related-image picker, making it reproducible.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Walk the table of contents of one partition.
    ///
    /// # Errors
    ///
    /// See [`resolve_index`].
    pub fn resolve_index(
        &self,
        version: &str,
        language: &str,
        doc_type: DocType,
    ) -> Result<Vec<IndexItem>, ResolveError> {
        resolve_index(self.storage.as_ref(), version, language, doc_type)
    }

    /// Load the featured pages of one language and type.
    ///
    /// # Errors
    ///
    /// See [`resolve_recommended`].
    pub async fn resolve_recommended(
        &self,
        language: &str,
        doc_type: DocType,
    ) -> Result<Vec<RecommendedItem>, ResolveError> {
        resolve_recommended(self.store.as_ref(), language, doc_type).await
    }

    /// Resolve a listed page by slug.
    ///
    /// The landing page is not reachable by name; use
    /// [`PageResolver::resolve_default`]. When `charge_view` is true the
    /// page's view counter is incremented.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] if the category or page does not
    /// exist, [`ResolveError::AmbiguousFolder`] or
    /// [`ResolveError::AmbiguousPage`] on prefix collisions, and
    /// [`ResolveError::Storage`] or [`ResolveError::Store`] on backend
    /// failures.
    pub async fn resolve_page(
        &self,
        location: &PageLocation,
        name: &str,
        charge_view: bool,
    ) -> Result<DocumentationFile, ResolveError> {
        let folder = self.category_folder(location)?;
        let file_name = self.find_page_file(&folder, name)?;
        self.resolve_file(
            location,
            &PageName::Named(name.to_owned()),
            &folder.join(file_name),
            charge_view,
        )
        .await
    }

    /// Resolve the landing page of a category.
    ///
    /// Chapters are always empty; metadata is looked up under
    /// [`DEFAULT_PAGE_NAME`].
    ///
    /// # Errors
    ///
    /// Same as [`PageResolver::resolve_page`].
    pub async fn resolve_default(
        &self,
        location: &PageLocation,
        charge_view: bool,
    ) -> Result<DocumentationFile, ResolveError> {
        let folder = self.category_folder(location)?;
        self.resolve_file(
            location,
            &PageName::Default,
            &folder.join(DEFAULT_PAGE_FILE),
            charge_view,
        )
        .await
    }

    /// Resolve either kind of page.
    ///
    /// # Errors
    ///
    /// Same as [`PageResolver::resolve_page`].
    pub async fn resolve(
        &self,
        location: &PageLocation,
        name: &PageName,
        charge_view: bool,
    ) -> Result<DocumentationFile, ResolveError> {
        match name {
            PageName::Default => self.resolve_default(location, charge_view).await,
            PageName::Named(name) => self.resolve_page(location, name, charge_view).await,
        }
    }

    fn category_folder(&self, location: &PageLocation) -> Result<PathBuf, ResolveError> {
        resolve_category_folder(
            self.storage.as_ref(),
            &location.folder,
            &location.version,
            &location.language,
            location.doc_type,
        )
    }

    fn find_page_file(&self, folder: &Path, name: &str) -> Result<String, ResolveError> {
        let mut matches: Vec<String> = self
            .storage
            .list_dir(folder)?
            .into_iter()
            .filter(|entry| {
                !entry.is_dir && is_listed_page(&entry.name) && page_slug(&entry.name) == Some(name)
            })
            .map(|entry| entry.name)
            .collect();

        match matches.len() {
            0 => Err(ResolveError::not_found(format!(
                "page {name} in {}",
                folder.display()
            ))),
            1 => Ok(matches.remove(0)),
            _ => Err(ResolveError::AmbiguousPage {
                page: name.to_owned(),
                matches,
            }),
        }
    }

    async fn resolve_file(
        &self,
        location: &PageLocation,
        name: &PageName,
        path: &Path,
        charge_view: bool,
    ) -> Result<DocumentationFile, ResolveError> {
        let contents = self.storage.read(path)?;
        let stat = self.storage.stat(path)?;
        let extract = extract_page(&contents);

        let rows = self
            .store
            .fetch_page_metadata(
                location.doc_type.as_str(),
                &location.folder,
                name.as_str(),
                charge_view,
            )
            .await?;

        let (view_count, products, related) = match rows.split_first() {
            Some((primary, related_rows)) => {
                let raw_products = primary.products.as_deref().unwrap_or_default();
                let products = if split_tags(raw_products).next().is_some() {
                    let doc_index = self.doc_index_for_products(location);
                    self.products.classify(raw_products, &doc_index)
                } else {
                    Vec::new()
                };
                let related = self.related_items(related_rows, raw_products);
                (primary.view_count, products, related)
            }
            None => (0, Vec::new(), Vec::new()),
        };

        let chapters = match name {
            PageName::Default => Vec::new(),
            PageName::Named(_) => extract.chapters,
        };

        Ok(DocumentationFile {
            name: name.as_str().to_owned(),
            category: location.folder.clone(),
            doc_type: location.doc_type,
            version: location.version.clone(),
            language: location.language.clone(),
            file_contents: contents,
            description: extract.description,
            size: stat.size,
            view_count,
            access_time: DateTime::<Utc>::from(stat.accessed),
            modification_time: DateTime::<Utc>::from(stat.modified),
            creation_time: DateTime::<Utc>::from(stat.created),
            chapters,
            products,
            related,
        })
    }

    /// `Doc` index used to link product tags. Failures degrade to no links
    /// for category products.
    fn doc_index_for_products(&self, location: &PageLocation) -> Vec<IndexItem> {
        self.resolve_index(&location.version, &location.language, DocType::Doc)
            .unwrap_or_else(|e| {
                tracing::warn!(
                    version = %location.version,
                    language = %location.language,
                    error = %e,
                    "Doc index unavailable, linking special products only"
                );
                Vec::new()
            })
    }

    /// Build related cards. Each card gets its own random pick from the
    /// page's product tags.
    ///
    /// # Panics
    ///
    /// Panics if the RNG lock is poisoned.
    fn related_items(&self, rows: &[MetadataRow], raw_products: &str) -> Vec<RelatedItem> {
        let tags: Vec<&str> = split_tags(raw_products).collect();
        let mut rng = self.rng.lock().unwrap();

        rows.iter()
            .map(|row| RelatedItem {
                id: row.id,
                category: row.category.clone(),
                page: row.name.clone(),
                icon: row
                    .icon
                    .clone()
                    .filter(|icon| !icon.is_empty())
                    .unwrap_or_else(|| icon_for(&row.category).to_owned()),
                doc_type: row.doc_type.clone(),
                image_url: tags
                    .choose(&mut *rng)
                    .map(|product| self.products.image_url(product)),
            })
            .collect()
    }
}
