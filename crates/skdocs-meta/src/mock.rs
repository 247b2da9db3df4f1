//! In-memory metadata store for testing.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::store::{MetadataRow, MetadataStore, NewVote, RecommendedRow, StoreError, related_ids};

/// Mock metadata store.
///
/// Mirrors the SQL store's semantics over an in-memory table and counts
/// fetches, so tests can assert when the store was consulted.
///
/// # Example
///
/// ```ignore
/// use skdocs_meta::{MetadataRow, MockMetadataStore};
///
/// let store = MockMetadataStore::new().with_row(MetadataRow {
///     id: 1,
///     doc_type: "Doc".to_owned(),
///     category: "Products".to_owned(),
///     name: "Apricaria".to_owned(),
///     products: None,
///     related: None,
///     icon: None,
///     view_count: 0,
/// });
/// ```
#[derive(Debug, Default)]
pub struct MockMetadataStore {
    rows: RwLock<BTreeMap<i64, MetadataRow>>,
    recommended: RwLock<Vec<(String, RecommendedRow)>>,
    votes: RwLock<Vec<NewVote>>,
    comments: RwLock<Vec<(String, String)>>,
    fetch_calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl MockMetadataStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_row(self, row: MetadataRow) -> Self {
        self.rows.write().unwrap().insert(row.id, row);
        self
    }

    /// Add a featured page for `language`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_recommended(self, language: &str, row: RecommendedRow) -> Self {
        self.recommended
            .write()
            .unwrap()
            .push((language.to_owned(), row));
        self
    }

    /// Make every call fail until [`MockMetadataStore::set_unavailable`]
    /// is called with `false`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of [`MetadataStore::fetch_page_metadata`] calls so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Current view count of the row with `id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn view_count(&self, id: i64) -> Option<i64> {
        self.rows.read().unwrap().get(&id).map(|row| row.view_count)
    }

    /// Votes recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn votes(&self) -> Vec<NewVote> {
        self.votes.read().unwrap().clone()
    }

    /// `(ticket, comment)` pairs recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn comments(&self) -> Vec<(String, String)> {
        self.comments.read().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock store offline".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for MockMetadataStore {
    async fn fetch_page_metadata(
        &self,
        doc_type: &str,
        category: &str,
        name: &str,
        increment_view: bool,
    ) -> Result<Vec<MetadataRow>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut rows = self.rows.write().unwrap();
        let Some(primary) = rows
            .values()
            .find(|row| row.doc_type == doc_type && row.category == category && row.name == name)
            .cloned()
        else {
            return Ok(Vec::new());
        };

        let ids = primary.related.as_deref().map(related_ids).unwrap_or_default();
        let mut result = vec![primary.clone()];
        result.extend(ids.iter().filter_map(|id| rows.get(id).cloned()));

        if increment_view && let Some(row) = rows.get_mut(&primary.id) {
            row.view_count += 1;
        }
        Ok(result)
    }

    async fn fetch_recommended(
        &self,
        language: &str,
        doc_type: &str,
    ) -> Result<Vec<RecommendedRow>, StoreError> {
        self.check_available()?;

        let mut rows: Vec<RecommendedRow> = self
            .recommended
            .read()
            .unwrap()
            .iter()
            .filter(|(lang, row)| lang == language && row.doc_type == doc_type)
            .map(|(_, row)| row.clone())
            .collect();
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }

    async fn insert_vote(&self, vote: &NewVote) -> Result<(), StoreError> {
        self.check_available()?;
        self.votes.write().unwrap().push(vote.clone());
        Ok(())
    }

    async fn add_comment(&self, ticket: &str, comment: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.comments
            .write()
            .unwrap()
            .push((ticket.to_owned(), comment.to_owned()));
        Ok(())
    }
}
