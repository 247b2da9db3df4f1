//! Store interface and row types.

use async_trait::async_trait;

/// Errors from the metadata store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connectivity or query failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Store cannot serve requests.
    #[error("Metadata store unavailable: {0}")]
    Unavailable(String),
}

/// One row of the `documentation` table.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct MetadataRow {
    /// Primary key.
    pub id: i64,
    /// Content type (`Doc` or `Guide`).
    #[sqlx(rename = "type")]
    pub doc_type: String,
    /// Category name without order prefix.
    pub category: String,
    /// Page slug without order prefix.
    pub name: String,
    /// Comma-separated product tags.
    pub products: Option<String>,
    /// Comma-separated ids of related pages.
    pub related: Option<String>,
    /// Icon override for related-page cards.
    pub icon: Option<String>,
    /// Number of charged page fetches.
    pub view_count: i64,
}

/// One row of the `documentation_recommended` table: a page featured on a
/// language's landing page.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub struct RecommendedRow {
    /// Primary key; also the display order.
    pub id: i64,
    /// Content type (`Doc` or `Guide`).
    #[sqlx(rename = "type")]
    pub doc_type: String,
    /// Category name without order prefix.
    pub category: String,
    /// Page slug without order prefix.
    pub page: String,
    /// Chapter anchor to open, if any.
    pub anchor: Option<String>,
    /// Icon override for the card.
    pub icon: Option<String>,
    /// Estimated reading time in minutes.
    pub time: Option<i64>,
}

/// A reader's vote on a page.
///
/// `None` fields are stored as SQL `NULL`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewVote {
    pub ticket: String,
    pub value: bool,
    pub doc_type: Option<String>,
    pub category: Option<String>,
    pub page: Option<String>,
}

/// Access to page metadata and reader feedback.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Fetch the metadata row of a page followed by the rows it relates to.
    ///
    /// Row 0 is the page itself; rows 1.. are its related pages in ascending
    /// id order. An empty result means the page has no metadata yet, which is
    /// not an error. When `increment_view` is true the page's view counter is
    /// incremented in the same transaction; the returned row carries the
    /// count read before the increment.
    async fn fetch_page_metadata(
        &self,
        doc_type: &str,
        category: &str,
        name: &str,
        increment_view: bool,
    ) -> Result<Vec<MetadataRow>, StoreError>;

    /// Featured pages of one language and type, in ascending id order.
    async fn fetch_recommended(
        &self,
        language: &str,
        doc_type: &str,
    ) -> Result<Vec<RecommendedRow>, StoreError>;

    /// Record a vote.
    async fn insert_vote(&self, vote: &NewVote) -> Result<(), StoreError>;

    /// Attach a free-text comment to the vote cast with `ticket`.
    async fn add_comment(&self, ticket: &str, comment: &str) -> Result<(), StoreError>;
}

/// Parse a comma-separated id list, skipping blanks, junk and duplicates.
///
/// Returned ids are in ascending order.
pub fn related_ids(raw: &str) -> Vec<i64> {
    let mut ids: Vec<i64> = raw
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
