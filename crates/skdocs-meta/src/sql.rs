//! sqlx-backed metadata store.

use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::{Any, AnyPool, QueryBuilder};

use crate::store::{MetadataRow, MetadataStore, NewVote, RecommendedRow, StoreError, related_ids};

const SELECT_PAGE: &str = "SELECT id, type, category, name, products, related, icon, view_count \
     FROM documentation WHERE type = ? AND category = ? AND name = ?";

const SELECT_BY_ID: &str =
    "SELECT id, type, category, name, products, related, icon, view_count FROM documentation WHERE id IN (";

const INCREMENT_VIEW: &str = "UPDATE documentation SET view_count = view_count + 1 WHERE id = ?";

const SELECT_RECOMMENDED: &str = "SELECT id, type, category, page, anchor, icon, time \
     FROM documentation_recommended WHERE language = ? AND type = ? ORDER BY id";

const INSERT_VOTE: &str =
    "INSERT INTO documentation_vote (ticket, value, type, category, page) VALUES (?, ?, ?, ?, ?)";

const UPDATE_COMMENT: &str = "UPDATE documentation_vote SET comment = ? WHERE ticket = ?";

/// Metadata store over an sqlx `Any` connection pool.
///
/// The driver is picked from the URL scheme (`mysql://`, `sqlite:`).
#[derive(Debug, Clone)]
pub struct SqlMetadataStore {
    pool: AnyPool,
}

impl SqlMetadataStore {
    /// Create a store whose pool connects on first use.
    ///
    /// A database that is down at startup therefore surfaces as a
    /// [`StoreError`] on the first request instead of a startup failure.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the URL cannot be parsed.
    pub fn connect_lazy(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(url)?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub fn from_pool(pool: AnyPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataStore for SqlMetadataStore {
    async fn fetch_page_metadata(
        &self,
        doc_type: &str,
        category: &str,
        name: &str,
        increment_view: bool,
    ) -> Result<Vec<MetadataRow>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let primary: Option<MetadataRow> = sqlx::query_as(SELECT_PAGE)
            .bind(doc_type)
            .bind(category)
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(primary) = primary else {
            tx.commit().await?;
            tracing::debug!(doc_type, category, name, "No metadata row for page");
            return Ok(Vec::new());
        };

        let ids = primary.related.as_deref().map(related_ids).unwrap_or_default();
        let related: Vec<MetadataRow> = if ids.is_empty() {
            Vec::new()
        } else {
            let mut query: QueryBuilder<'_, Any> = QueryBuilder::new(SELECT_BY_ID);
            let mut separated = query.separated(", ");
            for id in &ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(") ORDER BY id");
            query.build_query_as().fetch_all(&mut *tx).await?
        };

        if increment_view {
            sqlx::query(INCREMENT_VIEW)
                .bind(primary.id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        let mut rows = Vec::with_capacity(related.len() + 1);
        rows.push(primary);
        rows.extend(related);
        Ok(rows)
    }

    async fn fetch_recommended(
        &self,
        language: &str,
        doc_type: &str,
    ) -> Result<Vec<RecommendedRow>, StoreError> {
        let rows = sqlx::query_as(SELECT_RECOMMENDED)
            .bind(language)
            .bind(doc_type)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert_vote(&self, vote: &NewVote) -> Result<(), StoreError> {
        sqlx::query(INSERT_VOTE)
            .bind(vote.ticket.as_str())
            .bind(vote.value)
            .bind(vote.doc_type.as_deref())
            .bind(vote.category.as_deref())
            .bind(vote.page.as_deref())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_comment(&self, ticket: &str, comment: &str) -> Result<(), StoreError> {
        let result = sqlx::query(UPDATE_COMMENT)
            .bind(comment)
            .bind(ticket)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            tracing::debug!(ticket, "Comment did not match any vote");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCHEMA: [&str; 3] = [
        "CREATE TABLE documentation (
            id INTEGER PRIMARY KEY,
            type TEXT NOT NULL,
            category TEXT NOT NULL,
            name TEXT NOT NULL,
            products TEXT,
            related TEXT,
            icon TEXT,
            view_count INTEGER NOT NULL DEFAULT 0
        )",
        "CREATE TABLE documentation_vote (
            ticket TEXT NOT NULL,
            value BOOLEAN NOT NULL,
            type TEXT,
            category TEXT,
            page TEXT,
            comment TEXT
        )",
        "CREATE TABLE documentation_recommended (
            id INTEGER PRIMARY KEY,
            language TEXT NOT NULL,
            type TEXT NOT NULL,
            category TEXT NOT NULL,
            page TEXT NOT NULL,
            anchor TEXT,
            icon TEXT,
            time INTEGER
        )",
    ];

    async fn test_store() -> SqlMetadataStore {
        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }
        SqlMetadataStore::from_pool(pool)
    }

    async fn seed(store: &SqlMetadataStore) {
        let rows = [
            "INSERT INTO documentation VALUES (1, 'Doc', 'Products', 'Apricaria', 'Apricaria,Stelleri', '7,3', NULL, 10)",
            "INSERT INTO documentation VALUES (3, 'Doc', 'Get_Started', 'Introduction', NULL, NULL, 'fa-book', 2)",
            "INSERT INTO documentation VALUES (7, 'Guide', 'Operations', 'Moderation', 'Ispidina', NULL, NULL, 0)",
            "INSERT INTO documentation VALUES (9, 'Doc', 'Community', 'Lonely', NULL, '', NULL, 5)",
        ];
        for row in rows {
            sqlx::query(row).execute(&store.pool).await.unwrap();
        }
    }

    async fn view_count(store: &SqlMetadataStore, id: i64) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT view_count FROM documentation WHERE id = ?")
            .bind(id)
            .fetch_one(&store.pool)
            .await
            .unwrap();
        count
    }

    #[tokio::test]
    async fn test_fetch_returns_primary_then_related_by_id() {
        let store = test_store().await;
        seed(&store).await;

        let rows = store
            .fetch_page_metadata("Doc", "Products", "Apricaria", false)
            .await
            .unwrap();

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 7]);
        assert_eq!(rows[0].products.as_deref(), Some("Apricaria,Stelleri"));
        assert_eq!(rows[0].doc_type, "Doc");
        assert_eq!(rows[1].icon.as_deref(), Some("fa-book"));
    }

    #[tokio::test]
    async fn test_fetch_missing_page_is_empty() {
        let store = test_store().await;
        seed(&store).await;

        let rows = store
            .fetch_page_metadata("Doc", "Products", "Nope", true)
            .await
            .unwrap();

        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_without_related() {
        let store = test_store().await;
        seed(&store).await;

        let rows = store
            .fetch_page_metadata("Doc", "Community", "Lonely", false)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_increment_view_returns_previous_count() {
        let store = test_store().await;
        seed(&store).await;

        let rows = store
            .fetch_page_metadata("Doc", "Products", "Apricaria", true)
            .await
            .unwrap();

        assert_eq!(rows[0].view_count, 10);
        assert_eq!(view_count(&store, 1).await, 11);
        // Related rows are never charged
        assert_eq!(view_count(&store, 3).await, 2);
    }

    #[tokio::test]
    async fn test_fetch_without_increment_leaves_count() {
        let store = test_store().await;
        seed(&store).await;

        store
            .fetch_page_metadata("Doc", "Products", "Apricaria", false)
            .await
            .unwrap();

        assert_eq!(view_count(&store, 1).await, 10);
    }

    #[tokio::test]
    async fn test_fetch_recommended_filters_and_orders() {
        let store = test_store().await;
        let rows = [
            "INSERT INTO documentation_recommended VALUES (4, 'en-US', 'Doc', 'Products', 'Bots', '#apricaria', NULL, 3)",
            "INSERT INTO documentation_recommended VALUES (2, 'en-US', 'Doc', 'Get_Started', 'Introduction', NULL, 'fa-book', NULL)",
            "INSERT INTO documentation_recommended VALUES (3, 'en-US', 'Guide', 'Plans', 'Basic', NULL, NULL, 5)",
            "INSERT INTO documentation_recommended VALUES (1, 'nl-NL', 'Doc', 'Products', 'Bots', NULL, NULL, 3)",
        ];
        for row in rows {
            sqlx::query(row).execute(&store.pool).await.unwrap();
        }

        let recommended = store.fetch_recommended("en-US", "Doc").await.unwrap();

        assert_eq!(
            recommended,
            vec![
                RecommendedRow {
                    id: 2,
                    doc_type: "Doc".to_owned(),
                    category: "Get_Started".to_owned(),
                    page: "Introduction".to_owned(),
                    anchor: None,
                    icon: Some("fa-book".to_owned()),
                    time: None,
                },
                RecommendedRow {
                    id: 4,
                    doc_type: "Doc".to_owned(),
                    category: "Products".to_owned(),
                    page: "Bots".to_owned(),
                    anchor: Some("#apricaria".to_owned()),
                    icon: None,
                    time: Some(3),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_insert_vote_and_comment() {
        let store = test_store().await;
        let vote = NewVote {
            ticket: "abc-123".to_owned(),
            value: true,
            doc_type: None,
            category: Some("Products".to_owned()),
            page: Some("Apricaria".to_owned()),
        };

        store.insert_vote(&vote).await.unwrap();
        store.add_comment("abc-123", "Very helpful").await.unwrap();

        let (doc_type, comment): (Option<String>, Option<String>) =
            sqlx::query_as("SELECT type, comment FROM documentation_vote WHERE ticket = ?")
                .bind("abc-123")
                .fetch_one(&store.pool)
                .await
                .unwrap();
        assert_eq!(doc_type, None);
        assert_eq!(comment.as_deref(), Some("Very helpful"));
    }

    #[tokio::test]
    async fn test_comment_for_unknown_ticket_is_ok() {
        let store = test_store().await;

        assert!(store.add_comment("missing", "hello").await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_pool_is_store_error() {
        let store = test_store().await;
        store.pool.close().await;

        let err = store
            .fetch_page_metadata("Doc", "Products", "Apricaria", true)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Database(_)));
    }
}
