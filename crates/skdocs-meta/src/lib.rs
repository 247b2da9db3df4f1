//! Page metadata store for SK Docs.
//!
//! Page bodies live on disk; everything else a page needs (view count,
//! product tags, related pages, featured pages, reader votes) lives in a
//! relational store.
//! This crate is the only place that talks to it.
//!
//! - [`MetadataStore`]: async interface used by the page resolver and the
//!   vote routes
//! - [`SqlMetadataStore`]: implementation over an sqlx `Any` pool (`MySQL` in
//!   production, `SQLite` in tests)
//! - [`MockMetadataStore`]: in-memory implementation (feature `mock`)

#[cfg(feature = "mock")]
mod mock;
mod sql;
mod store;

#[cfg(feature = "mock")]
pub use mock::MockMetadataStore;
pub use sql::SqlMetadataStore;
pub use store::{
    MetadataRow, MetadataStore, NewVote, RecommendedRow, StoreError, related_ids,
};
