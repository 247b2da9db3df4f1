//! HTTP request handlers.

pub(crate) mod cache;
pub(crate) mod docs;
pub(crate) mod search;
pub(crate) mod status;
pub(crate) mod votes;
