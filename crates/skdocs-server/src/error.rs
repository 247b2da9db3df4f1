//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use skdocs_meta::StoreError;
use skdocs_site::ResolveError;

use crate::search::SearchError;

/// Message returned for every server-side failure.
pub(crate) const INTERNAL_ERROR_MESSAGE: &str =
    "Something went wrong on our end. Please try again later.";

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Request parameters outside the accepted values.
    #[error("{0}")]
    Validation(String),

    /// Page, category or partition does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No search backend configured.
    #[error("Search engine not initialized.")]
    SearchUnavailable,

    /// Content resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Metadata store write failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Search backend request failed.
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl ServerError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP status of this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Resolve(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::SearchUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Resolve(_) | Self::Store(_) | Self::Search(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed");
            INTERNAL_ERROR_MESSAGE.to_owned()
        } else {
            self.to_string()
        };

        (status, axum::Json(json!({ "message": message }))).into_response()
    }
}
