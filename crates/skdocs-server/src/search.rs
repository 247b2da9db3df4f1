//! Full-text search backend client.
//!
//! Talks to a Meilisearch-compatible server. Requests are blocking; handlers
//! run them on the blocking pool.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use ureq::Agent;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Error from the search backend.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// HTTP request failed (network error, timeout, invalid response).
    #[error("Search request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// Backend answered with an error status.
    #[error("Search backend error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Blocking task was cancelled or panicked.
    #[error("Search task failed: {0}")]
    Task(String),
}

/// Search request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: String,
    pub limit: u32,
    pub offset: u32,
    pub attributes_to_search_on: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Search response body, fields the API passes on.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHits {
    pub hits: Vec<serde_json::Value>,
    #[serde(default)]
    pub estimated_total_hits: Option<u64>,
    #[serde(default)]
    pub processing_time_ms: u64,
}

/// Search backend client.
#[derive(Debug)]
pub struct SearchClient {
    agent: Agent,
    base_url: String,
    api_key: String,
}

impl SearchClient {
    /// Create a client for the server at `base_url`.
    ///
    /// An empty `api_key` sends no authorization header.
    #[must_use]
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    /// Name of the index holding one version and language.
    #[must_use]
    pub fn index_name(version: &str, language: &str) -> String {
        format!("documentation_{version}_{language}")
    }

    /// Run a search against `index`. Blocks the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the request fails or the backend answers
    /// with an error status.
    pub fn search(&self, index: &str, query: &SearchQuery) -> Result<SearchHits, SearchError> {
        let url = format!("{}/indexes/{index}/search", self.base_url);
        tracing::debug!(index, query = %query.q, "Searching");

        let mut request = self
            .agent
            .post(&url)
            .header("Accept", "application/json");
        if !self.api_key.is_empty() {
            request = request.header("Authorization", &format!("Bearer {}", self.api_key));
        }
        let response = request.send_json(query)?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(SearchError::HttpResponse {
                status,
                body: error_body,
            });
        }

        Ok(body.read_json()?)
    }
}

/// Filter matching one page. Quotes in values are escaped.
#[must_use]
pub fn page_filter(doc_type: &str, category: &str, page: &str) -> String {
    format!(
        "type = '{}' AND category = '{}' AND page = '{}'",
        escape_filter_value(doc_type),
        escape_filter_value(category),
        escape_filter_value(page)
    )
}

fn escape_filter_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
