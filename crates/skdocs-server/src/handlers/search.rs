//! Search endpoints.
//!
//! Proxies queries to the search backend, one index per version and
//! language.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::handlers::docs::ReleasePath;
use crate::search::{SearchClient, SearchError, SearchHits, SearchQuery, page_filter};
use crate::state::AppState;
use crate::validate::{check_release, require};

const DEFAULT_LIMIT: u32 = 5;

/// Query of GET /search/all.
#[derive(Deserialize)]
pub(crate) struct SearchAllQuery {
    query: Option<String>,
    scope: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

/// Query of GET /search/page.
#[derive(Deserialize)]
pub(crate) struct SearchPageQuery {
    query: Option<String>,
    #[serde(rename = "type")]
    doc_type: Option<String>,
    category: Option<String>,
    page: Option<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResponse {
    results: Vec<serde_json::Value>,
    count: Option<u64>,
    duration_ms: u64,
    query: String,
    offset: u32,
}

/// Attributes searched for a scope name.
fn scope_attributes(scope: &str) -> Result<Vec<String>, ServerError> {
    let attributes: &[&str] = match scope {
        "global" => &["content", "page"],
        "titles" => &["page"],
        other => return Err(ServerError::validation(format!("Invalid scope: {other}"))),
    };
    Ok(attributes.iter().map(|a| (*a).to_owned()).collect())
}

/// Handle GET /search/all/{version}/{language}.
pub(crate) async fn search_all(
    Path(path): Path<ReleasePath>,
    Query(params): Query<SearchAllQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SearchResponse>, ServerError> {
    let client = state.search.clone().ok_or(ServerError::SearchUnavailable)?;
    check_release(&state, &path.version, &path.language)?;
    let query = require("query", params.query.as_deref())?;
    let scope = require("scope", params.scope.as_deref())?;

    let request = SearchQuery {
        q: query.to_owned(),
        limit: params.limit.unwrap_or(DEFAULT_LIMIT),
        offset: params.offset.unwrap_or_default(),
        attributes_to_search_on: scope_attributes(scope)?,
        filter: None,
    };
    run_search(client, &path, request).await
}

/// Handle GET /search/page/{version}/{language}.
pub(crate) async fn search_page(
    Path(path): Path<ReleasePath>,
    Query(params): Query<SearchPageQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SearchResponse>, ServerError> {
    let client = state.search.clone().ok_or(ServerError::SearchUnavailable)?;
    check_release(&state, &path.version, &path.language)?;
    let query = require("query", params.query.as_deref())?;
    let doc_type = require("type", params.doc_type.as_deref())?;
    let category = require("category", params.category.as_deref())?;
    let page = require("page", params.page.as_deref())?;

    let request = SearchQuery {
        q: query.to_owned(),
        limit: params.limit.unwrap_or(DEFAULT_LIMIT),
        offset: params.offset.unwrap_or_default(),
        attributes_to_search_on: vec!["content".to_owned()],
        filter: Some(page_filter(doc_type, category, page)),
    };
    run_search(client, &path, request).await
}

async fn run_search(
    client: Arc<SearchClient>,
    path: &ReleasePath,
    request: SearchQuery,
) -> Result<Json<SearchResponse>, ServerError> {
    let index = SearchClient::index_name(&path.version, &path.language);
    let query = request.q.clone();
    let offset = request.offset;

    let hits: SearchHits = tokio::task::spawn_blocking(move || client.search(&index, &request))
        .await
        .map_err(|e| SearchError::Task(e.to_string()))??;

    Ok(Json(SearchResponse {
        results: hits.hits,
        count: hits.estimated_total_hits,
        duration_ms: hits.processing_time_ms,
        query,
        offset,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scope_attributes() {
        assert_eq!(scope_attributes("global").unwrap(), vec!["content", "page"]);
        assert_eq!(scope_attributes("titles").unwrap(), vec!["page"]);
        assert!(matches!(
            scope_attributes("everything"),
            Err(ServerError::Validation(_))
        ));
    }

    #[test]
    fn test_search_response_serialization() {
        let response = SearchResponse {
            results: vec![serde_json::json!({"page": "Bots"})],
            count: Some(1),
            duration_ms: 2,
            query: "bots".to_owned(),
            offset: 0,
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["durationMs"], 2);
        assert_eq!(json["count"], 1);
        assert_eq!(json["results"][0]["page"], "Bots");
    }
}
