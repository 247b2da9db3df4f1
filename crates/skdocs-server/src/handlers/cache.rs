//! Cache administration endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use skdocs_site::{CacheDetails, CacheScope};

use crate::error::ServerError;
use crate::state::AppState;

fn parse_scope(value: &str) -> Result<CacheScope, ServerError> {
    value
        .parse()
        .map_err(|_| ServerError::validation(format!("Invalid cache type: {value}")))
}

/// Handle GET /cache/{type}.
pub(crate) async fn get_cache_details(
    Path(scope): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CacheDetails>, ServerError> {
    let scope = parse_scope(&scope)?;
    Ok(Json(state.docs.cache_details(scope)))
}

/// Handle DELETE /cache/{type}.
pub(crate) async fn clear_cache(
    Path(scope): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ServerError> {
    let scope = parse_scope(&scope)?;
    state.docs.clear_cache(scope);
    Ok(StatusCode::OK)
}
