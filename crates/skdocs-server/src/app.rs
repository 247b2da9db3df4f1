//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::Uri;
use axum::routing::{get, post, put};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::ServerError;
use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let docs_routes = Router::new()
        .route(
            "/getFile/{version}/{language}/{type}",
            get(handlers::docs::get_file),
        )
        .route(
            "/getDefault/{version}/{language}/{type}",
            get(handlers::docs::get_default),
        )
        .route(
            "/getIndex/{version}/{language}/{type}",
            get(handlers::docs::get_index),
        )
        .route(
            "/getCategories/{version}/{language}/{type}",
            get(handlers::docs::get_categories),
        )
        .route("/refresh/{version}/{language}", get(handlers::docs::refresh))
        .route(
            "/getRecommendedItems/{language}/{type}",
            get(handlers::docs::get_recommended_items),
        );

    let admin_routes = Router::new().route(
        "/cache/{type}",
        get(handlers::cache::get_cache_details).delete(handlers::cache::clear_cache),
    );

    let vote_routes = Router::new()
        .route("/votes/new/{version}/{language}", post(handlers::votes::new_vote))
        .route("/votes/comment", put(handlers::votes::add_comment));

    let search_routes = Router::new()
        .route(
            "/search/all/{version}/{language}",
            get(handlers::search::search_all),
        )
        .route(
            "/search/page/{version}/{language}",
            get(handlers::search::search_page),
        );

    Router::new()
        .merge(docs_routes)
        .merge(admin_routes)
        .merge(vote_routes)
        .merge(search_routes)
        .route("/api/status/badge", get(handlers::status::get_badge))
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}

async fn route_not_found(uri: Uri) -> ServerError {
    ServerError::NotFound(uri.path().to_owned())
}
