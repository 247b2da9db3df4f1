//! Reader feedback endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use skdocs_meta::NewVote;

use crate::error::ServerError;
use crate::handlers::docs::ReleasePath;
use crate::state::AppState;
use crate::validate::{check_release, require};

/// Query value that stands for SQL `NULL`.
const NULL_LITERAL: &str = "null";

/// Query of POST /votes/new.
#[derive(Deserialize)]
pub(crate) struct VoteQuery {
    ticket: Option<String>,
    value: Option<String>,
    #[serde(rename = "type")]
    doc_type: Option<String>,
    category: Option<String>,
    page: Option<String>,
}

/// Query of PUT /votes/comment.
#[derive(Deserialize)]
pub(crate) struct CommentQuery {
    ticket: Option<String>,
}

/// Body of PUT /votes/comment.
#[derive(Deserialize)]
pub(crate) struct CommentBody {
    comment: Option<String>,
}

fn nullable(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.is_empty() && *v != NULL_LITERAL)
        .map(str::to_owned)
}

/// Handle POST /votes/new/{version}/{language}.
pub(crate) async fn new_vote(
    Path(path): Path<ReleasePath>,
    Query(query): Query<VoteQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ServerError> {
    check_release(&state, &path.version, &path.language)?;
    let ticket = require("ticket", query.ticket.as_deref())?;
    let value = require("value", query.value.as_deref())?;
    let category = require("category", query.category.as_deref())?;
    let page = require("page", query.page.as_deref())?;

    let vote = NewVote {
        ticket: ticket.to_owned(),
        value: value == "true",
        doc_type: nullable(query.doc_type.as_deref()),
        category: nullable(Some(category)),
        page: nullable(Some(page)),
    };
    state.store.insert_vote(&vote).await?;
    tracing::info!(ticket = %vote.ticket, value = vote.value, "Recorded vote");
    Ok(StatusCode::OK)
}

/// Handle PUT /votes/comment?ticket.
pub(crate) async fn add_comment(
    Query(query): Query<CommentQuery>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<CommentBody>,
) -> Result<StatusCode, ServerError> {
    let ticket = require("ticket", query.ticket.as_deref())?;
    let comment = require("comment", body.comment.as_deref())?;

    state.store.add_comment(ticket, comment).await?;
    tracing::info!(ticket, "Recorded vote comment");
    Ok(StatusCode::OK)
}
