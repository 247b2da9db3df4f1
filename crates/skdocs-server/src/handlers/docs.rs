//! Documentation read endpoints.
//!
//! Pages and indices are served through the shared [`skdocs_site::DocsCache`].

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use skdocs_site::{
    CategoryItem, DocType, DocumentationFile, IndexItem, PageLocation, RecommendedItem,
};

use crate::error::ServerError;
use crate::state::AppState;
use crate::validate::{check_language, check_release, parse_doc_type, require_segment};

/// Path parameters of partition-scoped routes.
#[derive(Deserialize)]
pub(crate) struct PartitionPath {
    version: String,
    language: String,
    #[serde(rename = "type")]
    doc_type: String,
}

/// Path parameters of release-scoped routes.
#[derive(Deserialize)]
pub(crate) struct ReleasePath {
    pub(crate) version: String,
    pub(crate) language: String,
}

/// Path parameters of GET /getRecommendedItems.
#[derive(Deserialize)]
pub(crate) struct RecommendedPath {
    language: String,
    #[serde(rename = "type")]
    doc_type: String,
}

/// Query of GET /getFile and GET /getDefault.
#[derive(Deserialize)]
pub(crate) struct FileQuery {
    folder: Option<String>,
    name: Option<String>,
    /// Re-resolve without charging a view.
    #[serde(default)]
    refresh: bool,
}

#[derive(Serialize)]
pub(crate) struct FileResponse {
    file: DocumentationFile,
}

#[derive(Serialize)]
pub(crate) struct IndexResponse {
    index: Vec<IndexItem>,
}

#[derive(Serialize)]
pub(crate) struct CategoriesResponse {
    categories: Vec<CategoryItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    doc_index: Vec<IndexItem>,
    guide_index: Vec<IndexItem>,
    recommended_doc_items: Vec<RecommendedItem>,
    recommended_guide_items: Vec<RecommendedItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecommendedResponse {
    recommended_items: Vec<RecommendedItem>,
}

impl PartitionPath {
    fn validate(&self, state: &AppState) -> Result<DocType, ServerError> {
        check_release(state, &self.version, &self.language)?;
        parse_doc_type(&self.doc_type)
    }
}

/// Handle GET /getFile/{version}/{language}/{type}?folder&name[&refresh].
pub(crate) async fn get_file(
    Path(path): Path<PartitionPath>,
    Query(query): Query<FileQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<FileResponse>, ServerError> {
    let doc_type = path.validate(&state)?;
    let folder = require_segment("folder", query.folder.as_deref())?;
    let name = require_segment("name", query.name.as_deref())?;
    let location = PageLocation::new(path.version, path.language, doc_type, folder);

    let file = if query.refresh {
        state.docs.refresh_file(&location, name).await?
    } else {
        state.docs.get_cached_file(&location, name).await?
    };
    Ok(Json(FileResponse { file }))
}

/// Handle GET /getDefault/{version}/{language}/{type}?folder.
pub(crate) async fn get_default(
    Path(path): Path<PartitionPath>,
    Query(query): Query<FileQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<FileResponse>, ServerError> {
    let doc_type = path.validate(&state)?;
    let folder = require_segment("folder", query.folder.as_deref())?;
    let location = PageLocation::new(path.version, path.language, doc_type, folder);

    let file = state.docs.get_cached_default(&location).await?;
    Ok(Json(FileResponse { file }))
}

/// Handle GET /getIndex/{version}/{language}/{type}.
pub(crate) async fn get_index(
    Path(path): Path<PartitionPath>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<IndexResponse>, ServerError> {
    let doc_type = path.validate(&state)?;
    let index = state
        .docs
        .get_cached_index(&path.version, &path.language, doc_type)
        .await?;
    Ok(Json(IndexResponse { index }))
}

/// Handle GET /getCategories/{version}/{language}/{type}.
pub(crate) async fn get_categories(
    Path(path): Path<PartitionPath>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoriesResponse>, ServerError> {
    let doc_type = path.validate(&state)?;
    let index = state
        .docs
        .get_cached_index(&path.version, &path.language, doc_type)
        .await?;
    Ok(Json(CategoriesResponse {
        categories: index.iter().map(CategoryItem::from).collect(),
    }))
}

/// Handle GET /refresh/{version}/{language}.
pub(crate) async fn refresh(
    Path(path): Path<ReleasePath>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RefreshResponse>, ServerError> {
    check_release(&state, &path.version, &path.language)?;
    let doc_index = state
        .docs
        .get_cached_index(&path.version, &path.language, DocType::Doc)
        .await?;
    let guide_index = state
        .docs
        .get_cached_index(&path.version, &path.language, DocType::Guide)
        .await?;
    let recommended_doc_items = state
        .docs
        .get_recommended(&path.language, DocType::Doc)
        .await?;
    let recommended_guide_items = state
        .docs
        .get_recommended(&path.language, DocType::Guide)
        .await?;
    Ok(Json(RefreshResponse {
        doc_index,
        guide_index,
        recommended_doc_items,
        recommended_guide_items,
    }))
}

/// Handle GET /getRecommendedItems/{language}/{type}.
pub(crate) async fn get_recommended_items(
    Path(path): Path<RecommendedPath>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RecommendedResponse>, ServerError> {
    check_language(&state, &path.language)?;
    let doc_type = parse_doc_type(&path.doc_type)?;
    let recommended_items = state.docs.get_recommended(&path.language, doc_type).await?;
    Ok(Json(RecommendedResponse { recommended_items }))
}
