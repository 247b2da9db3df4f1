//! Status badge endpoint.

use axum::Json;
use serde::Serialize;

/// shields.io endpoint badge.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Badge {
    schema_version: u8,
    label: &'static str,
    message: &'static str,
    color: &'static str,
}

/// Handle GET /api/status/badge.
pub(crate) async fn get_badge() -> Json<Badge> {
    Json(Badge {
        schema_version: 1,
        label: "SK Docs Status",
        message: "online",
        color: "brightgreen",
    })
}
