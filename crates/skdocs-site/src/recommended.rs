//! Featured pages of a language's landing page.

use serde::{Deserialize, Serialize};
use skdocs_meta::{MetadataStore, RecommendedRow};

use crate::error::ResolveError;
use crate::icons::icon_for;
use crate::layout::DocType;

/// Card for one featured page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedItem {
    pub id: i64,
    pub category: String,
    pub page: String,
    pub anchor: Option<String>,
    /// Row override, else the category icon.
    pub icon: String,
    /// Estimated reading time in minutes.
    pub time: Option<i64>,
    #[serde(rename = "type")]
    pub doc_type: DocType,
}

impl RecommendedItem {
    fn from_row(row: RecommendedRow, doc_type: DocType) -> Self {
        let icon = row
            .icon
            .filter(|icon| !icon.is_empty())
            .unwrap_or_else(|| icon_for(&row.category).to_owned());
        Self {
            id: row.id,
            category: row.category,
            page: row.page,
            anchor: row.anchor.filter(|anchor| !anchor.is_empty()),
            icon,
            time: row.time,
            doc_type,
        }
    }
}

/// Load the featured pages of one language and type, in display order.
///
/// # Errors
///
/// Returns [`ResolveError::Store`] if the metadata store fails.
pub async fn resolve_recommended(
    store: &dyn MetadataStore,
    language: &str,
    doc_type: DocType,
) -> Result<Vec<RecommendedItem>, ResolveError> {
    let rows = store.fetch_recommended(language, doc_type.as_str()).await?;
    Ok(rows
        .into_iter()
        .map(|row| RecommendedItem::from_row(row, doc_type))
        .collect())
}
