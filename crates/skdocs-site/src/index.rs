//! Table of contents for one documentation partition.

use serde::{Deserialize, Serialize};
use skdocs_storage::Storage;

use crate::error::ResolveError;
use crate::icons::icon_for;
use crate::layout::{DocType, is_listed_page, page_slug, strip_order_prefix, type_dir};

/// Table-of-contents entry for one category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexItem {
    pub category_icon: String,
    /// Category name without order prefix. Underscores are kept.
    pub category: String,
    /// Page slugs in navigation order, landing page excluded.
    pub children: Vec<String>,
}

/// Category summary without its pages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryItem {
    pub category_icon: String,
    pub category: String,
}

impl From<&IndexItem> for CategoryItem {
    fn from(item: &IndexItem) -> Self {
        Self {
            category_icon: item.category_icon.clone(),
            category: item.category.clone(),
        }
    }
}

/// Walk `{version}/{language}/{type}` into an ordered table of contents.
///
/// Categories and their pages keep on-disk order, which the `NN_` prefixes
/// make the intended navigation order. Plain files next to the category
/// folders are ignored.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`] if the partition does not exist, or
/// [`ResolveError::Storage`] if a directory can't be listed.
pub fn resolve_index(
    storage: &dyn Storage,
    version: &str,
    language: &str,
    doc_type: DocType,
) -> Result<Vec<IndexItem>, ResolveError> {
    let parent = type_dir(version, language, doc_type);
    let categories = storage.list_dir(&parent)?;

    let mut index = Vec::with_capacity(categories.len());
    for entry in categories.into_iter().filter(|entry| entry.is_dir) {
        let category = strip_order_prefix(&entry.name);
        let children = storage
            .list_dir(&parent.join(&entry.name))?
            .into_iter()
            .filter(|file| !file.is_dir && is_listed_page(&file.name))
            .filter_map(|file| page_slug(&file.name).map(str::to_owned))
            .collect();

        index.push(IndexItem {
            category_icon: icon_for(category).to_owned(),
            category: category.to_owned(),
            children,
        });
    }

    tracing::debug!(
        version,
        language,
        doc_type = %doc_type,
        categories = index.len(),
        "Resolved index"
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skdocs_storage::MockStorage;

    fn item(icon: &str, category: &str, children: &[&str]) -> IndexItem {
        IndexItem {
            category_icon: icon.to_owned(),
            category: category.to_owned(),
            children: children.iter().map(|c| (*c).to_owned()).collect(),
        }
    }

    #[test]
    fn test_resolve_index_orders_by_prefix() {
        let storage = MockStorage::new()
            .with_file("v1/en-US/Doc/02_Products/00_Default.html", "")
            .with_file("v1/en-US/Doc/02_Products/02_Stelleri.html", "")
            .with_file("v1/en-US/Doc/02_Products/01_Apricaria.html", "")
            .with_file("v1/en-US/Doc/01_Get_Started/03_Links.html", "")
            .with_file("v1/en-US/Doc/01_Get_Started/01_Introduction.html", "")
            .with_file("v1/en-US/Doc/01_Get_Started/02_Setup.html", "");

        let index = resolve_index(&storage, "v1", "en-US", DocType::Doc).unwrap();

        assert_eq!(
            index,
            vec![
                item(
                    "fa-rocket-launch",
                    "Get_Started",
                    &["Introduction", "Setup", "Links"]
                ),
                item("fa-conveyor-belt", "Products", &["Apricaria", "Stelleri"]),
            ]
        );
    }

    #[test]
    fn test_resolve_index_skips_non_pages_and_nested_dirs() {
        let storage = MockStorage::new()
            .with_file("v1/en-US/Guide/01_Plans/01_Basic.html", "")
            .with_file("v1/en-US/Guide/01_Plans/notes.txt", "")
            .with_file("v1/en-US/Guide/01_Plans/img/02_Chart.html", "")
            .with_file("v1/en-US/Guide/README.html", "");

        let index = resolve_index(&storage, "v1", "en-US", DocType::Guide).unwrap();

        assert_eq!(index, vec![item("fa-gem", "Plans", &["Basic"])]);
    }

    #[test]
    fn test_resolve_index_category_with_only_default_page() {
        let storage = MockStorage::new().with_file("v1/en-US/Doc/04_Services/00_Default.html", "");

        let index = resolve_index(&storage, "v1", "en-US", DocType::Doc).unwrap();

        assert_eq!(index, vec![item("fa-check", "Services", &[])]);
    }

    #[test]
    fn test_resolve_index_missing_partition() {
        let storage = MockStorage::new().with_file("v1/en-US/Doc/01_Plans/01_Basic.html", "");

        let err = resolve_index(&storage, "v2", "en-US", DocType::Doc).unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_index_item_serializes_camel_case() {
        let json = serde_json::to_value(item("fa-gem", "Plans", &["Basic"])).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "categoryIcon": "fa-gem",
                "category": "Plans",
                "children": ["Basic"],
            })
        );
    }

    #[test]
    fn test_category_item_from_index_item() {
        let category = CategoryItem::from(&item("fa-gem", "Plans", &["Basic"]));

        assert_eq!(category.category, "Plans");
        assert_eq!(category.category_icon, "fa-gem");
    }
}
