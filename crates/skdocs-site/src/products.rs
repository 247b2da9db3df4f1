//! Product tag classification.
//!
//! A page's metadata row carries a comma-separated list of product tags.
//! Each tag is linked to the page that documents the product:
//!
//! 1. bot products → anchor on the bots page
//! 2. legacy products → anchor on the version one page
//! 3. pages of the `Products` category
//! 4. pages of the `Services` category
//!
//! Tags matching none of these are dropped.

use serde::{Deserialize, Serialize};

use crate::index::IndexItem;

const PRODUCTS_CATEGORY: &str = "Products";
const SERVICES_CATEGORY: &str = "Services";

/// A product linked from a page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationProduct {
    pub name: String,
    pub url: String,
}

/// Where product links and images point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductLinks {
    /// Reader route prefix for `Doc` pages.
    pub read_base_path: String,
    /// Base URL of product images (`{base}/{product}.png`).
    pub image_base_url: String,
    /// Products documented as sections of the bots page.
    pub bots: Vec<String>,
    /// Products documented as sections of the version one page.
    pub legacy: Vec<String>,
}

impl Default for ProductLinks {
    fn default() -> Self {
        Self {
            read_base_path: "/documentation/read/Doc".to_owned(),
            image_base_url: "https://files.stefankruik.com/Products/100".to_owned(),
            bots: ["Apricaria", "Stelleri", "Ispidina", "Interpres"]
                .map(str::to_owned)
                .to_vec(),
            legacy: ["Luscinia", "Ciconia"].map(str::to_owned).to_vec(),
        }
    }
}

impl ProductLinks {
    /// Classify a raw tag string against the `Doc` index.
    ///
    /// Order of first occurrence is kept; duplicates and unknown tags are
    /// dropped.
    #[must_use]
    pub fn classify(&self, raw: &str, doc_index: &[IndexItem]) -> Vec<DocumentationProduct> {
        let products = category_children(doc_index, PRODUCTS_CATEGORY);
        let services = category_children(doc_index, SERVICES_CATEGORY);
        let base = self.read_base_path.trim_end_matches('/');

        let mut result: Vec<DocumentationProduct> = Vec::new();
        for name in split_tags(raw) {
            if result.iter().any(|p| p.name == name) {
                continue;
            }
            let url = if self.bots.iter().any(|b| b == name) {
                format!("{base}/{PRODUCTS_CATEGORY}/Bots#{name}")
            } else if self.legacy.iter().any(|l| l == name) {
                format!("{base}/More/V_One#{name}")
            } else if products.iter().any(|p| p == name) {
                format!("{base}/{PRODUCTS_CATEGORY}/{name}")
            } else if services.iter().any(|s| s == name) {
                format!("{base}/{SERVICES_CATEGORY}/{name}")
            } else {
                tracing::debug!(product = name, "Dropping unknown product tag");
                continue;
            };
            result.push(DocumentationProduct {
                name: name.to_owned(),
                url,
            });
        }
        result
    }

    /// Image URL of a product.
    #[must_use]
    pub fn image_url(&self, product: &str) -> String {
        format!("{}/{product}.png", self.image_base_url.trim_end_matches('/'))
    }
}

/// Non-empty, trimmed tags of a comma-separated list.
pub(crate) fn split_tags(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|tag| !tag.is_empty())
}

fn category_children<'a>(index: &'a [IndexItem], category: &str) -> &'a [String] {
    index
        .iter()
        .find(|item| item.category == category)
        .map(|item| item.children.as_slice())
        .unwrap_or_default()
}
