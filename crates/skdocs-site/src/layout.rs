//! On-disk content layout.
//!
//! Content lives at `{version}/{language}/{type}/NN_Category/NN_Page.html`.
//! The two-digit `NN_` prefix encodes navigation order and is stripped for
//! presentation; lookups match on the stripped name.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skdocs_storage::Storage;

use crate::error::ResolveError;

/// File name of the per-category landing page.
pub const DEFAULT_PAGE_FILE: &str = "00_Default.html";

/// Extension of page files.
pub const PAGE_EXTENSION: &str = ".html";

/// Top-level content partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    Doc,
    Guide,
}

impl DocType {
    /// Every partition, in presentation order.
    pub const ALL: [Self; 2] = [Self::Doc, Self::Guide];

    /// Directory and wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Doc => "Doc",
            Self::Guide => "Guide",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`DocType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown documentation type: {0:?}")]
pub struct ParseDocTypeError(String);

impl FromStr for DocType {
    type Err = ParseDocTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Doc" => Ok(Self::Doc),
            "Guide" => Ok(Self::Guide),
            other => Err(ParseDocTypeError(other.to_owned())),
        }
    }
}

/// Strip a `NN_` order prefix. Names without one are returned unchanged.
///
/// # Examples
///
/// ```
/// use skdocs_site::strip_order_prefix;
///
/// assert_eq!(strip_order_prefix("01_Get_Started"), "Get_Started");
/// assert_eq!(strip_order_prefix("Products"), "Products");
/// ```
#[must_use]
pub fn strip_order_prefix(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() >= 3 && bytes[0].is_ascii_digit() && bytes[1].is_ascii_digit() && bytes[2] == b'_'
    {
        &name[3..]
    } else {
        name
    }
}

/// Slug of a page file: order prefix and `.html` stripped.
///
/// Returns `None` for files that are not pages.
#[must_use]
pub fn page_slug(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(PAGE_EXTENSION)
        .map(strip_order_prefix)
        .filter(|slug| !slug.is_empty())
}

/// True if `file_name` is a page other than the landing page.
pub(crate) fn is_listed_page(file_name: &str) -> bool {
    file_name != DEFAULT_PAGE_FILE && page_slug(file_name).is_some()
}

/// Directory holding every category of one partition.
#[must_use]
pub fn type_dir(version: &str, language: &str, doc_type: DocType) -> PathBuf {
    Path::new(version).join(language).join(doc_type.as_str())
}

/// Find the on-disk folder of a category.
///
/// `folder` is the category name without its order prefix. Exactly one
/// subdirectory of the partition must strip to it.
///
/// # Errors
///
/// Returns [`ResolveError::NotFound`] if the partition or the category does
/// not exist and [`ResolveError::AmbiguousFolder`] if several folders match.
pub fn resolve_category_folder(
    storage: &dyn Storage,
    folder: &str,
    version: &str,
    language: &str,
    doc_type: DocType,
) -> Result<PathBuf, ResolveError> {
    let parent = type_dir(version, language, doc_type);
    let matches: Vec<String> = storage
        .list_dir(&parent)?
        .into_iter()
        .filter(|entry| entry.is_dir && strip_order_prefix(&entry.name) == folder)
        .map(|entry| entry.name)
        .collect();

    match matches.as_slice() {
        [] => Err(ResolveError::not_found(format!(
            "category {folder} in {}",
            parent.display()
        ))),
        [name] => Ok(parent.join(name)),
        _ => Err(ResolveError::AmbiguousFolder {
            folder: folder.to_owned(),
            matches,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skdocs_storage::MockStorage;

    #[test]
    fn test_strip_order_prefix() {
        assert_eq!(strip_order_prefix("01_Get_Started"), "Get_Started");
        assert_eq!(strip_order_prefix("10_Products"), "Products");
        assert_eq!(strip_order_prefix("Products"), "Products");
        assert_eq!(strip_order_prefix("1_Products"), "1_Products");
        assert_eq!(strip_order_prefix("01_"), "");
    }

    #[test]
    fn test_page_slug() {
        assert_eq!(page_slug("02_Introduction.html"), Some("Introduction"));
        assert_eq!(page_slug("00_Default.html"), Some("Default"));
        assert_eq!(page_slug("notes.txt"), None);
        assert_eq!(page_slug("01_.html"), None);
    }

    #[test]
    fn test_is_listed_page_excludes_default() {
        assert!(is_listed_page("01_Introduction.html"));
        assert!(!is_listed_page(DEFAULT_PAGE_FILE));
        assert!(!is_listed_page("image.png"));
    }

    #[test]
    fn test_doc_type_round_trip() {
        assert_eq!("Doc".parse::<DocType>(), Ok(DocType::Doc));
        assert_eq!("Guide".parse::<DocType>(), Ok(DocType::Guide));
        assert!("doc".parse::<DocType>().is_err());
        assert_eq!(DocType::Guide.to_string(), "Guide");
    }

    #[test]
    fn test_type_dir() {
        assert_eq!(
            type_dir("v1", "en-US", DocType::Doc),
            PathBuf::from("v1/en-US/Doc")
        );
    }

    #[test]
    fn test_resolve_category_folder() {
        let storage = MockStorage::new()
            .with_file("v1/en-US/Doc/01_Get_Started/01_Introduction.html", "")
            .with_file("v1/en-US/Doc/02_Products/01_Bots.html", "");

        let folder =
            resolve_category_folder(&storage, "Products", "v1", "en-US", DocType::Doc).unwrap();

        assert_eq!(folder, PathBuf::from("v1/en-US/Doc/02_Products"));
    }

    #[test]
    fn test_resolve_category_folder_ignores_files() {
        let storage = MockStorage::new()
            .with_file("v1/en-US/Doc/01_Products", "")
            .with_file("v1/en-US/Doc/02_Community/01_Rules.html", "");

        let err = resolve_category_folder(&storage, "Products", "v1", "en-US", DocType::Doc)
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_resolve_category_folder_missing_category() {
        let storage = MockStorage::new().with_file("v1/en-US/Doc/01_Get_Started/01_Intro.html", "");

        let err = resolve_category_folder(&storage, "Operations", "v1", "en-US", DocType::Doc)
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_resolve_category_folder_missing_partition() {
        let storage = MockStorage::new().with_file("v1/en-US/Doc/01_Get_Started/01_Intro.html", "");

        let err = resolve_category_folder(&storage, "Get_Started", "v1", "en-US", DocType::Guide)
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_resolve_category_folder_duplicate_prefix_is_ambiguous() {
        let storage = MockStorage::new()
            .with_file("v1/en-US/Doc/02_Products/01_Bots.html", "")
            .with_file("v1/en-US/Doc/05_Products/01_Plans.html", "");

        let err = resolve_category_folder(&storage, "Products", "v1", "en-US", DocType::Doc)
            .unwrap_err();

        match err {
            ResolveError::AmbiguousFolder { folder, matches } => {
                assert_eq!(folder, "Products");
                assert_eq!(matches, vec!["02_Products", "05_Products"]);
            }
            other => panic!("expected AmbiguousFolder, got {other:?}"),
        }
    }
}
