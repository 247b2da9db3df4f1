//! Request parameter validation.
//!
//! Path parameters are checked against allow-lists and query values against
//! path traversal before anything touches storage.

use skdocs_site::DocType;

use crate::error::ServerError;
use crate::state::AppState;

/// Check `version` and `language` against the configured allow-lists.
pub(crate) fn check_release(
    state: &AppState,
    version: &str,
    language: &str,
) -> Result<(), ServerError> {
    if !state.versions.iter().any(|v| v == version) {
        return Err(ServerError::validation(format!("Invalid version: {version}")));
    }
    check_language(state, language)
}

/// Check `language` against the configured allow-list.
pub(crate) fn check_language(state: &AppState, language: &str) -> Result<(), ServerError> {
    if !state.languages.iter().any(|l| l == language) {
        return Err(ServerError::validation(format!(
            "Invalid language: {language}"
        )));
    }
    Ok(())
}

/// Parse a `Doc`/`Guide` path segment.
pub(crate) fn parse_doc_type(value: &str) -> Result<DocType, ServerError> {
    value
        .parse()
        .map_err(|_| ServerError::validation(format!("Invalid type: {value}")))
}

/// Require a query value that names a single folder or page.
pub(crate) fn require_segment<'a>(
    field: &str,
    value: Option<&'a str>,
) -> Result<&'a str, ServerError> {
    let value = require(field, value)?;
    if value.contains(['/', '\\']) || value.contains("..") {
        return Err(ServerError::validation(format!("Invalid {field}: {value}")));
    }
    Ok(value)
}

/// Require a non-empty query value.
pub(crate) fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, ServerError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ServerError::validation(format!("Missing required parameter: {field}")))
}
