//! Namespace helpers shared by clients, repositories and wrappers.

use crate::error::{SavedObjectsError, SavedObjectsErrorHelpers};
use crate::models::{FindOptions, FindResponse};

/// Space id of the default space, which maps to the `None` namespace.
pub const DEFAULT_NAMESPACE_STRING: &str = "default";

/// Space id matching every space.
pub const ALL_NAMESPACES_STRING: &str = "*";

/// Placeholder for a space the caller is not allowed to see.
pub const UNKNOWN_SPACE: &str = "?";

/// Convert a namespace id to its space-id string form.
#[must_use]
pub fn namespace_id_to_string(namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => ns.to_owned(),
        _ => DEFAULT_NAMESPACE_STRING.to_owned(),
    }
}

/// Convert a space-id string to its namespace id.
///
/// # Errors
/// Returns a bad-request error for an empty string.
pub fn namespace_string_to_id(
    namespace: &str,
    errors: &dyn SavedObjectsErrorHelpers,
) -> Result<Option<String>, SavedObjectsError> {
    if namespace.is_empty() {
        return Err(errors.create_bad_request_error("namespace cannot be an empty string"));
    }
    if namespace == DEFAULT_NAMESPACE_STRING {
        return Ok(None);
    }
    Ok(Some(namespace.to_owned()))
}

/// An empty page for `options`, used when nothing can be returned.
#[must_use]
pub fn create_empty_find_response(options: &FindOptions, default_per_page: usize) -> FindResponse {
    FindResponse {
        saved_objects: Vec::new(),
        total: 0,
        page: options.page,
        per_page: options.per_page.unwrap_or(default_per_page),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::DefaultErrorHelpers;

    #[test]
    fn default_namespace_round_trips() {
        assert_eq!(namespace_id_to_string(None), "default");
        assert_eq!(namespace_id_to_string(Some("")), "default");
        assert_eq!(namespace_id_to_string(Some("sales")), "sales");

        assert_eq!(
            namespace_string_to_id("default", &DefaultErrorHelpers).unwrap(),
            None
        );
        assert_eq!(
            namespace_string_to_id("sales", &DefaultErrorHelpers).unwrap(),
            Some("sales".to_owned())
        );
    }

    #[test]
    fn empty_namespace_string_is_rejected() {
        let err = namespace_string_to_id("", &DefaultErrorHelpers).unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn empty_find_response_keeps_paging() {
        let options = FindOptions {
            page: 3,
            per_page: Some(50),
            ..FindOptions::default()
        };
        let response = create_empty_find_response(&options, 20);

        assert_eq!(response.total, 0);
        assert_eq!(response.page, 3);
        assert_eq!(response.per_page, 50);
        assert!(response.saved_objects.is_empty());
    }
}
