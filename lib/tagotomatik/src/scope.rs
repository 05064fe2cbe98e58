//! Directory scope matching on plain path strings.
//!
//! Paths come from the backend as strings and may use either separator, so
//! matching happens on a normalized form rather than through `std::path`.

/// Forward slashes only, without a trailing separator.
pub fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let trimmed = unified.trim_end_matches('/');
    if trimmed.is_empty() && unified.starts_with('/') {
        return "/".to_string();
    }
    trimmed.to_string()
}

/// True when `path` is `scope` itself or nested under it on a full segment
/// boundary, so `/Music2/x` is never inside `/Music`.
pub fn is_within(path: &str, scope: &str) -> bool {
    let path = normalize(path);
    let scope = normalize(scope);
    if path == scope {
        return true;
    }
    let prefix = if scope.ends_with('/') {
        scope
    } else {
        format!("{scope}/")
    };
    path.starts_with(&prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_unifies_separators_and_trailing_slash() {
        assert_eq!(normalize(r"C:\Music\Album\"), "C:/Music/Album");
        assert_eq!(normalize("/Music/"), "/Music");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn scope_includes_itself_and_descendants() {
        assert!(is_within("/Music", "/Music"));
        assert!(is_within("/Music/", "/Music"));
        assert!(is_within("/Music/A", "/Music"));
        assert!(is_within("/Music/A/B", "/Music/"));
        assert!(is_within(r"C:\Music\A", "C:/Music"));
    }

    #[test]
    fn sibling_with_common_prefix_is_outside() {
        assert!(!is_within("/Music2", "/Music"));
        assert!(!is_within("/Music2/A", "/Music"));
        assert!(!is_within("/Musical/A", "/Music"));
        assert!(!is_within("/Music", "/Music/A"));
    }

    #[test]
    fn root_scope_contains_everything_absolute() {
        assert!(is_within("/Music/A", "/"));
        assert!(is_within("/", "/"));
    }
}
