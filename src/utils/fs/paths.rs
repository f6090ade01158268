//! Path utilities for normalization and containment checks.
//!
//! Template names inside a document tree are slash-separated and relative to a
//! document root. These helpers resolve `.` and `..` in such names and make sure
//! the result never leaves the root it is joined to.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path by resolving `.` and `..` components.
///
/// This performs logical resolution without touching the filesystem. A `..`
/// that would climb above the first component is dropped.
///
/// # Examples
///
/// ```rust,no_run
/// use template_finder::utils::fs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// let path = Path::new("/foo/./bar/../baz");
/// assert_eq!(normalize_path(path), PathBuf::from("/foo/baz"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Checks that `path` stays inside `base` once both are normalized.
///
/// Relative paths are joined to `base` first; absolute paths are compared as-is.
///
/// # Examples
///
/// ```rust,no_run
/// use template_finder::utils::fs::is_safe_path;
/// use std::path::Path;
///
/// let base = Path::new("/srv/site");
/// assert!(is_safe_path(base, Path::new("blog/index.md")));
/// assert!(!is_safe_path(base, Path::new("/etc/passwd")));
/// ```
#[must_use]
pub fn is_safe_path(base: &Path, path: &Path) -> bool {
    let normalized_base = normalize_path(base);
    let normalized_path = if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    };

    normalized_path.starts_with(normalized_base)
}

/// Resolves `.` and `..` in a slash-separated, root-relative name.
///
/// Returns `None` when a `..` would climb above the root. Empty segments are
/// dropped, so `a//b/` becomes `a/b`.
///
/// # Examples
///
/// ```rust,no_run
/// use template_finder::utils::fs::normalize_relative;
///
/// assert_eq!(normalize_relative("docs/./guide/../_nav.md").as_deref(), Some("docs/_nav.md"));
/// assert_eq!(normalize_relative("../outside.html"), None);
/// ```
#[must_use]
pub fn normalize_relative(name: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in name.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            s => segments.push(s),
        }
    }

    Some(segments.join("/"))
}

/// Returns the directory part of a slash-separated name (`""` for top-level names).
#[must_use]
pub fn parent_name(name: &str) -> &str {
    name.rsplit_once('/').map_or("", |(parent, _)| parent)
}

/// Joins two slash-separated names, skipping empty sides.
#[must_use]
pub fn join_name(parent: &str, child: &str) -> String {
    match (parent.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{parent}/{child}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("/foo/./bar/../baz")), PathBuf::from("/foo/baz"));
        assert_eq!(normalize_path(Path::new("foo/./bar")), PathBuf::from("foo/bar"));
        assert_eq!(normalize_path(Path::new("/foo/bar/..")), PathBuf::from("/foo"));
    }

    #[test]
    fn test_is_safe_path() {
        let base = Path::new("/srv/site");

        assert!(is_safe_path(base, Path::new("a-directory/index.html")));
        assert!(is_safe_path(base, Path::new("./md-templates/a-file.md")));
        assert!(!is_safe_path(base, Path::new("../other/file.html")));
        assert!(!is_safe_path(base, Path::new("/etc/passwd")));
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize_relative("a/b/c").as_deref(), Some("a/b/c"));
        assert_eq!(normalize_relative("a/./b/../c").as_deref(), Some("a/c"));
        assert_eq!(normalize_relative("/a//b/").as_deref(), Some("a/b"));
        assert_eq!(normalize_relative("a/..").as_deref(), Some(""));
        assert_eq!(normalize_relative("a/../../b"), None);
        assert_eq!(normalize_relative(".."), None);
    }

    #[test]
    fn test_parent_and_join() {
        assert_eq!(parent_name("md-templates/index.md"), "md-templates");
        assert_eq!(parent_name("index.md"), "");
        assert_eq!(join_name("", "wrapper.html"), "wrapper.html");
        assert_eq!(join_name("docs", "wrapper.html"), "docs/wrapper.html");
        assert_eq!(join_name("docs", ""), "docs");
    }
}
