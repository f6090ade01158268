//! Normalized request paths.

use std::fmt;

/// A slash-separated request path without leading or trailing slashes.
///
/// The empty path addresses the root of the document tree. Paths containing
/// `.` or `..` segments, backslashes or NUL bytes are rejected at parse time,
/// which makes them unreachable rather than letting them climb out of a root.
///
/// # Examples
///
/// ```rust,no_run
/// use template_finder::core::RequestPath;
///
/// let path = RequestPath::parse("/a-directory/another-file/").unwrap();
/// assert_eq!(path.as_str(), "a-directory/another-file");
/// assert!(RequestPath::parse("/").unwrap().is_root());
/// assert!(RequestPath::parse("/a/../secret").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestPath(String);

impl RequestPath {
    /// Parse a raw request path, collapsing repeated slashes.
    ///
    /// Returns `None` for paths that cannot name a document.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.contains('\\') || raw.contains('\0') {
            return None;
        }

        let mut segments = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" => {}
                "." | ".." => return None,
                s => segments.push(s),
            }
        }

        Some(Self(segments.join("/")))
    }

    /// The normalized path, without a leading slash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this path addresses the tree root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// The path as a URL path with a leading slash, as used in `Location` headers.
    #[must_use]
    pub fn to_url_path(&self) -> String {
        format!("/{}", self.0)
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_slashes() {
        assert_eq!(RequestPath::parse("/a-file").unwrap().as_str(), "a-file");
        assert_eq!(RequestPath::parse("a-directory/").unwrap().as_str(), "a-directory");
        assert_eq!(RequestPath::parse("//a//b//").unwrap().as_str(), "a/b");
    }

    #[test]
    fn test_root() {
        assert!(RequestPath::parse("").unwrap().is_root());
        assert!(RequestPath::parse("/").unwrap().is_root());
        assert!(!RequestPath::parse("/x").unwrap().is_root());
    }

    #[test]
    fn test_rejects_traversal() {
        assert!(RequestPath::parse("../etc/passwd").is_none());
        assert!(RequestPath::parse("/a/./b").is_none());
        assert!(RequestPath::parse("a\\b").is_none());
    }

    #[test]
    fn test_segments_and_url() {
        let path = RequestPath::parse("/A-Directory/File").unwrap();
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["A-Directory", "File"]);
        assert_eq!(path.to_url_path(), "/A-Directory/File");
        assert_eq!(path.to_string(), "A-Directory/File");
        assert_eq!(RequestPath::parse("/").unwrap().segments().count(), 0);
    }
}
