//! The ordered set of directories documents are searched in.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::FinderError;
use crate::utils::fs::{DirEntryMatch, is_safe_path, list_dir_case_insensitive, normalize_relative};

/// One or more base directories, searched in order; the first hit wins.
///
/// Every lookup goes through a `DocumentRoot` value passed in by the caller.
/// Nothing is cached, so concurrent resolutions only ever share immutable data
/// and always see the tree as it is on disk at the time of the call.
///
/// Names passed to the lookup methods are slash-separated and relative to the
/// roots (`a-directory/index.html`). Names that would climb out of a root are
/// treated as missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRoot {
    dirs: Vec<PathBuf>,
}

impl DocumentRoot {
    /// Create a document root from an ordered list of directories.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::ConfigError`] if `dirs` is empty.
    pub fn new(dirs: Vec<PathBuf>) -> Result<Self, FinderError> {
        if dirs.is_empty() {
            return Err(FinderError::ConfigError {
                message: "at least one document root directory is required".to_string(),
            });
        }
        Ok(Self {
            dirs,
        })
    }

    /// Create a document root with a single directory.
    pub fn single(dir: impl Into<PathBuf>) -> Self {
        Self {
            dirs: vec![dir.into()],
        }
    }

    /// The directories in search order.
    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Find the on-disk path of the first regular file called `name`.
    #[must_use]
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let name = normalize_relative(name)?;
        if name.is_empty() {
            return None;
        }

        self.dirs.iter().find_map(|dir| {
            let candidate = join_segments(dir, &name);
            (is_safe_path(dir, &candidate) && candidate.is_file()).then_some(candidate)
        })
    }

    /// Whether a regular file called `name` exists under any root.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.locate(name).is_some()
    }

    /// Read the file called `name` as UTF-8 text.
    ///
    /// Returns `Ok(None)` when no root contains the file.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::DocumentReadError`] if the file exists but cannot be read.
    pub fn read(&self, name: &str) -> Result<Option<String>, FinderError> {
        let Some(path) = self.locate(name) else {
            return Ok(None);
        };

        debug!("Reading document {} from {}", name, path.display());
        std::fs::read_to_string(&path).map(Some).map_err(|e| FinderError::DocumentReadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// List children of directory `dir_name` matching any of `candidates`,
    /// ignoring case, across every root.
    ///
    /// Entries with the same on-disk name in several roots are reported once.
    #[must_use]
    pub fn list_case_insensitive(&self, dir_name: &str, candidates: &[&str]) -> Vec<DirEntryMatch> {
        let mut found: Vec<DirEntryMatch> = Vec::new();

        for dir in &self.dirs {
            let base = join_segments(dir, dir_name);
            for entry in list_dir_case_insensitive(&base, candidates) {
                match found.iter_mut().find(|f| f.name == entry.name) {
                    Some(existing) => existing.is_dir |= entry.is_dir,
                    None => found.push(entry),
                }
            }
        }

        found
    }
}

fn join_segments(dir: &Path, name: &str) -> PathBuf {
    name.split('/').filter(|s| !s.is_empty()).fold(dir.to_path_buf(), |path, s| path.join(s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_requires_a_directory() {
        assert!(matches!(DocumentRoot::new(Vec::new()), Err(FinderError::ConfigError { .. })));
    }

    #[test]
    fn test_locate_prefers_earlier_roots() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        std::fs::write(first.path().join("shared.html"), "first").unwrap();
        std::fs::write(second.path().join("shared.html"), "second").unwrap();
        std::fs::write(second.path().join("only-second.html"), "second").unwrap();

        let root =
            DocumentRoot::new(vec![first.path().to_path_buf(), second.path().to_path_buf()])
                .unwrap();

        assert_eq!(root.read("shared.html").unwrap().as_deref(), Some("first"));
        assert_eq!(root.read("only-second.html").unwrap().as_deref(), Some("second"));
        assert_eq!(root.read("missing.html").unwrap(), None);
    }

    #[test]
    fn test_locate_ignores_directories_and_traversal() {
        let temp = tempdir().unwrap();
        std::fs::create_dir(temp.path().join("a-directory")).unwrap();
        std::fs::write(temp.path().join("a-directory/index.html"), "").unwrap();

        let root = DocumentRoot::single(temp.path());
        assert!(!root.exists("a-directory"));
        assert!(root.exists("a-directory/index.html"));
        assert!(root.exists("a-directory/../a-directory/index.html"));
        assert!(!root.exists("../index.html"));
        assert!(!root.exists(""));
    }

    #[test]
    fn test_list_case_insensitive_across_roots() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        std::fs::write(first.path().join("Page.html"), "").unwrap();
        std::fs::write(second.path().join("page.md"), "").unwrap();
        std::fs::write(second.path().join("Page.html"), "").unwrap();

        let root =
            DocumentRoot::new(vec![first.path().to_path_buf(), second.path().to_path_buf()])
                .unwrap();
        let entries = root.list_case_insensitive("", &["PAGE.html", "PAGE.md"]);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Page.html", "page.md"]);
    }
}
