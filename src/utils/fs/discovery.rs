//! File discovery and search operations.
//!
//! Two kinds of search are needed by the document tree: a shallow listing of
//! one directory filtered case-insensitively (the redirect fallback walks the
//! request path one segment at a time), and a recursive listing of every
//! template file under a root (the template engine loads them all by name).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory entry returned by [`list_dir_case_insensitive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryMatch {
    /// File name exactly as stored on disk
    pub name: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

/// Lists entries of `dir` whose file name equals one of `candidates`,
/// ignoring ASCII case.
///
/// Only the direct children of `dir` are inspected. A missing or unreadable
/// directory yields an empty list. Results are sorted by name so callers see a
/// stable order regardless of the filesystem.
///
/// # Examples
///
/// ```rust,no_run
/// use template_finder::utils::fs::list_dir_case_insensitive;
/// use std::path::Path;
///
/// let matches = list_dir_case_insensitive(Path::new("templates"), &["a-file", "a-file.html"]);
/// for entry in matches {
///     println!("{} (dir: {})", entry.name, entry.is_dir);
/// }
/// ```
#[must_use]
pub fn list_dir_case_insensitive(dir: &Path, candidates: &[&str]) -> Vec<DirEntryMatch> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut matches: Vec<DirEntryMatch> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            candidates.iter().any(|c| c.eq_ignore_ascii_case(&name)).then(|| DirEntryMatch {
                name,
                is_dir: entry.file_type().is_dir(),
            })
        })
        .collect();

    matches.sort_by(|a, b| a.name.cmp(&b.name));
    matches
}

/// Recursively finds files with the given extension under `root`.
///
/// Returns `(name, path)` pairs where `name` is the slash-separated path
/// relative to `root`. The extension comparison is exact.
pub fn find_files_with_extension(root: &Path, extension: &str) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();

    if !root.exists() {
        return Ok(files);
    }

    for entry in WalkDir::new(root).follow_links(true) {
        let entry =
            entry.with_context(|| format!("Failed to walk document root {}", root.display()))?;
        let path = entry.path();

        if !entry.file_type().is_file()
            || path.extension().and_then(|e| e.to_str()) != Some(extension)
        {
            continue;
        }

        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((name, path.to_path_buf()));
    }

    files.sort();
    Ok(files)
}
