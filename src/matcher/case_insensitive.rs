//! Case-insensitive fallback lookup.
//!
//! The request path is walked one segment at a time. Intermediate segments
//! match directories whose names are equal ignoring case; the final segment
//! matches a directory, or a file named `<segment>`, `<segment>.html` or
//! `<segment>.md`, again ignoring case. Every path reached this way is a
//! candidate, reported with its on-disk casing and without the extension.
//!
//! Several directories at one level can match (`Docs/` and `docs/` on a
//! case-sensitive filesystem), so the walk keeps a set of branches instead of
//! a single cursor.

use tracing::debug;

use crate::constants::{HTML_EXTENSION, MARKDOWN_EXTENSION};
use crate::core::{DocumentRoot, RequestPath};
use crate::utils::fs::join_name;

/// Collect canonical-cased paths that equal `request` ignoring case.
///
/// Candidates are unique and sorted. The tree root never yields candidates.
#[must_use]
pub fn case_insensitive_candidates(request: &RequestPath, root: &DocumentRoot) -> Vec<RequestPath> {
    let segments: Vec<&str> = request.segments().collect();
    let Some((last, parents)) = segments.split_last() else {
        return Vec::new();
    };

    let mut branches = vec![String::new()];
    for segment in parents {
        let mut next = Vec::new();
        for dir in &branches {
            for entry in root.list_case_insensitive(dir, &[*segment]) {
                if entry.is_dir {
                    push_unique(&mut next, join_name(dir, &entry.name));
                }
            }
        }
        if next.is_empty() {
            debug!("No directory matches '{}' case-insensitively", segment);
            return Vec::new();
        }
        branches = next;
    }

    let html = format!("{last}.{HTML_EXTENSION}");
    let markdown = format!("{last}.{MARKDOWN_EXTENSION}");
    let wanted = [*last, html.as_str(), markdown.as_str()];

    let mut candidates = Vec::new();
    for dir in &branches {
        for entry in root.list_case_insensitive(dir, &wanted) {
            let stem = if entry.is_dir || entry.name.eq_ignore_ascii_case(last) {
                entry.name.as_str()
            } else {
                strip_document_extension(&entry.name)
            };
            push_unique(&mut candidates, join_name(dir, stem));
        }
    }

    let wanted_lower = request.as_str().to_ascii_lowercase();
    let mut result: Vec<RequestPath> = candidates
        .iter()
        .filter(|c| c.to_ascii_lowercase() == wanted_lower)
        .filter_map(|c| RequestPath::parse(c))
        .collect();
    result.sort();

    debug!("Case-insensitive candidates for '{}': {:?}", request, result);
    result
}

fn strip_document_extension(name: &str) -> &str {
    [HTML_EXTENSION, MARKDOWN_EXTENSION]
        .iter()
        .find_map(|ext| {
            let (stem, found) = name.rsplit_once('.')?;
            found.eq_ignore_ascii_case(ext).then_some(stem)
        })
        .unwrap_or(name)
}

fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.contains(&item) {
        items.push(item);
    }
}
