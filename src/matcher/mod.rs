//! Request path to source file matching.
//!
//! A request path `p` is matched against the document root by probing, in this
//! order and stopping at the first file that exists:
//!
//! 1. `p.html`
//! 2. `p/index.html`
//! 3. `p.md`
//! 4. `p/index.md`
//!
//! HTML wins over Markdown and an exact file wins over a directory index. For
//! the tree root only the two index files are probed.
//!
//! When nothing matches, the [`case_insensitive`] fallback looks for a single
//! on-disk path that differs from the request only in letter case and answers
//! with a redirect to it.
//!
//! # Example
//!
//! ```rust,no_run
//! use template_finder::core::{DocumentRoot, RequestPath};
//! use template_finder::matcher::{MatchResult, match_path};
//!
//! let root = DocumentRoot::single("templates");
//! let path = RequestPath::parse("/a-directory").unwrap();
//!
//! match match_path(&path, &root) {
//!     MatchResult::Found(doc) => println!("serve {}", doc.name),
//!     MatchResult::Redirect(target) => println!("redirect to {}", target.to_url_path()),
//!     MatchResult::NotFound => println!("404"),
//! }
//! ```

pub mod case_insensitive;

use tracing::debug;

use crate::constants::{HTML_EXTENSION, INDEX_STEM, MARKDOWN_EXTENSION};
use crate::core::{DocumentRoot, FinderError, RequestPath};
use crate::utils::fs::join_name;

pub use case_insensitive::case_insensitive_candidates;

/// How a matched document is turned into a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Served directly as a template with the caller's context.
    Html,
    /// Composed from frontmatter, body and includes before rendering.
    Markdown,
}

impl DocumentKind {
    /// File extension (without the dot) for this kind.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Html => HTML_EXTENSION,
            Self::Markdown => MARKDOWN_EXTENSION,
        }
    }
}

/// A document found for a request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchedDocument {
    /// Root-relative file name, e.g. `a-directory/index.html`
    pub name: String,
    /// Whether the file is HTML or Markdown
    pub kind: DocumentKind,
}

/// Result of matching a request path against a document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// A file was found with exactly the requested casing.
    Found(MatchedDocument),
    /// Exactly one path differing only in case resolves; redirect to it.
    Redirect(RequestPath),
    /// Nothing usable matched.
    NotFound,
}

/// The four probes for `request`, in priority order.
#[must_use]
pub fn probe_names(request: &RequestPath) -> Vec<MatchedDocument> {
    let path = request.as_str();
    let index = |ext: &str| join_name(path, &format!("{INDEX_STEM}.{ext}"));

    let mut probes = Vec::with_capacity(4);
    for kind in [DocumentKind::Html, DocumentKind::Markdown] {
        let ext = kind.extension();
        if !request.is_root() {
            probes.push(MatchedDocument {
                name: format!("{path}.{ext}"),
                kind,
            });
        }
        probes.push(MatchedDocument {
            name: index(ext),
            kind,
        });
    }
    probes
}

/// Look up `request` with its exact casing.
///
/// Probing stops at the first existing file.
#[must_use]
pub fn find_exact(request: &RequestPath, root: &DocumentRoot) -> Option<MatchedDocument> {
    probe_names(request).into_iter().find(|probe| {
        let exists = root.exists(&probe.name);
        debug!("Probe {} -> {}", probe.name, if exists { "found" } else { "missing" });
        exists
    })
}

/// Match `request` against `root`.
///
/// A case-insensitive candidate is only redirected to when an exact lookup of
/// its canonical path finds a file.
#[must_use]
pub fn match_path(request: &RequestPath, root: &DocumentRoot) -> MatchResult {
    match_path_with(request, root, |_| Ok(true))
}

/// Match `request` against `root`, with an extra check on redirect targets.
///
/// `is_renderable` is called with the document an exact lookup of the single
/// case-insensitive candidate finds. Returning `false` (or an error) turns the
/// redirect into [`MatchResult::NotFound`], so a redirect never points at a
/// page that would not render. Errors from `is_renderable` are logged and
/// count as "not renderable".
#[must_use]
pub fn match_path_with<F>(request: &RequestPath, root: &DocumentRoot, is_renderable: F) -> MatchResult
where
    F: Fn(&MatchedDocument) -> Result<bool, FinderError>,
{
    if let Some(found) = find_exact(request, root) {
        debug!("Matched '{}' to {:?} document {}", request, found.kind, found.name);
        return MatchResult::Found(found);
    }

    let candidates = case_insensitive_candidates(request, root);
    let [candidate] = candidates.as_slice() else {
        debug!(
            "No exact match for '{}' and {} case-insensitive candidate(s)",
            request,
            candidates.len()
        );
        return MatchResult::NotFound;
    };

    if candidate == request {
        return MatchResult::NotFound;
    }

    let Some(target) = find_exact(candidate, root) else {
        debug!("Candidate '{}' does not resolve exactly", candidate);
        return MatchResult::NotFound;
    };

    match is_renderable(&target) {
        Ok(true) => {
            debug!("Redirecting '{}' to canonical '{}'", request, candidate);
            MatchResult::Redirect(candidate.clone())
        }
        Ok(false) => {
            debug!("Candidate '{}' resolves to a document that is not a page", candidate);
            MatchResult::NotFound
        }
        Err(e) => {
            tracing::warn!("Not redirecting '{}' to '{}': {}", request, candidate, e);
            MatchResult::NotFound
        }
    }
}
