//! Request resolution, the public entry point of the engine.
//!
//! [`resolve`] turns a request path into an [`Outcome`]:
//!
//! - an HTML document is its own template and is rendered with the caller's
//!   context unchanged
//! - a Markdown document is split, composed and rendered with its wrapper
//!   template; the composed context overlays the caller's context
//! - a Markdown document without `wrapper_template` is not a page and resolves
//!   to [`Outcome::NotFound`], exactly like a missing file
//! - a path that only matches with different letter case redirects to the
//!   canonical casing, provided that target would itself render
//!
//! Resolution reads the tree on every call and keeps no state between calls,
//! so it is safe to run from many threads at once against the same
//! [`DocumentRoot`].
//!
//! # Example
//!
//! ```rust,no_run
//! use template_finder::core::{DocumentRoot, RenderContext};
//! use template_finder::resolver::{Outcome, resolve};
//!
//! # fn example() -> Result<(), template_finder::core::FinderError> {
//! let root = DocumentRoot::single("templates");
//! match resolve("/md-templates", RenderContext::new(), &root)? {
//!     Outcome::Render { template, context } => println!("render {template} with {context:?}"),
//!     Outcome::Redirect(target) => println!("302 {}", target.to_url_path()),
//!     Outcome::NotFound => println!("404"),
//! }
//! # Ok(())
//! # }
//! ```

use tracing::debug;

use crate::composer::{Composition, compose_file};
use crate::core::{DocumentRoot, FinderError, RenderContext, RequestPath, merge_context};
use crate::markdown::MarkdownConverter;
use crate::matcher::{DocumentKind, MatchResult, MatchedDocument, match_path_with};

/// What the host should do with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Render `template` with `context`.
    ///
    /// `template` is the root-relative name [`TemplateRenderer`] expects,
    /// without a leading slash: a wrapper reference `/wrapper.html` arrives as
    /// `wrapper.html`.
    ///
    /// [`TemplateRenderer`]: crate::templating::TemplateRenderer
    Render {
        template: String,
        context: RenderContext,
    },
    /// Redirect to the canonical casing of the requested path.
    Redirect(RequestPath),
    /// Nothing to serve.
    NotFound,
}

/// Resolve `request_path` with the default Markdown converter.
///
/// # Errors
///
/// Returns a [`FinderError`] when the matched document is broken: malformed
/// frontmatter, a missing include, an invalid template reference or an
/// unreadable file.
pub fn resolve(
    request_path: &str,
    caller_context: RenderContext,
    root: &DocumentRoot,
) -> Result<Outcome, FinderError> {
    resolve_with(request_path, caller_context, root, &MarkdownConverter::default())
}

/// Resolve `request_path` using `converter` for Markdown documents.
///
/// # Errors
///
/// See [`resolve`].
pub fn resolve_with(
    request_path: &str,
    caller_context: RenderContext,
    root: &DocumentRoot,
    converter: &MarkdownConverter,
) -> Result<Outcome, FinderError> {
    let Some(request) = RequestPath::parse(request_path) else {
        debug!("Rejecting unusable request path '{}'", request_path);
        return Ok(Outcome::NotFound);
    };

    let matched = match_path_with(&request, root, |doc| is_renderable(doc, root, converter));

    match matched {
        MatchResult::NotFound => Ok(Outcome::NotFound),
        MatchResult::Redirect(target) => Ok(Outcome::Redirect(target)),
        MatchResult::Found(MatchedDocument {
            name,
            kind: DocumentKind::Html,
        }) => Ok(Outcome::Render {
            template: name,
            context: caller_context,
        }),
        MatchResult::Found(MatchedDocument {
            name,
            kind: DocumentKind::Markdown,
        }) => match compose_file(root, &name, converter)? {
            Composition::Invalid => Ok(Outcome::NotFound),
            Composition::Composed(composed) => {
                let mut context = caller_context;
                merge_context(&mut context, composed.context);
                debug!("Resolved '{}' via {} to {}", request, name, composed.template_path);
                Ok(Outcome::Render {
                    template: composed.template_path,
                    context,
                })
            }
        },
    }
}

// A redirect target must compose into a page, not merely exist.
fn is_renderable(
    doc: &MatchedDocument,
    root: &DocumentRoot,
    converter: &MarkdownConverter,
) -> Result<bool, FinderError> {
    match doc.kind {
        DocumentKind::Html => Ok(true),
        DocumentKind::Markdown => {
            Ok(matches!(compose_file(root, &doc.name, converter)?, Composition::Composed(_)))
        }
    }
}
