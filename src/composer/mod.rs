//! Composition of Markdown documents into template contexts.
//!
//! A Markdown document is a page only if its frontmatter names a
//! `wrapper_template`. Composing a page produces the root-relative name of that
//! template plus a [`RenderContext`] built in this order:
//!
//! 1. the frontmatter `context` mapping, verbatim
//! 2. one key per `markdown_includes` entry, holding the converted HTML of the
//!    included file's raw text (an include's own frontmatter is not interpreted)
//! 3. `html_content`, holding the converted body of the document itself
//!
//! Later steps win on key collisions, so `html_content` is always the body.

pub mod template_ref;

use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::HTML_CONTENT_KEY;
use crate::core::{DocumentRoot, FinderError, RenderContext};
use crate::markdown::{FrontMatter, MarkdownConverter, split};

pub use template_ref::resolve_reference;

/// A page ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedDocument {
    /// Root-relative name of the wrapper template
    pub template_path: String,
    /// Context to render the wrapper template with
    pub context: RenderContext,
}

/// Result of composing a Markdown document.
#[derive(Debug, Clone, PartialEq)]
pub enum Composition {
    /// The document is a page.
    Composed(ComposedDocument),
    /// The document has no `wrapper_template` and is not a page.
    Invalid,
}

/// Compose `document` from its already split `metadata` and `body`.
///
/// `document` is the root-relative name of the Markdown file; relative
/// references are resolved against its directory.
///
/// The context is built from frontmatter `context`, then one entry per
/// include, then `html_content` holding the converted body. `html_content` is
/// reserved for the body: a frontmatter `context.html_content` is overwritten
/// and an include keyed `html_content` is skipped with a warning.
///
/// # Errors
///
/// - [`FinderError::InvalidTemplateReference`] for references that escape the root
/// - [`FinderError::IncludeNotFound`] if an include does not exist
/// - [`FinderError::DocumentReadError`] if an include cannot be read
pub fn compose(
    root: &DocumentRoot,
    document: &str,
    metadata: FrontMatter,
    body: &str,
    converter: &MarkdownConverter,
) -> Result<Composition, FinderError> {
    let Some(wrapper) = metadata.wrapper_template else {
        debug!("'{}' has no wrapper_template; not a page", document);
        return Ok(Composition::Invalid);
    };

    let template_path = resolve_reference(&wrapper, document)?;
    let mut context = metadata.context.unwrap_or_default();

    for include in metadata.markdown_includes {
        if include.key == HTML_CONTENT_KEY {
            warn!(
                "Ignoring include '{}' in '{}': '{}' is reserved for the document body",
                include.path, document, HTML_CONTENT_KEY
            );
            continue;
        }

        let path = resolve_reference(&include.path, document)?;
        let raw = root.read(&path)?.ok_or_else(|| FinderError::IncludeNotFound {
            include: include.key.clone(),
            path: path.clone(),
            document: document.to_string(),
        })?;

        debug!("Including '{}' as '{}' in '{}'", path, include.key, document);
        context.insert(include.key, Value::String(converter.convert(&raw)));
    }

    context.insert(HTML_CONTENT_KEY.to_string(), Value::String(converter.convert(body)));

    Ok(Composition::Composed(ComposedDocument {
        template_path,
        context,
    }))
}

/// Read, split and compose the Markdown file `document`.
///
/// A file that has disappeared since it was matched is treated like a document
/// that is not a page.
///
/// # Errors
///
/// Everything [`split`] and [`compose`] return.
pub fn compose_file(
    root: &DocumentRoot,
    document: &str,
    converter: &MarkdownConverter,
) -> Result<Composition, FinderError> {
    let Some(raw) = root.read(document)? else {
        debug!("'{}' vanished before it could be composed", document);
        return Ok(Composition::Invalid);
    };

    let (metadata, body) = split(&raw, document)?;
    compose(root, document, metadata, &body, converter)
}
