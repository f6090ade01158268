//! Template and include reference resolution.
//!
//! References in frontmatter come in two forms:
//!
//! - absolute (`/wrapper.html`): relative to the document root
//! - relative (`_nav.md`, `../base.html`): relative to the directory of the
//!   document that contains the reference
//!
//! Both resolve to a root-relative name without a leading slash, which is the
//! form [`DocumentRoot`](crate::core::DocumentRoot) lookups and template names
//! use.

use crate::core::FinderError;
use crate::utils::fs::{join_name, normalize_relative, parent_name};

/// Resolve `reference` as written in `document` to a root-relative name.
///
/// # Errors
///
/// Returns [`FinderError::InvalidTemplateReference`] if the reference is empty,
/// climbs above the document root, or names the root itself.
pub fn resolve_reference(reference: &str, document: &str) -> Result<String, FinderError> {
    let invalid = |reason: &str| FinderError::InvalidTemplateReference {
        reference: reference.to_string(),
        document: document.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(invalid("reference is empty"));
    }
    if trimmed.contains('\\') {
        return Err(invalid("use '/' as the path separator"));
    }

    let joined = match trimmed.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => join_name(parent_name(document), trimmed),
    };

    let name = normalize_relative(&joined).ok_or_else(|| invalid("escapes the document root"))?;
    if name.is_empty() {
        return Err(invalid("does not name a file"));
    }
    Ok(name)
}
