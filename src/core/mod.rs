//! Core types and error handling for template-finder
//!
//! - [`error`] - [`FinderError`] taxonomy and user-friendly error reporting
//! - [`DocumentRoot`] - ordered search directories for documents and templates
//! - [`RequestPath`] - normalized, traversal-free request paths
//! - [`RenderContext`] - the key/value mapping handed to the template engine

pub mod document_root;
pub mod error;
pub mod request_path;

pub use document_root::DocumentRoot;
pub use error::{ErrorContext, FinderError, user_friendly_error};
pub use request_path::RequestPath;

/// Mapping handed to the template engine.
///
/// It is only ever extended by union-merge: later writes win on key collisions.
pub type RenderContext = serde_json::Map<String, serde_json::Value>;

/// Merge `overlay` into `base`; keys from `overlay` replace existing ones.
pub fn merge_context(base: &mut RenderContext, overlay: RenderContext) {
    for (key, value) in overlay {
        base.insert(key, value);
    }
}
