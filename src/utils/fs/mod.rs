//! File system utilities for the document tree
//!
//! Helpers used by the matcher and the template engine to work with
//! slash-separated names relative to a document root.
//!
//! # Platform Considerations
//!
//! The case-insensitive lookup compares names with ASCII case folding, so it
//! behaves the same on case-sensitive Linux filesystems and on the
//! case-insensitive defaults of macOS and Windows.

pub mod discovery;
pub mod paths;

// Path utilities
pub use paths::{is_safe_path, join_name, normalize_path, normalize_relative, parent_name};

// File discovery
pub use discovery::{DirEntryMatch, find_files_with_extension, list_dir_case_insensitive};
