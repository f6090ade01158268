//! Shared utilities
//!
//! - [`fs`] - Path normalization and directory search helpers

pub mod fs;
