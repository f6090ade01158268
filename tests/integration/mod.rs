//! Integration test suite for template-finder
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **resolution**: Request path matching and lookup order
//! - **case_insensitive**: Redirects to canonical casing
//! - **markdown_pages**: Frontmatter, includes and context composition
//! - **rendering**: Resolved pages rendered through Tera
//! - **cli**: The `template-finder` binary
//!
//! Fixture trees come from [`template_finder::test_utils::DocumentTree`].

mod case_insensitive;
mod cli;
mod markdown_pages;
mod rendering;
mod resolution;
