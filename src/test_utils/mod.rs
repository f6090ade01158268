//! Test utilities for template-finder
//!
//! Helpers for building throwaway document trees and enabling logging in tests.
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite.
//!
//! # Example
//!
//! ```rust,no_run
//! use template_finder::test_utils::DocumentTree;
//!
//! let tree = DocumentTree::new()
//!     .file("index.html", "homepage")
//!     .file("a-directory/index.html", "subpath index");
//! let root = tree.root();
//! ```

use std::path::{Path, PathBuf};
use std::sync::Once;

use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::core::DocumentRoot;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, nothing is
/// logged. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=template_finder=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// A document tree in a temporary directory, removed on drop.
pub struct DocumentTree {
    dir: TempDir,
}

impl DocumentTree {
    /// Create an empty tree.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Write `content` to the slash-separated `name`, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn file(self, name: &str, content: &str) -> Self {
        self.write(name, content);
        self
    }

    /// Like [`file`](Self::file), for trees that are already in use.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write(&self, name: &str, content: &str) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&path, content).expect("Failed to write fixture file");
    }

    /// Remove the file called `name`.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be removed.
    pub fn remove(&self, name: &str) {
        std::fs::remove_file(self.path().join(name)).expect("Failed to remove fixture file");
    }

    /// The directory holding the tree.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Full path of `name` inside the tree.
    #[must_use]
    pub fn join(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    /// A document root containing only this tree.
    #[must_use]
    pub fn root(&self) -> DocumentRoot {
        DocumentRoot::single(self.path())
    }

    /// The fixture layout used across the test suites.
    ///
    /// HTML documents at several depths, a mixed-case file for redirect
    /// tests, Markdown without a wrapper (`md-files/`) and Markdown pages with
    /// context and includes (`md-templates/`).
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .file("a-file.html", "top level file")
            .file("index.html", "homepage")
            .file("a-directory/another-file.html", "another file")
            .file("a-directory/index.html", "subpath index")
            .file("a-directory/mIXed-CAse.html", "mixed case")
            .file("md-files/index.md", "**index** file\n")
            .file("md-files/a-file.md", "*a* file\n")
            .file(
                "md-templates/index.md",
                "---\nwrapper_template: /wrapper.html\ncontext:\n  title: The index page\n\
                 markdown_includes:\n  nav: _nav.md\n---\n\n**index** file\n",
            )
            .file(
                "md-templates/a-file.md",
                "---\nwrapper_template: /wrapper.html\ncontext:\n  title: A file\n---\n\n*a* file\n",
            )
            .file("md-templates/_nav.md", "[home](/)\n")
            .file(
                "wrapper.html",
                "<title>{{ title }}</title><nav>{{ nav | default(value=\"\") | safe }}</nav>\
                 <main>{{ html_content | safe }}</main>",
            )
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}
