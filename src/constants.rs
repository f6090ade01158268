//! Global constants used throughout the template-finder codebase.
//!
//! File naming conventions, reserved context keys and configuration defaults
//! live here so the matcher, composer and CLI agree on them.

/// Extension of documents served verbatim as templates.
pub const HTML_EXTENSION: &str = "html";

/// Extension of composable Markdown documents.
pub const MARKDOWN_EXTENSION: &str = "md";

/// File stem used when a request path names a directory.
pub const INDEX_STEM: &str = "index";

/// Context key that always receives the primary document's converted body.
pub const HTML_CONTENT_KEY: &str = "html_content";

/// Context key the HTTP host sets to the request path before resolution.
pub const REQUEST_PATH_KEY: &str = "request_path";

/// Name of the site configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "template-finder.toml";

/// Document root used when no configuration names one.
pub const DEFAULT_ROOT_DIR: &str = "templates";

/// Default interface for `template-finder serve`.
pub const DEFAULT_SERVE_INTERFACE: &str = "127.0.0.1";

/// Default port for `template-finder serve`.
pub const DEFAULT_SERVE_PORT: u16 = 8000;

/// Number of successive ports tried when the configured one is taken.
pub const MAX_PORT_RETRIES: u16 = 10;

/// Process exit code for a request that resolved to nothing.
pub const EXIT_NOT_FOUND: i32 = 2;
