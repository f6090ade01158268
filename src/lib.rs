//! template-finder - request path resolution for document trees
//!
//! Serves a tree of HTML and Markdown files without per-page routing code. A
//! request path is mapped onto the tree; HTML documents are rendered as
//! templates, and Markdown documents are composed into a template context and
//! rendered through the wrapper template their frontmatter names.
//!
//! # Architecture Overview
//!
//! ```text
//! request path ──► matcher ──► resolver ──► Outcome::Render { template, context }
//!                     │            │        Outcome::Redirect(path)
//!                     │            ▼        Outcome::NotFound
//!                     │        composer ◄── markdown (frontmatter + HTML conversion)
//!                     ▼
//!               DocumentRoot (ordered directories on disk)
//! ```
//!
//! # Core Modules
//!
//! - [`core`] - Error taxonomy, [`DocumentRoot`](core::DocumentRoot),
//!   [`RequestPath`](core::RequestPath) and the render context type
//! - [`matcher`] - Maps request paths to documents, with a case-insensitive
//!   fallback that produces redirects
//! - [`markdown`] - Frontmatter splitting and Markdown to HTML conversion
//! - [`composer`] - Builds the wrapper template name and context of a Markdown page
//! - [`resolver`] - The [`resolve`](resolver::resolve) entry point
//! - [`templating`] - Tera-backed template rendering
//!
//! ## Supporting Modules
//!
//! - [`config`] - `template-finder.toml` loading
//! - [`cli`] - `resolve`, `render` and `serve` commands
//! - [`utils`] - Path normalization and directory scanning
//! - [`constants`] - Shared names and defaults
//!
//! # Document Tree Example
//!
//! ```text
//! templates/
//! ├── index.html                  # /
//! ├── a-directory/
//! │   ├── index.html              # /a-directory
//! │   └── mIXed-CAse.html         # /a-directory/mIXed-CAse (/a-directory/mixed-case redirects)
//! ├── md-templates/
//! │   ├── index.md                # /md-templates, rendered through wrapper.html
//! │   └── _nav.md                 # only reachable as an include
//! └── wrapper.html
//! ```
//!
//! A Markdown page names its wrapper and optional includes in YAML frontmatter:
//!
//! ```markdown
//! ---
//! wrapper_template: /wrapper.html
//! context:
//!   title: The index page
//! markdown_includes:
//!   nav: _nav.md
//! ---
//!
//! **index** file
//! ```
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use template_finder::core::{DocumentRoot, RenderContext};
//! use template_finder::resolver::{Outcome, resolve};
//! use template_finder::templating::TemplateRenderer;
//!
//! # fn example() -> anyhow::Result<()> {
//! let root = DocumentRoot::single("templates");
//! if let Outcome::Render { template, context } = resolve("/md-templates", RenderContext::new(), &root)? {
//!     let page = TemplateRenderer::new(root).render(&template, &context)?;
//!     println!("{}", String::from_utf8_lossy(&page));
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod composer;
pub mod config;
pub mod constants;
pub mod core;
pub mod markdown;
pub mod matcher;
pub mod resolver;
pub mod templating;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
