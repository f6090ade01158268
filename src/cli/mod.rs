//! Command-line interface for template-finder.
//!
//! # Available Commands
//!
//! - `resolve` - Resolve a request path and print the outcome as JSON
//! - `render` - Resolve a request path and write the rendered page to stdout
//! - `serve` - Serve the document tree over HTTP
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only log errors
//! - `--config <FILE>` - Use a specific configuration file
//! - `--root <DIR>` - Document root directory; repeat for several roots.
//!   Overrides `roots` from the configuration file.
//!
//! ```bash
//! template-finder --root site resolve /a-directory/mixed-case
//! template-finder render /md-templates --context title="Home"
//! template-finder serve --port 8080
//! ```
//!
//! # Logging
//!
//! `RUST_LOG` takes precedence. Without it `--verbose` logs at `debug`,
//! `--quiet` at `error`, and the default is `warn`.
//!
//! # Exit Codes
//!
//! - `0` - the request rendered or redirected
//! - `1` - an error occurred
//! - `2` - nothing was found at the request path

mod render;
mod resolve;
mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::config::SiteConfig;
use crate::core::{DocumentRoot, RenderContext};

pub use render::RenderCommand;
pub use resolve::ResolveCommand;
pub use serve::ServeCommand;

/// Root command and its global options.
#[derive(Debug, Parser)]
#[command(
    name = "template-finder",
    about = "Resolve request paths to HTML and Markdown documents and render them",
    version,
    long_about = "template-finder maps request paths onto a tree of HTML and Markdown \
                  documents, composes Markdown pages from their frontmatter, and renders \
                  them through their wrapper templates."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file (default: ./template-finder.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Document root directory, searched in the order given
    #[arg(long = "root", global = true, value_name = "DIR")]
    roots: Vec<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve a request path and print the outcome as JSON
    Resolve(ResolveCommand),

    /// Render the page at a request path to stdout
    Render(RenderCommand),

    /// Serve the document tree over HTTP
    Serve(ServeCommand),
}

/// Configuration and document root shared by every command.
#[derive(Debug, Clone)]
pub struct Site {
    pub config: SiteConfig,
    pub root: DocumentRoot,
}

impl Site {
    /// Load the configuration and build the document root.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or names no root.
    pub fn load(config: Option<&std::path::Path>, roots: &[PathBuf]) -> Result<Self> {
        let config = SiteConfig::load(config)?;
        let root = config.document_root(roots)?;
        Ok(Self {
            config,
            root,
        })
    }
}

impl Cli {
    /// Run the selected command and return the process exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or the command itself fails.
    pub fn execute(self) -> Result<i32> {
        self.init_logging();

        let site = Site::load(self.config.as_deref(), &self.roots)?;
        match self.command {
            Commands::Resolve(cmd) => cmd.execute(&site),
            Commands::Render(cmd) => cmd.execute(&site),
            Commands::Serve(cmd) => cmd.execute(&site).map(|()| 0),
        }
    }

    fn log_filter(&self) -> EnvFilter {
        if std::env::var("RUST_LOG").is_ok() {
            return EnvFilter::from_default_env();
        }

        let level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };
        EnvFilter::new(level)
    }

    fn init_logging(&self) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(self.log_filter())
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Build a caller context from `KEY=VALUE` pairs.
///
/// Values that parse as JSON keep their type (`count=3`, `draft=true`);
/// anything else is a string.
///
/// # Errors
///
/// Returns an error for pairs without `=` or with an empty key.
pub fn parse_context_pairs(pairs: &[String]) -> Result<RenderContext> {
    let mut context = RenderContext::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("Invalid context value '{pair}': expected KEY=VALUE"))?;
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid context value '{pair}': key is empty");
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        context.insert(key.to_string(), value);
    }
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_global_options() {
        let cli = Cli::parse_from([
            "template-finder",
            "--root",
            "one",
            "resolve",
            "/a-file",
            "--root",
            "two",
            "--verbose",
        ]);
        assert_eq!(cli.roots, vec![PathBuf::from("one"), PathBuf::from("two")]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Resolve(_)));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["template-finder", "-v", "-q", "render", "/"]).is_err());
    }

    #[test]
    fn test_parse_context_pairs() {
        let context = parse_context_pairs(&[
            "title=Hello world".to_string(),
            "count=3".to_string(),
            "draft=true".to_string(),
            "eq=a=b".to_string(),
        ])
        .unwrap();
        assert_eq!(context["title"], json!("Hello world"));
        assert_eq!(context["count"], json!(3));
        assert_eq!(context["draft"], json!(true));
        assert_eq!(context["eq"], json!("a=b"));
    }

    #[test]
    fn test_parse_context_pairs_rejects_malformed() {
        assert!(parse_context_pairs(&["novalue".to_string()]).is_err());
        assert!(parse_context_pairs(&["=x".to_string()]).is_err());
    }
}
