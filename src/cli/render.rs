//! Render the page at a request path to stdout.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use super::{Site, parse_context_pairs};
use crate::constants::EXIT_NOT_FOUND;
use crate::resolver::{Outcome, resolve};
use crate::templating::TemplateRenderer;

#[derive(Debug, Args)]
pub struct RenderCommand {
    /// Request path, e.g. `/md-templates`
    path: String,

    /// Caller context entry; may be repeated
    #[arg(long = "context", value_name = "KEY=VALUE")]
    context: Vec<String>,
}

impl RenderCommand {
    pub fn execute(self, site: &Site) -> Result<i32> {
        let caller_context = parse_context_pairs(&self.context)?;

        match resolve(&self.path, caller_context, &site.root)? {
            Outcome::Render {
                template,
                context,
            } => {
                let renderer = TemplateRenderer::new(site.root.clone());
                let page = renderer.render(&template, &context)?;

                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&page).context("Failed to write rendered page")?;
                stdout.flush()?;
                Ok(0)
            }
            Outcome::Redirect(target) => {
                eprintln!("{}: {}", "redirect".yellow(), target.to_url_path());
                Ok(0)
            }
            Outcome::NotFound => {
                eprintln!("{}: {}", "not found".red(), self.path);
                Ok(EXIT_NOT_FOUND)
            }
        }
    }
}
