//! Resolve a request path and print the outcome as JSON.
//!
//! ```bash
//! $ template-finder resolve /md-templates
//! {"render":{"template":"wrapper.html","context":{"html_content":"..."}}}
//! $ template-finder resolve /a-directory/mixed-case
//! {"redirect":"/a-directory/mIXed-CAse"}
//! $ template-finder resolve /missing
//! "not_found"
//! ```

use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};

use super::{Site, parse_context_pairs};
use crate::constants::EXIT_NOT_FOUND;
use crate::resolver::{Outcome, resolve};

#[derive(Debug, Args)]
pub struct ResolveCommand {
    /// Request path, e.g. `/a-directory/index`
    path: String,

    /// Caller context entry; may be repeated
    #[arg(long = "context", value_name = "KEY=VALUE")]
    context: Vec<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl ResolveCommand {
    pub fn execute(self, site: &Site) -> Result<i32> {
        let caller_context = parse_context_pairs(&self.context)?;
        let outcome = resolve(&self.path, caller_context, &site.root)?;

        let value = outcome_to_json(&outcome);
        let output = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        println!("{output}");

        Ok(match outcome {
            Outcome::NotFound => EXIT_NOT_FOUND,
            Outcome::Render { .. } | Outcome::Redirect(_) => 0,
        })
    }
}

fn outcome_to_json(outcome: &Outcome) -> Value {
    match outcome {
        Outcome::Render {
            template,
            context,
        } => json!({ "render": { "template": template, "context": context } }),
        Outcome::Redirect(target) => json!({ "redirect": target.to_url_path() }),
        Outcome::NotFound => json!("not_found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RenderContext, RequestPath};

    #[test]
    fn test_outcome_json_shapes() {
        let mut context = RenderContext::new();
        context.insert("title".to_string(), json!("X"));
        let render = Outcome::Render {
            template: "wrapper.html".to_string(),
            context,
        };
        assert_eq!(
            outcome_to_json(&render),
            json!({"render": {"template": "wrapper.html", "context": {"title": "X"}}})
        );

        let redirect = Outcome::Redirect(RequestPath::parse("a-directory/mIXed-CAse").unwrap());
        assert_eq!(outcome_to_json(&redirect), json!({"redirect": "/a-directory/mIXed-CAse"}));
        assert_eq!(outcome_to_json(&Outcome::NotFound), json!("not_found"));
    }
}
