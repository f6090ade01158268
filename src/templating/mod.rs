//! Template rendering with Tera.
//!
//! [`TemplateRenderer`] renders a resolved `(template, context)` pair. Every
//! `.html` file under the document roots is registered as a Tera template named
//! by its root-relative path, so wrapper templates can `extends` and `include`
//! one another. When two roots contain the same name the earlier root wins, the
//! same rule document lookup follows.
//!
//! HTML templates are autoescaped, so converted Markdown must be marked safe:
//!
//! ```html
//! <main>{{ html_content | safe }}</main>
//! ```
//!
//! Templates are loaded from disk on every render; nothing is cached. A file
//! that does not parse, or that extends or imports macros from one that is
//! missing or broken, is skipped with a warning. Rendering fails only when the
//! requested template itself is one of those.

use std::collections::{HashMap, HashSet};
use std::error::Error as _;
use std::path::{Path, PathBuf};

use tera::{Context as TeraContext, ErrorKind, Template, Tera};
use tracing::{debug, warn};

use crate::constants::HTML_EXTENSION;
use crate::core::{DocumentRoot, FinderError, RenderContext};
use crate::utils::fs::find_files_with_extension;

/// Parsed templates by name, with their source.
type Parsed = HashMap<String, (String, Template)>;

/// Renders templates found in a [`DocumentRoot`].
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    root: DocumentRoot,
}

/// The templates Tera accepted, and the reason each skipped file was dropped.
struct Loaded {
    tera: Tera,
    skipped: HashMap<String, String>,
}

impl TemplateRenderer {
    #[must_use]
    pub const fn new(root: DocumentRoot) -> Self {
        Self {
            root,
        }
    }

    /// Render `template` with `context`.
    ///
    /// # Errors
    ///
    /// - [`FinderError::TemplateNotFound`] if `template` (or a template it
    ///   includes) does not exist
    /// - [`FinderError::TemplateRenderError`] for syntax and evaluation errors
    ///   in `template` or in the templates it extends
    pub fn render(&self, template: &str, context: &RenderContext) -> Result<Vec<u8>, FinderError> {
        let Loaded {
            tera,
            skipped,
        } = self.load(template)?;

        if let Some(reason) = skipped.get(template) {
            return Err(FinderError::TemplateRenderError {
                template: template.to_string(),
                reason: reason.clone(),
            });
        }
        if !tera.get_template_names().any(|name| name == template) {
            return Err(FinderError::TemplateNotFound {
                template: template.to_string(),
            });
        }

        let context = TeraContext::from_value(serde_json::Value::Object(context.clone()))
            .map_err(|e| render_error(template, &e))?;

        debug!("Rendering template '{}'", template);
        tera.render(template, &context).map(String::into_bytes).map_err(|e| render_error(template, &e))
    }

    fn load(&self, template: &str) -> Result<Loaded, FinderError> {
        let mut parsed = Parsed::new();
        let mut skipped = HashMap::new();

        for (name, path) in self.template_files(template)? {
            match parse_file(&name, &path) {
                Ok(entry) => {
                    parsed.insert(name, entry);
                }
                Err(reason) => {
                    warn!("Skipping template '{}': {}", name, reason);
                    skipped.insert(name, reason);
                }
            }
        }

        // Dropping one template can strand the ones that extend it.
        loop {
            let stranded: Vec<(String, String)> = parsed
                .iter()
                .filter_map(|(name, (_, tpl))| {
                    dependency_problem(tpl, &parsed).map(|reason| (name.clone(), reason))
                })
                .collect();
            if stranded.is_empty() {
                break;
            }
            for (name, reason) in stranded {
                warn!("Skipping template '{}': {}", name, reason);
                parsed.remove(&name);
                skipped.insert(name, reason);
            }
        }

        debug!("Loading {} template(s), {} skipped", parsed.len(), skipped.len());
        let mut tera = Tera::default();
        tera.add_raw_templates(parsed.into_iter().map(|(name, (content, _))| (name, content)))
            .map_err(|e| render_error(template, &e))?;

        Ok(Loaded {
            tera,
            skipped,
        })
    }

    /// Every `.html` file under the roots by name, earlier roots first.
    fn template_files(&self, template: &str) -> Result<Vec<(String, PathBuf)>, FinderError> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for dir in self.root.dirs() {
            let found = find_files_with_extension(dir, HTML_EXTENSION).map_err(|e| {
                FinderError::TemplateRenderError {
                    template: template.to_string(),
                    reason: format!("{e:#}"),
                }
            })?;
            files.extend(found.into_iter().filter(|(name, _)| seen.insert(name.clone())));
        }

        Ok(files)
    }
}

fn parse_file(name: &str, path: &Path) -> Result<(String, Template), String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let template = Template::new(name, None, &content)
        .map_err(|e| format!("Failed to parse '{}': {}", name, format_tera_error(&e)))?;
    Ok((content, template))
}

/// Why `template` cannot be registered alongside `parsed`, if it cannot.
fn dependency_problem(template: &Template, parsed: &Parsed) -> Option<String> {
    let macro_files = template.imported_macro_files.iter().map(|(file, _)| file);
    if let Some(missing) = template.parent.iter().chain(macro_files).find(|name| !parsed.contains_key(*name)) {
        return Some(format!("depends on '{missing}', which is missing or failed to load"));
    }

    let mut chain = HashSet::from([template.name.as_str()]);
    let mut current = template;
    while let Some(parent) = current.parent.as_deref() {
        if !chain.insert(parent) {
            return Some(format!("circular extends through '{parent}'"));
        }
        let Some((_, next)) = parsed.get(parent) else {
            break;
        };
        current = next;
    }

    None
}

fn render_error(template: &str, error: &tera::Error) -> FinderError {
    if let ErrorKind::TemplateNotFound(missing) = &error.kind {
        return FinderError::TemplateNotFound {
            template: missing.clone(),
        };
    }

    FinderError::TemplateRenderError {
        template: template.to_string(),
        reason: format_tera_error(error),
    }
}

/// Flatten a Tera error and its sources into one message.
#[must_use]
pub fn format_tera_error(error: &tera::Error) -> String {
    let mut messages = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !message.is_empty() && !messages.contains(&message) {
            messages.push(message);
        }
        source = cause.source();
    }
    messages.join(": ")
}
