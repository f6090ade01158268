//! Error handling for template-finder
//!
//! Resolution has three kinds of results that are easy to confuse, so they are
//! kept apart by type:
//!
//! - **Outcomes** (`Render`, `Redirect`, `NotFound`) are ordinary return values of
//!   [`crate::resolver::resolve`], not errors. A missing page is expected traffic.
//! - **Request-level failures** are [`FinderError`] values. They mean the content
//!   tree itself is broken (a dangling include, malformed frontmatter, a wrapper
//!   template that escapes the document tree) and must be surfaced to whoever
//!   authored the content.
//! - **Collaborator failures** raised while rendering ([`FinderError::TemplateNotFound`],
//!   [`FinderError::TemplateRenderError`]) are distinct from resolution-time
//!   failures because they are detected by the templating layer.
//!
//! [`ErrorContext`] wraps a [`FinderError`] with a suggestion and details for CLI
//! display; [`user_friendly_error`] builds one from any [`anyhow::Error`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use template_finder::core::{FinderError, user_friendly_error};
//!
//! let error = FinderError::TemplateNotFound {
//!     template: "base.html".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for template-finder operations.
///
/// Every variant carries the file or reference that caused it, written for the
/// person maintaining the content tree rather than for the host application.
#[derive(Error, Debug)]
pub enum FinderError {
    /// A `markdown_includes` entry points at a file that does not exist.
    ///
    /// Broken includes are content authoring bugs, so the key is never silently
    /// dropped from the context.
    #[error("Include '{include}' of '{document}' not found: {path}")]
    IncludeNotFound {
        /// Context key the include was declared under
        include: String,
        /// Resolved root-relative path of the missing include
        path: String,
        /// Document that declared the include
        document: String,
    },

    /// The frontmatter block is present but not valid metadata.
    #[error("Invalid frontmatter in '{file}': {reason}")]
    FrontmatterParseError {
        /// Document whose frontmatter failed to parse
        file: String,
        /// Parser message
        reason: String,
    },

    /// A wrapper or include reference cannot be turned into a template path.
    #[error("Invalid template reference '{reference}' in '{document}': {reason}")]
    InvalidTemplateReference {
        /// The reference as written in frontmatter
        reference: String,
        /// Document containing the reference
        document: String,
        /// Why the reference was rejected
        reason: String,
    },

    /// The templating collaborator could not find the template to render.
    #[error("Template not found: {template}")]
    TemplateNotFound {
        /// Root-relative template name
        template: String,
    },

    /// The templating collaborator failed for a reason other than a missing template.
    #[error("Failed to render template '{template}': {reason}")]
    TemplateRenderError {
        /// Root-relative template name
        template: String,
        /// Rendering engine message
        reason: String,
    },

    /// A matched document exists but could not be read.
    #[error("Failed to read document '{path}': {reason}")]
    DocumentReadError {
        /// Path of the unreadable document
        path: String,
        /// Underlying I/O message
        reason: String,
    },

    /// Site configuration is unusable.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// IO error from the standard library
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FinderError {
    /// Whether this error was raised by the templating collaborator rather than
    /// during resolution.
    #[must_use]
    pub const fn is_render_time(&self) -> bool {
        matches!(self, Self::TemplateNotFound { .. } | Self::TemplateRenderError { .. })
    }
}

/// Error wrapper carrying user-facing suggestions and details.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: FinderError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: FinderError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion for resolving the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach additional details about the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions where we know
/// what usually went wrong.
///
/// [`FinderError`] values anywhere in the `anyhow` chain are recognized; other
/// errors are reported through a generic wrapper that keeps the full chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let finder_error = error.chain().find_map(|cause| cause.downcast_ref::<FinderError>());

    if let Some(finder_error) = finder_error {
        return create_error_context(finder_error);
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(FinderError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in template-finder.toml");
    }

    let message = error.chain().map(ToString::to_string).collect::<Vec<_>>().join(": ");
    ErrorContext::new(FinderError::ConfigError {
        message,
    })
}

fn create_error_context(error: &FinderError) -> ErrorContext {
    let context = ErrorContext::new(clone_error(error));
    match error {
        FinderError::IncludeNotFound {
            document,
            ..
        } => context
            .with_suggestion(format!(
                "Fix the markdown_includes entry in '{document}' or create the missing file"
            ))
            .with_details(
                "Relative include paths are resolved against the directory of the including document; \
                 paths starting with '/' are resolved against the document root",
            ),
        FinderError::FrontmatterParseError {
            ..
        } => context
            .with_suggestion("Check the YAML between the leading '---' markers")
            .with_details(
                "Recognized keys are wrapper_template (string), context (mapping) and \
                 markdown_includes (mapping of name to path)",
            ),
        FinderError::InvalidTemplateReference {
            ..
        } => context.with_suggestion(
            "Template references must stay inside the document root; remove extra '..' segments",
        ),
        FinderError::TemplateNotFound {
            ..
        } => context
            .with_suggestion("Create the template or fix the wrapper_template reference")
            .with_details("Templates are looked up in every configured document root, in order"),
        FinderError::ConfigError {
            ..
        } => context.with_suggestion("Pass --root <DIR> or set `roots` in template-finder.toml"),
        FinderError::TemplateRenderError {
            ..
        }
        | FinderError::DocumentReadError {
            ..
        }
        | FinderError::IoError(_) => context,
    }
}

// io::Error is not Clone, so the context keeps its kind and message.
fn clone_error(error: &FinderError) -> FinderError {
    match error {
        FinderError::IncludeNotFound {
            include,
            path,
            document,
        } => FinderError::IncludeNotFound {
            include: include.clone(),
            path: path.clone(),
            document: document.clone(),
        },
        FinderError::FrontmatterParseError {
            file,
            reason,
        } => FinderError::FrontmatterParseError {
            file: file.clone(),
            reason: reason.clone(),
        },
        FinderError::InvalidTemplateReference {
            reference,
            document,
            reason,
        } => FinderError::InvalidTemplateReference {
            reference: reference.clone(),
            document: document.clone(),
            reason: reason.clone(),
        },
        FinderError::TemplateNotFound {
            template,
        } => FinderError::TemplateNotFound {
            template: template.clone(),
        },
        FinderError::TemplateRenderError {
            template,
            reason,
        } => FinderError::TemplateRenderError {
            template: template.clone(),
            reason: reason.clone(),
        },
        FinderError::DocumentReadError {
            path,
            reason,
        } => FinderError::DocumentReadError {
            path: path.clone(),
            reason: reason.clone(),
        },
        FinderError::ConfigError {
            message,
        } => FinderError::ConfigError {
            message: message.clone(),
        },
        FinderError::IoError(e) => FinderError::IoError(std::io::Error::new(e.kind(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_include_not_found_message() {
        let error = FinderError::IncludeNotFound {
            include: "nav".to_string(),
            path: "md-templates/_nav.md".to_string(),
            document: "md-templates/index.md".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Include 'nav' of 'md-templates/index.md' not found: md-templates/_nav.md"
        );
        assert!(!error.is_render_time());
    }

    #[test]
    fn test_render_time_errors() {
        let missing = FinderError::TemplateNotFound {
            template: "base.html".to_string(),
        };
        assert!(missing.is_render_time());

        let parse = FinderError::FrontmatterParseError {
            file: "a.md".to_string(),
            reason: "bad".to_string(),
        };
        assert!(!parse.is_render_time());
    }

    #[test]
    fn test_user_friendly_error_finds_wrapped_finder_error() {
        let result: Result<(), FinderError> = Err(FinderError::TemplateNotFound {
            template: "wrapper.html".to_string(),
        });
        let error = result.context("Failed to render '/'").unwrap_err();

        let ctx = user_friendly_error(error);
        assert!(matches!(ctx.error, FinderError::TemplateNotFound { .. }));
        assert!(ctx.suggestion.is_some());
        assert!(ctx.details.is_some());
    }

    #[test]
    fn test_user_friendly_error_generic() {
        let ctx = user_friendly_error(anyhow::anyhow!("something odd"));
        assert!(ctx.to_string().contains("something odd"));
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new(FinderError::ConfigError {
            message: "no roots".to_string(),
        })
        .with_suggestion("add one")
        .with_details("roots are required");

        let text = ctx.to_string();
        assert!(text.contains("Configuration error: no roots"));
        assert!(text.contains("Details: roots are required"));
        assert!(text.contains("Suggestion: add one"));
    }

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let error: FinderError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        let ctx = user_friendly_error(anyhow::Error::from(error));
        match ctx.error {
            FinderError::IoError(e) => assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied),
            other => panic!("unexpected error: {other}"),
        }
    }
}
