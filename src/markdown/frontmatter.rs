//! Frontmatter splitting for Markdown documents.
//!
//! A document may start with a YAML block fenced by `---` lines:
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
//! The block is extracted with `gray_matter` using an engine that returns the
//! raw text unparsed, and the YAML is then parsed here with `serde_yaml`. That
//! way malformed metadata is reported as [`FinderError::FrontmatterParseError`]
//! instead of being dropped, and a broken page is never mistaken for a document
//! that simply has no `wrapper_template`.

use std::collections::BTreeMap;
use std::fmt;

use gray_matter::engine::Engine;
use gray_matter::{Matter, Pod};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::{FinderError, RenderContext};

/// gray_matter engine that hands back the frontmatter text without parsing it.
struct RawFrontmatter;

impl Engine for RawFrontmatter {
    fn parse(content: &str) -> Result<Pod, gray_matter::Error> {
        Ok(Pod::String(content.to_string()))
    }
}

/// A named reference to another Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    /// Context key the converted HTML is stored under
    pub key: String,
    /// Template reference to the included file, as written
    pub path: String,
}

/// Typed document metadata.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrontMatter {
    /// Template that renders the composed context. Without it the document is
    /// not a page.
    #[serde(default)]
    pub wrapper_template: Option<String>,

    /// Literal values injected into the render context.
    #[serde(default)]
    pub context: Option<RenderContext>,

    /// Includes in declaration order.
    #[serde(default, deserialize_with = "ordered_includes")]
    pub markdown_includes: Vec<Include>,

    /// Keys that are not part of the metadata schema.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Whether the document names a wrapper template and can be rendered.
    #[must_use]
    pub const fn is_page(&self) -> bool {
        self.wrapper_template.is_some()
    }
}

/// Split `raw` into metadata and body.
///
/// Without a frontmatter block the metadata is empty and the body is the whole
/// text. `file` is only used in messages.
///
/// # Errors
///
/// Returns [`FinderError::FrontmatterParseError`] if the block is not valid
/// YAML, is not a mapping, or a recognized key has the wrong type.
pub fn split(raw: &str, file: &str) -> Result<(FrontMatter, String), FinderError> {
    let matter = Matter::<RawFrontmatter>::new();
    let parsed = matter.parse::<String>(raw).map_err(|e| parse_error(file, e))?;

    let Some(yaml) = parsed.data else {
        debug!("No frontmatter in '{}'", file);
        return Ok((FrontMatter::default(), raw.to_string()));
    };

    let metadata = parse_metadata(&yaml, file)?;
    Ok((metadata, parsed.content))
}

fn parse_metadata(yaml: &str, file: &str) -> Result<FrontMatter, FinderError> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::default());
    }

    let value: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(|e| parse_error(file, e))?;
    let metadata = match value {
        serde_yaml::Value::Null => FrontMatter::default(),
        serde_yaml::Value::Mapping(_) => {
            serde_yaml::from_value::<FrontMatter>(value).map_err(|e| parse_error(file, e))?
        }
        other => {
            return Err(FinderError::FrontmatterParseError {
                file: file.to_string(),
                reason: format!("expected a mapping, found {}", yaml_kind(&other)),
            });
        }
    };

    for key in metadata.extra.keys() {
        warn!("Unrecognized frontmatter key '{}' in '{}'", key, file);
    }

    Ok(metadata)
}

fn parse_error(file: &str, error: impl fmt::Display) -> FinderError {
    FinderError::FrontmatterParseError {
        file: file.to_string(),
        reason: error.to_string(),
    }
}

const fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

fn ordered_includes<'de, D>(deserializer: D) -> Result<Vec<Include>, D::Error>
where
    D: Deserializer<'de>,
{
    struct IncludesVisitor;

    impl<'de> Visitor<'de> for IncludesVisitor {
        type Value = Vec<Include>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of include names to file paths")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut includes = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, path)) = map.next_entry::<String, String>()? {
                includes.push(Include {
                    key,
                    path,
                });
            }
            Ok(includes)
        }
    }

    deserializer.deserialize_any(IncludesVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_without_frontmatter() {
        let (metadata, body) = split("# Title\n\nBody", "page.md").unwrap();
        assert_eq!(metadata, FrontMatter::default());
        assert!(!metadata.is_page());
        assert_eq!(body, "# Title\n\nBody");
    }

    #[test]
    fn test_full_frontmatter() {
        let raw = "---\nwrapper_template: /wrapper.html\ncontext:\n  title: The index page\n  count: 3\n\
                   markdown_includes:\n  zeta: z.md\n  alpha: /a.md\n---\n\n**index** file\n";
        let (metadata, body) = split(raw, "index.md").unwrap();

        assert_eq!(metadata.wrapper_template.as_deref(), Some("/wrapper.html"));
        let context = metadata.context.unwrap();
        assert_eq!(context["title"], json!("The index page"));
        assert_eq!(context["count"], json!(3));
        assert_eq!(
            metadata.markdown_includes,
            vec![
                Include {
                    key: "zeta".into(),
                    path: "z.md".into()
                },
                Include {
                    key: "alpha".into(),
                    path: "/a.md".into()
                },
            ]
        );
        assert_eq!(body.trim(), "**index** file");
    }

    #[test]
    fn test_null_includes_and_context() {
        let raw = "---\nwrapper_template: w.html\ncontext:\nmarkdown_includes:\n---\nbody";
        let (metadata, body) = split(raw, "page.md").unwrap();
        assert!(metadata.is_page());
        assert_eq!(metadata.context, None);
        assert!(metadata.markdown_includes.is_empty());
        assert_eq!(body.trim(), "body");
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let raw = "---\nwrapper_template: {broken\n---\nbody";
        let err = split(raw, "broken.md").unwrap_err();
        assert!(
            matches!(err, FinderError::FrontmatterParseError { ref file, .. } if file == "broken.md"),
            "{err:?}"
        );
    }

    #[test]
    fn test_non_mapping_is_an_error() {
        let err = split("---\n- a\n- b\n---\nbody", "list.md").unwrap_err();
        assert!(err.to_string().contains("expected a mapping, found a sequence"), "{err}");
    }

    #[test]
    fn test_wrong_types_are_errors() {
        assert!(split("---\nwrapper_template: [a, b]\n---\n", "a.md").is_err());
        assert!(split("---\ncontext: hello\n---\n", "b.md").is_err());
        assert!(split("---\nmarkdown_includes:\n  nav: [x]\n---\n", "c.md").is_err());
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let (metadata, _) = split("---\nwraper_template: typo.html\n---\nbody", "typo.md").unwrap();
        assert!(!metadata.is_page());
        assert!(metadata.extra.contains_key("wraper_template"));
    }
}
