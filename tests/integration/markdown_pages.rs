//! Markdown documents composed into wrapper template contexts.

use serde_json::json;
use template_finder::constants::HTML_CONTENT_KEY;
use template_finder::core::{FinderError, RenderContext};
use template_finder::resolver::{Outcome, resolve};
use template_finder::test_utils::DocumentTree;

fn render_outcome(tree: &DocumentTree, path: &str, caller: RenderContext) -> (String, RenderContext) {
    match resolve(path, caller, &tree.root()).unwrap() {
        Outcome::Render {
            template,
            context,
        } => (template, context),
        other => panic!("expected a render outcome for {path}, got {other:?}"),
    }
}

#[test]
fn test_markdown_without_wrapper_is_not_a_page() {
    let tree = DocumentTree::standard();
    let root = tree.root();

    assert_eq!(resolve("/md-files", RenderContext::new(), &root).unwrap(), Outcome::NotFound);
    assert_eq!(resolve("/md-files/a-file", RenderContext::new(), &root).unwrap(), Outcome::NotFound);
}

#[test]
fn test_markdown_index_page() {
    let tree = DocumentTree::standard();
    let (template, context) = render_outcome(&tree, "/md-templates", RenderContext::new());

    assert_eq!(template, "wrapper.html");
    assert_eq!(context["title"], json!("The index page"));
    assert_eq!(context[HTML_CONTENT_KEY], json!("<p><strong>index</strong> file</p>\n"));
    assert_eq!(context["nav"], json!("<p><a href=\"/\">home</a></p>\n"));
}

#[test]
fn test_markdown_file_page() {
    let tree = DocumentTree::standard();
    let (template, context) = render_outcome(&tree, "/md-templates/a-file", RenderContext::new());

    assert_eq!(template, "wrapper.html");
    assert_eq!(context["title"], json!("A file"));
    assert_eq!(context[HTML_CONTENT_KEY], json!("<p><em>a</em> file</p>\n"));
    assert!(!context.contains_key("nav"));
}

#[test]
fn test_frontmatter_context_overlays_caller() {
    let tree = DocumentTree::standard();
    let mut caller = RenderContext::new();
    caller.insert("title".to_string(), json!("from caller"));
    caller.insert("user".to_string(), json!("alice"));
    caller.insert(HTML_CONTENT_KEY.to_string(), json!("stale"));

    let (_, context) = render_outcome(&tree, "/md-templates", caller);
    assert_eq!(context["title"], json!("The index page"));
    assert_eq!(context["user"], json!("alice"));
    assert_eq!(context[HTML_CONTENT_KEY], json!("<p><strong>index</strong> file</p>\n"));
}

#[test]
fn test_relative_wrapper_and_nested_includes() {
    let tree = DocumentTree::new()
        .file(
            "docs/guide/intro.md",
            "---\nwrapper_template: ../layout.html\nmarkdown_includes:\n  \
             sidebar: ../_sidebar.md\n  footer: /_footer.md\n---\n# Intro\n",
        )
        .file("docs/_sidebar.md", "- one\n- two\n")
        .file("_footer.md", "---\nnot: parsed\n---\nfoot\n")
        .file("docs/layout.html", "{{ html_content | safe }}");

    let (template, context) = render_outcome(&tree, "/docs/guide/intro", RenderContext::new());
    assert_eq!(template, "docs/layout.html");
    assert_eq!(context["sidebar"], json!("<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n"));
    assert!(context["footer"].as_str().unwrap().contains("not: parsed"));
    assert_eq!(context[HTML_CONTENT_KEY], json!("<h1>Intro</h1>\n"));
}

#[test]
fn test_missing_include_is_an_error() {
    let tree = DocumentTree::new().file(
        "page.md",
        "---\nwrapper_template: /w.html\nmarkdown_includes:\n  nav: missing.md\n---\nbody\n",
    );

    let err = resolve("/page", RenderContext::new(), &tree.root()).unwrap_err();
    assert!(
        matches!(err, FinderError::IncludeNotFound { ref include, ref path, .. } if include == "nav" && path == "missing.md"),
        "{err:?}"
    );
}

#[test]
fn test_malformed_frontmatter_is_an_error() {
    let cases = [
        "---\nwrapper_template: [unclosed\n---\nbody\n",
        "---\n- a\n- list\n---\nbody\n",
        "---\nwrapper_template: /w.html\ncontext: not a mapping\n---\nbody\n",
    ];

    for raw in cases {
        let tree = DocumentTree::new().file("page.md", raw);
        let err = resolve("/page", RenderContext::new(), &tree.root()).unwrap_err();
        assert!(matches!(err, FinderError::FrontmatterParseError { .. }), "{raw}: {err:?}");
    }
}

#[test]
fn test_wrapper_escaping_the_root_is_an_error() {
    let tree = DocumentTree::new().file("page.md", "---\nwrapper_template: ../../outside.html\n---\n");
    let err = resolve("/page", RenderContext::new(), &tree.root()).unwrap_err();
    assert!(matches!(err, FinderError::InvalidTemplateReference { .. }), "{err:?}");
}
