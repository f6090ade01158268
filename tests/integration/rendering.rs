//! Resolved pages rendered through Tera.

use serde_json::json;
use template_finder::core::{FinderError, RenderContext};
use template_finder::resolver::{Outcome, resolve};
use template_finder::templating::TemplateRenderer;
use template_finder::test_utils::DocumentTree;

fn render(tree: &DocumentTree, path: &str, caller: RenderContext) -> Result<String, FinderError> {
    let root = tree.root();
    let Outcome::Render {
        template,
        context,
    } = resolve(path, caller, &root)?
    else {
        panic!("expected a render outcome for {path}");
    };
    let bytes = TemplateRenderer::new(root).render(&template, &context)?;
    Ok(String::from_utf8(bytes).unwrap())
}

#[test]
fn test_html_document_renders_as_template() {
    let tree = DocumentTree::standard();
    assert_eq!(render(&tree, "/", RenderContext::new()).unwrap(), "homepage");
    assert_eq!(render(&tree, "/a-directory", RenderContext::new()).unwrap(), "subpath index");
}

#[test]
fn test_markdown_page_renders_through_wrapper() {
    let tree = DocumentTree::standard();
    assert_eq!(
        render(&tree, "/md-templates", RenderContext::new()).unwrap(),
        "<title>The index page</title><nav><p><a href=\"/\">home</a></p>\n</nav>\
         <main><p><strong>index</strong> file</p>\n</main>"
    );
}

#[test]
fn test_caller_context_reaches_html_templates() {
    let tree = DocumentTree::new().file("hello.html", "Hello {{ user }}, {{ count + 1 }}");
    let mut caller = RenderContext::new();
    caller.insert("user".to_string(), json!("<alice>"));
    caller.insert("count".to_string(), json!(2));

    assert_eq!(render(&tree, "/hello", caller).unwrap(), "Hello &lt;alice&gt;, 3");
}

#[test]
fn test_missing_wrapper_surfaces_at_render_time() {
    let tree = DocumentTree::new().file("page.md", "---\nwrapper_template: /missing.html\n---\nbody\n");
    let err = render(&tree, "/page", RenderContext::new()).unwrap_err();
    assert!(err.is_render_time());
    assert!(matches!(err, FinderError::TemplateNotFound { ref template } if template == "missing.html"));
}

#[test]
fn test_wrapper_extends_a_base_layout() {
    let tree = DocumentTree::new()
        .file("base.html", "<body>{% block content %}{% endblock content %}</body>")
        .file(
            "layouts/page.html",
            "{% extends \"base.html\" %}{% block content %}{{ html_content | safe }}{% endblock content %}",
        )
        .file("notes.md", "---\nwrapper_template: /layouts/page.html\n---\n`code`\n");

    assert_eq!(
        render(&tree, "/notes", RenderContext::new()).unwrap(),
        "<body><p><code>code</code></p>\n</body>"
    );
}
