//! Request path matching against the standard fixture tree.

use serde_json::json;
use template_finder::core::RenderContext;
use template_finder::resolver::{Outcome, resolve};
use template_finder::test_utils::{DocumentTree, init_test_logging};

fn caller() -> RenderContext {
    let mut context = RenderContext::new();
    context.insert("request_path".to_string(), json!("/test"));
    context
}

fn template_for(tree: &DocumentTree, path: &str) -> Option<String> {
    match resolve(path, caller(), &tree.root()).unwrap() {
        Outcome::Render {
            template,
            ..
        } => Some(template),
        _ => None,
    }
}

#[test]
fn test_html_documents_at_every_depth() {
    init_test_logging(None);
    let tree = DocumentTree::standard();

    assert_eq!(template_for(&tree, "/").as_deref(), Some("index.html"));
    assert_eq!(template_for(&tree, "").as_deref(), Some("index.html"));
    assert_eq!(template_for(&tree, "/a-file").as_deref(), Some("a-file.html"));
    assert_eq!(template_for(&tree, "/a-directory").as_deref(), Some("a-directory/index.html"));
    assert_eq!(template_for(&tree, "/a-directory/").as_deref(), Some("a-directory/index.html"));
    assert_eq!(
        template_for(&tree, "/a-directory/another-file").as_deref(),
        Some("a-directory/another-file.html")
    );
}

#[test]
fn test_html_passes_caller_context_through() {
    let tree = DocumentTree::standard();
    assert_eq!(
        resolve("/a-file", caller(), &tree.root()).unwrap(),
        Outcome::Render {
            template: "a-file.html".to_string(),
            context: caller(),
        }
    );
}

#[test]
fn test_missing_documents() {
    let tree = DocumentTree::standard();
    let root = tree.root();

    for path in ["/nope", "/a-directory/nope", "/a-file/extra", "/a-file.html"] {
        assert_eq!(resolve(path, caller(), &root).unwrap(), Outcome::NotFound, "{path}");
    }
}

#[test]
fn test_index_stem_is_addressable() {
    let tree = DocumentTree::standard();
    assert_eq!(template_for(&tree, "/index").as_deref(), Some("index.html"));
    assert_eq!(template_for(&tree, "/a-directory/index").as_deref(), Some("a-directory/index.html"));
}

#[test]
fn test_html_beats_markdown_and_exact_beats_index() {
    let tree = DocumentTree::new()
        .file("page.html", "html")
        .file("page.md", "---\nwrapper_template: /w.html\n---\n")
        .file("page/index.html", "index")
        .file("doc.md", "---\nwrapper_template: /w.html\n---\n")
        .file("doc/index.html", "index")
        .file("w.html", "{{ html_content | safe }}");

    assert_eq!(template_for(&tree, "/page").as_deref(), Some("page.html"));
    assert_eq!(template_for(&tree, "/doc").as_deref(), Some("doc/index.html"));
}

#[test]
fn test_traversal_is_not_found() {
    let outer = DocumentTree::new().file("secret.html", "secret");
    let tree = DocumentTree::standard();
    let root = tree.root();

    let escape = format!("/../{}/secret", outer.path().file_name().unwrap().to_string_lossy());
    assert_eq!(resolve(&escape, caller(), &root).unwrap(), Outcome::NotFound);
    assert_eq!(resolve("/a-directory/../a-file", caller(), &root).unwrap(), Outcome::NotFound);
    assert_eq!(resolve("/./a-file", caller(), &root).unwrap(), Outcome::NotFound);
}

#[test]
fn test_multiple_roots_search_in_order() {
    let first = DocumentTree::new().file("shared.html", "first");
    let second = DocumentTree::new().file("shared.html", "second").file("only.html", "only");
    let root = template_finder::core::DocumentRoot::new(vec![
        first.path().to_path_buf(),
        second.path().to_path_buf(),
    ])
    .unwrap();

    assert!(matches!(
        resolve("/only", caller(), &root).unwrap(),
        Outcome::Render { ref template, .. } if template == "only.html"
    ));
    assert!(matches!(
        resolve("/shared", caller(), &root).unwrap(),
        Outcome::Render { ref template, .. } if template == "shared.html"
    ));
}

#[test]
fn test_resolution_sees_changes_on_disk() {
    let tree = DocumentTree::new().file("late.md", "no wrapper");
    assert_eq!(template_for(&tree, "/late"), None);

    tree.write("late.md", "---\nwrapper_template: /w.html\n---\n");
    assert_eq!(template_for(&tree, "/late").as_deref(), Some("w.html"));

    tree.remove("late.md");
    assert_eq!(resolve("/late", caller(), &tree.root()).unwrap(), Outcome::NotFound);
}

#[test]
fn test_concurrent_resolution() {
    let tree = DocumentTree::standard();
    let root = tree.root();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let root = &root;
                scope.spawn(move || {
                    let path = if i % 2 == 0 { "/md-templates" } else { "/a-directory/mixed-case" };
                    resolve(path, RenderContext::new(), root).unwrap()
                })
            })
            .collect();

        let outcomes: Vec<Outcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for pair in outcomes.chunks(2) {
            assert_eq!(pair[0], outcomes[0]);
            assert_eq!(pair[1], outcomes[1]);
        }
    });
}
