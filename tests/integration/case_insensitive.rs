//! Redirects to the canonical casing of a path.

use template_finder::core::{RenderContext, RequestPath};
use template_finder::resolver::{Outcome, resolve};
use template_finder::test_utils::DocumentTree;

fn redirect(path: &str) -> Outcome {
    Outcome::Redirect(RequestPath::parse(path).unwrap())
}

#[test]
fn test_mixed_case_file_redirects() {
    let tree = DocumentTree::standard();
    let root = tree.root();

    for request in ["/a-directory/mixed-case", "/a-directory/MIXED-CASE", "/A-Directory/mixed-case"] {
        assert_eq!(
            resolve(request, RenderContext::new(), &root).unwrap(),
            redirect("a-directory/mIXed-CAse"),
            "{request}"
        );
    }
}

#[test]
fn test_canonical_casing_renders() {
    let tree = DocumentTree::standard();
    assert!(matches!(
        resolve("/a-directory/mIXed-CAse", RenderContext::new(), &tree.root()).unwrap(),
        Outcome::Render { ref template, .. } if template == "a-directory/mIXed-CAse.html"
    ));
}

#[test]
fn test_directory_and_markdown_redirects() {
    let tree = DocumentTree::standard();
    let root = tree.root();

    assert_eq!(resolve("/A-DIRECTORY", RenderContext::new(), &root).unwrap(), redirect("a-directory"));
    assert_eq!(resolve("/MD-Templates", RenderContext::new(), &root).unwrap(), redirect("md-templates"));
    assert_eq!(
        resolve("/md-templates/A-FILE", RenderContext::new(), &root).unwrap(),
        redirect("md-templates/a-file")
    );
}

#[test]
fn test_no_redirect_to_markdown_that_is_not_a_page() {
    let tree = DocumentTree::standard();
    let root = tree.root();

    assert_eq!(resolve("/MD-FILES", RenderContext::new(), &root).unwrap(), Outcome::NotFound);
    assert_eq!(resolve("/md-files/A-File", RenderContext::new(), &root).unwrap(), Outcome::NotFound);
}

#[test]
fn test_ambiguous_casing_is_not_found() {
    let tree = DocumentTree::new().file("Guide.html", "upper").file("gUIDE.html", "mixed");
    assert_eq!(resolve("/guide", RenderContext::new(), &tree.root()).unwrap(), Outcome::NotFound);
}

#[test]
fn test_redirect_keeps_trailing_segments() {
    let tree = DocumentTree::new().file("Docs/Deep/Page.html", "page");
    assert_eq!(
        resolve("/docs/deep/page/", RenderContext::new(), &tree.root()).unwrap(),
        redirect("Docs/Deep/Page")
    );
}
