//! The `template-finder` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use template_finder::test_utils::DocumentTree;

fn template_finder(tree: &DocumentTree) -> Command {
    let mut cmd = Command::cargo_bin("template-finder").unwrap();
    cmd.current_dir(tree.path()).env_remove("RUST_LOG").arg("--root").arg(tree.path());
    cmd
}

#[test]
fn test_resolve_prints_render_outcome() {
    let tree = DocumentTree::standard();
    template_finder(&tree)
        .args(["resolve", "/md-templates", "--context", "user=alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"template\":\"wrapper.html\""))
        .stdout(predicate::str::contains("\"title\":\"The index page\""))
        .stdout(predicate::str::contains("\"user\":\"alice\""));
}

#[test]
fn test_resolve_prints_redirect() {
    let tree = DocumentTree::standard();
    template_finder(&tree)
        .args(["resolve", "/a-directory/mixed-case"])
        .assert()
        .success()
        .stdout("{\"redirect\":\"/a-directory/mIXed-CAse\"}\n");
}

#[test]
fn test_resolve_not_found_exit_code() {
    let tree = DocumentTree::standard();
    template_finder(&tree)
        .args(["resolve", "/md-files"])
        .assert()
        .code(2)
        .stdout("\"not_found\"\n");
}

#[test]
fn test_render_writes_page() {
    let tree = DocumentTree::standard();
    template_finder(&tree)
        .args(["render", "/md-templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<title>The index page</title>"))
        .stdout(predicate::str::contains("<main><p><strong>index</strong> file</p>\n</main>"));
}

#[test]
fn test_render_redirect_and_not_found() {
    let tree = DocumentTree::standard();
    template_finder(&tree)
        .args(["render", "/A-FILE"])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("/a-file"));

    template_finder(&tree).args(["render", "/nope"]).assert().code(2);
}

#[test]
fn test_render_error_reports_suggestion() {
    let tree = DocumentTree::new().file(
        "page.md",
        "---\nwrapper_template: /w.html\nmarkdown_includes:\n  nav: _nav.md\n---\nbody\n",
    );
    template_finder(&tree)
        .args(["render", "/page"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Include 'nav' of 'page.md' not found: _nav.md"))
        .stderr(predicate::str::contains("markdown_includes"));
}

#[test]
fn test_config_file_roots() {
    let tree = DocumentTree::new()
        .file("site/index.html", "from config root")
        .file("template-finder.toml", "roots = [\"site\"]\n");

    Command::cargo_bin("template-finder")
        .unwrap()
        .current_dir(tree.path())
        .args(["render", "/"])
        .assert()
        .success()
        .stdout("from config root");
}

#[test]
fn test_missing_explicit_config() {
    let tree = DocumentTree::standard();
    template_finder(&tree)
        .args(["--config", "nope.toml", "resolve", "/"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_invalid_context_pair() {
    let tree = DocumentTree::standard();
    template_finder(&tree)
        .args(["resolve", "/", "--context", "novalue"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}
