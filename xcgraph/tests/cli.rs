//! CLI tests for the `xcgraph` binary.
//!
//! Spawns the binary against a temp project and checks exit codes and the
//! document left on disk.

use std::path::Path;
use std::process::{Command, Output};

use xcgraph::exit_codes;
use xcgraph::io::document::load_document;

fn xcgraph(document: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_xcgraph"))
        .arg("--project")
        .arg(document)
        .args(args)
        .output()
        .expect("run xcgraph")
}

fn init_with_app(document: &Path) {
    let output = xcgraph(document, &["init"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let output = xcgraph(
        document,
        &["add-target", "App", "--bundle-id", "com.example.App"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{output:?}");
}

#[test]
fn add_file_then_list_shows_membership() {
    let temp = tempfile::tempdir().expect("tempdir");
    let document = temp.path().join("App.xcgraph.json");
    init_with_app(&document);
    std::fs::create_dir_all(temp.path().join("Features/Login")).expect("mkdir");
    std::fs::write(temp.path().join("Features/Login/Login.swift"), "").expect("touch");

    let output = xcgraph(
        &document,
        &[
            "add-file",
            "Features/Login/Login.swift",
            "--group",
            "Features/Login",
            "--target",
            "App",
        ],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{output:?}");

    let output = xcgraph(&document, &["list"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Login.swift [App/sources]"), "{stdout}");

    let output = xcgraph(&document, &["validate"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{output:?}");
}

#[test]
fn errors_map_to_exit_codes_and_leave_document_alone() {
    let temp = tempfile::tempdir().expect("tempdir");
    let document = temp.path().join("App.xcgraph.json");
    init_with_app(&document);
    let before = std::fs::read(&document).expect("read");

    let output = xcgraph(
        &document,
        &["add-target", "App", "--bundle-id", "com.example.Other"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::ALREADY_EXISTS));

    let output = xcgraph(
        &document,
        &["set-setting", "OTHER_LDFLAGS", "-l`id`", "--target", "App"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::INVALID_ARGUMENT));

    let output = xcgraph(&document, &["remove-file", "Ghost.swift"]);
    assert_eq!(output.status.code(), Some(exit_codes::NOT_FOUND));

    let output = xcgraph(&document, &["transaction", "commit"]);
    assert_eq!(output.status.code(), Some(exit_codes::TRANSACTION_STATE));

    assert_eq!(std::fs::read(&document).expect("read"), before);
}

#[test]
fn validate_reports_then_fixes_missing_files() {
    let temp = tempfile::tempdir().expect("tempdir");
    let document = temp.path().join("App.xcgraph.json");
    init_with_app(&document);
    let output = xcgraph(&document, &["add-file", "Gone.swift", "--target", "App"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let output = xcgraph(&document, &["validate"]);
    assert_eq!(output.status.code(), Some(exit_codes::FINDINGS));

    let output = xcgraph(&document, &["validate", "--fix"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK), "{output:?}");
    let graph = load_document(&document).expect("reload");
    assert!(xcgraph::core::files::find_file(&graph, "Gone.swift").is_none());
}

#[test]
fn dry_run_does_not_save() {
    let temp = tempfile::tempdir().expect("tempdir");
    let document = temp.path().join("App.xcgraph.json");
    init_with_app(&document);
    let before = std::fs::read(&document).expect("read");

    let output = xcgraph(
        &document,
        &["--dry-run", "set-setting", "SWIFT_VERSION", "5.9", "--target", "App"],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(std::fs::read(&document).expect("read"), before);
}

#[test]
fn init_refuses_to_overwrite() {
    let temp = tempfile::tempdir().expect("tempdir");
    let document = temp.path().join("App.xcgraph.json");
    assert_eq!(xcgraph(&document, &["init"]).status.code(), Some(exit_codes::OK));
    assert_eq!(
        xcgraph(&document, &["init"]).status.code(),
        Some(exit_codes::ALREADY_EXISTS)
    );
    assert_eq!(
        xcgraph(&document, &["init", "--force"]).status.code(),
        Some(exit_codes::OK)
    );
}
