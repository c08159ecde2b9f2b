use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::{tempdir, TempDir};

fn vault() -> TempDir {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("notes")).unwrap();
    fs::write(
        dir.path().join("notes/plan.md"),
        "---\ntitle: Plan\ntags: [work]\n---\n# Goals\n\nSee [[other]].\n\n- [x] draft\n",
    )
    .unwrap();
    fs::write(dir.path().join("other.md"), "plain\n").unwrap();
    fs::write(dir.path().join("image.png"), "not markdown").unwrap();
    dir
}

fn mdq(vault: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mdq"));
    cmd.arg("--vault").arg(vault);
    cmd
}

#[test]
fn structure_lists_markdown_files() {
    let dir = vault();
    mdq(dir.path())
        .arg("structure")
        .assert()
        .success()
        .stdout(predicate::str::contains("notes/plan.md"))
        .stdout(predicate::str::contains("other.md"))
        .stdout(predicate::str::contains("image.png").not())
        .stdout(predicate::str::contains("-- 2 documents --"));
}

#[test]
fn structure_json_is_sorted() {
    let dir = vault();
    let output = mdq(dir.path()).args(["structure", "--json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let paths: Vec<&str> =
        json.as_array().unwrap().iter().map(|e| e["path"].as_str().unwrap()).collect();
    assert_eq!(paths, vec!["notes/plan.md", "other.md"]);
}

#[test]
fn show_prints_parsed_document() {
    let dir = vault();
    mdq(dir.path())
        .args(["show", "notes/plan.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("title: Plan"))
        .stdout(predicate::str::contains("#work"))
        .stdout(predicate::str::contains("other"))
        .stdout(predicate::str::contains("Goals"))
        .stdout(predicate::str::contains("- [x] draft (line 9)"));
}

#[test]
fn show_json_includes_body_on_request() {
    let dir = vault();
    let output = mdq(dir.path()).args(["show", "other.md", "--json", "--body"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["path"], "other.md");
    assert_eq!(json["body"], "plain\n");
}

#[test]
fn show_unknown_path_fails() {
    let dir = vault();
    mdq(dir.path())
        .args(["show", "missing.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No document at 'missing.md'"));
}

#[test]
fn stats_report_structure_size() {
    let dir = vault();
    mdq(dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("structure_size:     2"))
        .stdout(predicate::str::contains("structure_scans:    1"));
}

#[test]
fn stats_json_has_scan_age() {
    let dir = vault();
    let output = mdq(dir.path()).args(["stats", "--json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["structure_size"], 2);
    assert!(json["last_full_scan_age_secs"].is_number());
}
