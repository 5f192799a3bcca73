//! CLI integration tests using the real bpm binary

mod common;

use predicates::prelude::*;

use common::TestWorkspace;

#[test]
fn test_help_output() {
    TestWorkspace::new()
        .bpm()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("policy bundles"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("link"))
        .stdout(predicate::str::contains("fetch"));
}

#[test]
fn test_version_output() {
    TestWorkspace::new()
        .bpm()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bpm"))
        .stdout(predicate::str::contains("Build info"));
}

#[test]
fn test_completions_zsh() {
    TestWorkspace::new()
        .bpm()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_bpm"));
}

#[test]
fn test_completions_unknown_shell() {
    TestWorkspace::new()
        .bpm()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error[invalid-argument]:"))
        .stderr(predicate::str::contains("unknown shell"));
}

#[test]
fn test_error_line_names_kind() {
    let workspace = TestWorkspace::new();
    workspace.write_file("bundle.yaml", "package:\n  name: app\n  version: 1.0.0\n");
    workspace.write_file("app.rego", "package app\n\nimport data.nowhere.rules\n");

    workspace
        .bpm()
        .arg("link")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error[missing-dependency]:"))
        .stderr(predicate::str::contains("nowhere.rules"));
}

#[test]
fn test_missing_manifest_reports_not_found_kind() {
    TestWorkspace::new()
        .bpm()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error[not-found]:"));
}

#[test]
fn test_unknown_subcommand() {
    TestWorkspace::new()
        .bpm()
        .arg("deploy")
        .assert()
        .failure();
}
