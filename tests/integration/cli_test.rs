//! CLI behaviour tests against the built binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::helpers::{three_document_folder, write_config, write_pdf};

/// Command isolated from any user or local config.
fn docsift(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("docsift").unwrap();
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .current_dir(home.path());
    cmd
}

#[test]
fn scan_with_unreadable_document_exits_with_partial_code() {
    let input = three_document_folder();
    let home = TempDir::new().unwrap();
    let config = write_config(home.path());
    let out = home.path().join("results");

    docsift(&home)
        .arg("scan")
        .arg(input.path())
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&out)
        .arg("--quiet")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("docsift_findings_"))
        .stdout(predicate::str::contains("docsift_summary_"));

    let written: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
    assert_eq!(written.len(), 2);
}

#[test]
fn clean_scan_exits_zero() {
    let input = TempDir::new().unwrap();
    write_pdf(input.path(), "one.pdf", &["ethics training scheduled"]);
    let home = TempDir::new().unwrap();
    let config = write_config(home.path());

    docsift(&home)
        .args(["scan", "--format", "json", "-q", "--config"])
        .arg(&config)
        .arg(input.path())
        .arg("-o")
        .arg(home.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("docsift_findings_"))
        .stdout(predicate::str::contains("docsift_summary_").not());
}

#[test]
fn missing_input_folder_is_an_error() {
    let home = TempDir::new().unwrap();
    docsift(&home)
        .args(["scan", "does-not-exist", "-q"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Input folder not found"));
}

#[test]
fn invalid_pattern_fails_before_scanning() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.toml");
    std::fs::write(
        &config,
        "[[priority_tiers]]\nlabel = \"broken\"\npatterns = ['(oops']\n",
    )
    .unwrap();

    docsift(&home)
        .arg("patterns")
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid pattern configuration"))
        .stderr(predicate::str::contains("broken"));
}

#[test]
fn patterns_test_prints_matches_with_context() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path());

    docsift(&home)
        .args(["patterns", "test", "Mandatory ethics training for all staff"])
        .args(["-w", "5", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "[1] \"ethics training\" at 10..25 (urgent, full)",
        ))
        .stdout(predicate::str::contains("tory ethics training for"));
}

#[test]
fn local_config_file_is_picked_up() {
    let home = TempDir::new().unwrap();
    write_config(home.path());

    docsift(&home)
        .arg("patterns")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("2 tiers, 4 patterns"));
}

#[test]
fn config_init_then_path() {
    let home = TempDir::new().unwrap();

    docsift(&home)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
    assert!(home.path().join(".config/docsift/config.toml").is_file());

    docsift(&home)
        .args(["config", "init"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    docsift(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("config.toml\n"));
}

#[test]
fn config_show_prints_defaults() {
    let home = TempDir::new().unwrap();
    docsift(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Built-in defaults"))
        .stdout(predicate::str::contains("[[priority_tiers]]"));
}

#[test]
fn completions_generate_for_bash() {
    let home = TempDir::new().unwrap();
    docsift(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docsift"));
}
