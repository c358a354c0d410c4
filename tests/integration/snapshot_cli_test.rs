//! CLI output snapshot tests
//!
//! Tests the actual CLI binary output for reproducibility.

use std::process::Command;

use tempfile::TempDir;

use crate::helpers::write_config;

/// Helper to run docsift in an isolated home and capture output
fn run_docsift(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_docsift"))
        .args(args)
        .current_dir(home.path())
        .env("HOME", home.path())
        .env("NO_COLOR", "1") // Disable colors for consistent snapshots
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute docsift");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

#[test]
fn snapshot_patterns_listing() {
    let home = TempDir::new().unwrap();
    write_config(home.path());

    let (stdout, stderr, exit_code) = run_docsift(&home, &["patterns"]);
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    insta::assert_snapshot!("patterns_listing", stdout);
}

#[test]
fn snapshot_patterns_test_no_matches() {
    let home = TempDir::new().unwrap();
    write_config(home.path());

    let (stdout, _, exit_code) = run_docsift(&home, &["patterns", "test", "routine business"]);
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "No matches\n");
}
