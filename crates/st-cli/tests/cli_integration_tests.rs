//! Integration tests for the strata binary
//!
//! Each test migrates a fresh DuckDB file in a temp directory through the
//! compiled CLI.

use std::path::Path;
use std::process::Command;

/// Path to the compiled strata binary
fn strata_bin() -> String {
    env!("CARGO_BIN_EXE_strata").to_string()
}

/// Run a `strata` CLI command in `dir` and return (stdout, stderr, success).
fn run_strata(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(strata_bin())
        .current_dir(dir)
        .env_remove("STRATA_SQL_CONNECTION")
        .env_remove("STRATA_TARGET")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute strata with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn write_config(dir: &Path) {
    std::fs::write(
        dir.join("strata.yml"),
        "name: registry\ndatabase:\n  connection: \"duckdb://registry.duckdb\"\n",
    )
    .unwrap();
}

#[test]
fn test_version_of_uncontrolled_database_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());

    let (_, stderr, success) = run_strata(dir.path(), &["version"]);
    assert!(!success);
    assert!(
        stderr.contains("database is not under migration control"),
        "stderr: {stderr}"
    );
    // A read-only command never creates the database file
    assert!(!dir.path().join("registry.duckdb").exists());
}

#[test]
fn test_sync_then_version() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());

    let (stdout, stderr, success) = run_strata(dir.path(), &["sync"]);
    assert!(success, "stderr: {stderr}");
    assert!(stdout.contains("Database is at version 5"), "stdout: {stdout}");

    let (stdout, _, success) = run_strata(dir.path(), &["version"]);
    assert!(success);
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_version_json() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    let (_, _, success) = run_strata(dir.path(), &["sync", "3"]);
    assert!(success);

    let (stdout, stderr, success) = run_strata(dir.path(), &["version", "--json"]);
    assert!(success, "stderr: {stderr}");
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["version"], 3);
    assert_eq!(report["latest"], 5);
    assert!(report["repository"]
        .as_str()
        .unwrap()
        .ends_with("migrate_repo"));
}

#[test]
fn test_version_control_twice_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());

    let (stdout, stderr, success) = run_strata(dir.path(), &["version-control", "0"]);
    assert!(success, "stderr: {stderr}");
    assert!(stdout.contains("at version 0"), "stdout: {stdout}");

    let (_, stderr, success) = run_strata(dir.path(), &["version-control"]);
    assert!(!success);
    assert!(
        stderr.contains("database is already under migration control"),
        "stderr: {stderr}"
    );
}

#[test]
fn test_upgrade_and_downgrade() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    run_strata(dir.path(), &["version-control", "0"]);

    let (stdout, _, success) = run_strata(dir.path(), &["upgrade", "4"]);
    assert!(success);
    assert!(stdout.contains("version 4"), "stdout: {stdout}");

    let (stdout, _, success) = run_strata(dir.path(), &["downgrade", "1"]);
    assert!(success);
    assert!(stdout.contains("version 1"), "stdout: {stdout}");
}

#[test]
fn test_connection_flag_without_config() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("direct.duckdb");
    let connection = format!("duckdb://{}", db.display());

    let (_, stderr, success) =
        run_strata(dir.path(), &["--connection", &connection, "sync", "2"]);
    assert!(success, "stderr: {stderr}");
    assert!(db.exists());
}

#[test]
fn test_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, success) = run_strata(dir.path(), &["version"]);
    assert!(!success);
    assert!(stderr.contains("Failed to load project configuration"), "stderr: {stderr}");
}
