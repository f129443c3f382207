use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::tempdir;

/// SQL that uses MySQL-style LIMIT.
const SQL_WITH_VIOLATIONS: &str = "SELECT * FROM Contacts LIMIT 10";

/// Clean SQL with no lint violations.
const SQL_CLEAN: &str = "SELECT TOP 10 * FROM Contacts";

fn mcql() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mcql"))
}

#[test]
fn test_lint_clean_file() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("clean.sql");
    std::fs::write(&sql_path, SQL_CLEAN).expect("write sql");

    let output = mcql()
        .args(["lint", sql_path.to_str().expect("sql path")])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    assert!(stdout.contains("PASS"), "Expected PASS in output: {stdout}");
    assert!(stdout.contains("0 violations"), "Expected 0 violations: {stdout}");
}

#[test]
fn test_lint_file_with_violations() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("bad.sql");
    std::fs::write(&sql_path, SQL_WITH_VIOLATIONS).expect("write sql");

    let output = mcql()
        .args(["lint", sql_path.to_str().expect("sql path")])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1), "Expected exit 1, got: {stdout}");
    assert!(stdout.contains("FAIL"), "Expected FAIL in output: {stdout}");
    assert!(
        stdout.contains("L:   1 | P:  24 | LIMIT_NOT_SUPPORTED"),
        "Expected LIMIT_NOT_SUPPORTED at 1:24: {stdout}"
    );
    assert!(stdout.contains("1 violations"), "Expected 1 violation: {stdout}");
}

#[test]
fn test_lint_exclude_rules() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("excluded.sql");
    std::fs::write(&sql_path, SQL_WITH_VIOLATIONS).expect("write sql");

    let output = mcql()
        .args([
            "lint",
            "--exclude-rules",
            "LIMIT_NOT_SUPPORTED",
            sql_path.to_str().expect("sql path"),
        ])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "Expected exit 0 when rule excluded, got: {stdout}"
    );
}

#[test]
fn test_lint_metadata_enables_bracket_hint() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("names.sql");
    let metadata_path = dir.path().join("metadata.json");
    std::fs::write(&sql_path, "SELECT * FROM Sales Summary )").expect("write sql");
    std::fs::write(&metadata_path, r#"[{"name":"Sales Summary"}]"#).expect("write metadata");

    let output = mcql()
        .args([
            "lint",
            "--format",
            "json",
            "--metadata",
            metadata_path.to_str().expect("metadata path"),
            sql_path.to_str().expect("sql path"),
        ])
        .output()
        .expect("run CLI");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    let violation = &parsed[0]["violations"][0];
    assert_eq!(violation["code"], "MISSING_BRACKETS");
    assert!(violation["message"]
        .as_str()
        .unwrap()
        .contains("[Sales Summary]"));
}

#[test]
fn test_lint_invalid_metadata_is_config_error() {
    let dir = tempdir().expect("temp dir");
    let metadata_path = dir.path().join("metadata.json");
    std::fs::write(&metadata_path, "{").expect("write metadata");

    let output = mcql()
        .args(["lint", "--metadata", metadata_path.to_str().unwrap()])
        .stdin(Stdio::null())
        .output()
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(66));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("mcql: error:"), "{stderr}");
}

#[test]
fn test_lint_missing_file_is_config_error() {
    let output = mcql()
        .args(["lint", "/nonexistent/query.sql"])
        .output()
        .expect("run CLI");
    assert_eq!(output.status.code(), Some(66));
}

#[test]
fn test_lint_output_file_has_no_ansi_sequences() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("bad.sql");
    let report_path = dir.path().join("lint.txt");
    std::fs::write(&sql_path, SQL_WITH_VIOLATIONS).expect("write sql");

    let output = mcql()
        .args([
            "lint",
            "--output",
            report_path.to_str().expect("report path"),
            sql_path.to_str().expect("sql path"),
        ])
        .output()
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(1));
    let report = std::fs::read_to_string(report_path).expect("read lint report");
    assert!(!report.contains('\u{1b}'), "{report}");
}

#[test]
fn test_lint_stdin() {
    let output = mcql()
        .args(["lint", "--format", "json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            child
                .stdin
                .take()
                .unwrap()
                .write_all(b"DELETE FROM Contacts")
                .unwrap();
            child.wait_with_output()
        })
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(1));
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Expected valid JSON output");
    assert_eq!(parsed[0]["file"], "<stdin>");
    assert_eq!(parsed[0]["violations"][0]["code"], "STATEMENT_NOT_ALLOWED");
}

#[test]
fn test_context_json() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("q.sql");
    std::fs::write(&sql_path, "SELECT * FROM [A] a JOIN [B] b ON ").expect("write sql");

    let output = mcql()
        .args(["context", "--format", "json", sql_path.to_str().unwrap()])
        .output()
        .expect("run CLI");

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(parsed["context"]["lastKeyword"], "on");
    assert_eq!(parsed["context"]["tablesInScope"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["shouldTrigger"], false);
}

#[test]
fn test_schema_command() {
    let output = mcql().args(["schema", "--compact"]).output().expect("run CLI");
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert!(parsed["WorkerResponse"].is_object());
}
