//! Lint report formatting.

use mcql_core::{Diagnostic, Severity};
use owo_colors::OwoColorize;
use std::fmt::Write;
use std::time::Duration;

/// Per-file lint result used by the formatter.
pub struct FileLintResult {
    pub name: String,
    pub issues: Vec<LintIssue>,
}

impl FileLintResult {
    /// Resolves diagnostic byte offsets in `sql` to line:col issues.
    pub fn from_diagnostics(name: impl Into<String>, sql: &str, diagnostics: &[Diagnostic]) -> Self {
        let issues = diagnostics
            .iter()
            .map(|diagnostic| {
                let (line, col) = offset_to_line_col(sql, diagnostic.start_index);
                LintIssue {
                    line,
                    col,
                    code: diagnostic.code.to_string(),
                    message: diagnostic.message.clone(),
                    severity: diagnostic.severity,
                }
            })
            .collect();
        Self {
            name: name.into(),
            issues,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }
}

/// A lint issue resolved to line:col.
pub struct LintIssue {
    pub line: usize,
    pub col: usize,
    pub code: String,
    pub message: String,
    pub severity: Severity,
}

/// Convert a byte offset into a 1-based (line, col) pair.
pub fn offset_to_line_col(sql: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(sql.len());
    let mut line = 1usize;
    let mut col = 1usize;

    for (i, ch) in sql.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Format lint results as a human-readable report.
pub fn format_lint_results(results: &[FileLintResult], colored: bool, elapsed: Duration) -> String {
    let mut out = String::new();

    let mut total_pass = 0usize;
    let mut total_fail = 0usize;
    let mut total_violations = 0usize;

    for file in results {
        if file.issues.is_empty() {
            total_pass += 1;
        } else {
            total_fail += 1;
            total_violations += file.issues.len();
        }

        write_file_section(&mut out, file, colored);
    }

    write_summary(
        &mut out,
        total_pass,
        total_fail,
        total_violations,
        colored,
        elapsed,
    );

    out
}

fn write_file_section(out: &mut String, file: &FileLintResult, colored: bool) {
    let status = match (file.issues.is_empty(), colored) {
        (true, true) => "PASS".green().to_string(),
        (true, false) => "PASS".to_string(),
        (false, true) => "FAIL".red().to_string(),
        (false, false) => "FAIL".to_string(),
    };

    let _ = writeln!(out, "== [{}] {}", file.name, status);

    let mut sorted: Vec<&LintIssue> = file.issues.iter().collect();
    sorted.sort_by_key(|i| (i.line, i.col));

    for issue in sorted {
        let code_str = if colored {
            match issue.severity {
                Severity::Error => issue.code.red().to_string(),
                Severity::Warning => issue.code.yellow().to_string(),
            }
        } else {
            issue.code.clone()
        };

        let _ = writeln!(
            out,
            "L:{:>4} | P:{:>4} | {} | {}",
            issue.line, issue.col, code_str, issue.message
        );
    }
}

fn write_summary(
    out: &mut String,
    pass: usize,
    fail: usize,
    violations: usize,
    colored: bool,
    elapsed: Duration,
) {
    let _ = writeln!(out, "All Finished in {}!", format_elapsed(elapsed));
    let _ = writeln!(
        out,
        "  {} passed. {} failed. {} violations found.",
        count_str(pass, colored, true),
        count_str(fail, colored, false),
        violations
    );
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.2}s")
    } else if elapsed.as_millis() >= 1 {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{}us", elapsed.as_micros())
    }
}

fn count_str(count: usize, colored: bool, pass: bool) -> String {
    let s = format!("{count} file{}", if count == 1 { "" } else { "s" });
    match (colored && count > 0, pass) {
        (true, true) => s.green().to_string(),
        (true, false) => s.red().to_string(),
        (false, _) => s,
    }
}

/// Format lint results as JSON.
pub fn format_lint_json(results: &[FileLintResult], compact: bool) -> String {
    let json_results: Vec<serde_json::Value> = results
        .iter()
        .map(|file| {
            let violations: Vec<serde_json::Value> = file
                .issues
                .iter()
                .map(|issue| {
                    serde_json::json!({
                        "line": issue.line,
                        "column": issue.col,
                        "code": issue.code,
                        "message": issue.message,
                        "severity": issue.severity,
                    })
                })
                .collect();

            serde_json::json!({
                "file": file.name,
                "violations": violations
            })
        })
        .collect();

    if compact {
        serde_json::to_string(&json_results).unwrap_or_default()
    } else {
        serde_json::to_string_pretty(&json_results).unwrap_or_default()
    }
}
