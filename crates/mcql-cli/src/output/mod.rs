//! Output formatting modules.

pub mod context;
pub mod lint;

pub use context::{format_context_json, format_context_text};
pub use lint::{format_lint_json, format_lint_results, FileLintResult, LintIssue};
