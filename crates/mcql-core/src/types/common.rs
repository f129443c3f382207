//! Common types shared by the linter, the completion engine and the protocol.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A lint finding rendered by the editor as an inline marker.
///
/// Offsets are half-open and index into the exact source string that was
/// linted. Inside the engine they are byte offsets; the worker protocol
/// converts them to UTF-16 code units before they leave the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Human-readable message
    pub message: String,

    /// Severity level
    pub severity: Severity,

    /// Start offset (inclusive)
    pub start_index: usize,

    /// End offset (exclusive), always greater than `start_index`
    pub end_index: usize,

    /// Machine-readable rule code, used for configuration only.
    #[serde(skip)]
    pub code: &'static str,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self::new(code, Severity::Error, message, span)
    }

    pub fn warning(code: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self::new(code, Severity::Warning, message, span)
    }

    fn new(code: &'static str, severity: Severity, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            severity,
            start_index: span.start,
            end_index: span.end,
            code,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start_index, self.end_index)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.start_index = span.start;
        self.end_index = span.end;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A byte range in the source SQL string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// Byte offset from start of SQL string (inclusive)
    pub start: usize,
    /// Byte offset from start of SQL string (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Machine-readable diagnostic codes.
pub mod diagnostic_codes {
    pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";

    // Policy violations
    pub const STATEMENT_NOT_ALLOWED: &str = "STATEMENT_NOT_ALLOWED";
    pub const STATEMENT_NOT_SELECT: &str = "STATEMENT_NOT_SELECT";
    pub const CTE_NOT_SUPPORTED: &str = "CTE_NOT_SUPPORTED";
    pub const LIMIT_NOT_SUPPORTED: &str = "LIMIT_NOT_SUPPORTED";
    pub const SELECT_INTO_NOT_SUPPORTED: &str = "SELECT_INTO_NOT_SUPPORTED";
    pub const ORDER_BY_WITHOUT_TOP: &str = "ORDER_BY_WITHOUT_TOP";

    // Unsupported constructs
    pub const UNSUPPORTED_FUNCTION: &str = "UNSUPPORTED_FUNCTION";

    // Recovery guidance
    pub const MISSING_BRACKETS: &str = "MISSING_BRACKETS";
}
