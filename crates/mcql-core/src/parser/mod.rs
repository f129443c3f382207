//! Syntax-tree parser adapter.
//!
//! Wraps `sqlparser` with the T-SQL dialect and normalizes its results into a
//! [`ParseOutcome`]. Parsing is a free function: no parser instance or other
//! state survives between calls.

use sqlparser::ast::Statement;
use sqlparser::dialect::MsSqlDialect;
use sqlparser::parser::Parser;
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::error::{ParseError, ParseErrorKind};

/// Result of a single parse attempt.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    /// The input parsed; single-statement input yields a one-element vector.
    Success { statements: Vec<Statement> },
    /// The parser rejected the input.
    Failure {
        message: String,
        /// Byte offset of the reported error, when the parser gave one.
        location: Option<usize>,
        kind: ParseErrorKind,
    },
}

impl ParseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Parses `sql` with the T-SQL dialect.
///
/// Whitespace-only input short-circuits to an empty success without invoking
/// the parser.
pub fn parse(sql: &str) -> ParseOutcome {
    if sql.trim().is_empty() {
        return ParseOutcome::Success {
            statements: Vec::new(),
        };
    }

    match parse_statements(sql) {
        Ok(statements) => ParseOutcome::Success { statements },
        Err(error) => {
            let location = error
                .position
                .and_then(|pos| line_col_to_offset(sql, pos.line, pos.column));
            #[cfg(feature = "tracing")]
            debug!(message = %error.message, ?location, "parse failed");
            ParseOutcome::Failure {
                message: error.message,
                location,
                kind: error.kind,
            }
        }
    }
}

/// Parses `sql` into statements, keeping the structured error on failure.
pub fn parse_statements(sql: &str) -> Result<Vec<Statement>, ParseError> {
    Ok(Parser::parse_sql(&MsSqlDialect {}, sql)?)
}

/// Runs a trivial parse so the first real request does not pay for
/// one-time initialization.
pub fn warm_up() -> Result<(), ParseError> {
    parse_statements("SELECT 1").map(|_| ())
}

/// Calculates the byte offset for a 1-indexed line and column.
///
/// sqlparser reports columns in characters, so the column is walked with
/// `char_indices`. A column one past the end of the line maps to the line end.
pub fn line_col_to_offset(sql: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 || column == 0 {
        return None;
    }

    let bytes = sql.as_bytes();
    let mut current_line = 1;
    let mut offset = 0;

    while current_line < line {
        let remaining = bytes.get(offset..)?;
        let newline_pos = remaining.iter().position(|&b| b == b'\n')?;
        offset += newline_pos + 1;
        current_line += 1;
    }

    let line_start = offset;
    let remaining = bytes.get(line_start..)?;
    let line_len = remaining
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(remaining.len());
    let line_end = line_start + line_len;

    let mut current_column = 1;
    for (rel_offset, _) in sql[line_start..line_end].char_indices() {
        if current_column == column {
            return Some(line_start + rel_offset);
        }
        current_column += 1;
    }

    (column == current_column).then_some(line_end)
}
