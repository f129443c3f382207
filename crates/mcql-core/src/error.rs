//! Error types for SQL parsing and the lint worker protocol.
//!
//! Malformed SQL is the expected input of an editor that lints on every
//! keystroke, so a parser rejection is data rather than a failure: the
//! linter turns a [`ParseError`] into a [`crate::types::Diagnostic`] and it
//! never escapes [`crate::lint`]. [`ProtocolError`] is the only error a
//! caller sees, and the protocol layer answers it with an `error` response.

use regex::Regex;
use sqlparser::parser::ParserError;
use std::fmt;
use std::sync::OnceLock;
#[cfg(feature = "tracing")]
use tracing::trace;

/// A rejection from the dialect parser, with the position it reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The parser's message, including its `sql parser error:` prefix.
    pub message: String,
    pub position: Option<Position>,
    pub kind: ParseErrorKind,
}

/// 1-indexed line and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// How the parser gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseErrorKind {
    /// A token the grammar does not allow where it appears.
    #[default]
    SyntaxError,
    /// The input ended before the statement was complete.
    UnexpectedEof,
}

impl ParseError {
    /// Extracts the `Line: X, Column: Y` suffix sqlparser appends.
    fn position_from_message(message: &str) -> Option<Position> {
        static POSITION: OnceLock<Regex> = OnceLock::new();
        let re = POSITION.get_or_init(|| {
            Regex::new(r"Line:\s*(\d+)\s*,\s*Column:\s*(\d+)").expect("Invalid regex pattern")
        });

        let position = re.captures(message).and_then(|caps| {
            Some(Position {
                line: caps.get(1)?.as_str().parse().ok()?,
                column: caps.get(2)?.as_str().parse().ok()?,
            })
        });

        #[cfg(feature = "tracing")]
        if position.is_none() && message.contains("Line") {
            trace!(%message, "no position in parser message");
        }

        position
    }

    fn kind_from_message(message: &str) -> ParseErrorKind {
        let lower = message.to_ascii_lowercase();
        if lower.contains("found: eof") || lower.contains("unexpected end") {
            ParseErrorKind::UnexpectedEof
        } else {
            ParseErrorKind::SyntaxError
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<ParserError> for ParseError {
    fn from(err: ParserError) -> Self {
        let message = err.to_string();
        Self {
            position: Self::position_from_message(&message),
            kind: Self::kind_from_message(&message),
            message,
        }
    }
}

/// Failure to decode or encode a worker protocol envelope.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid message: {0}")]
    InvalidMessage(#[from] serde_json::Error),

    #[error("unknown message type `{0}`")]
    UnknownType(String),

    #[error("message is missing required field `{0}`")]
    MissingField(&'static str),
}
