//! SQL linter module.
//!
//! Combines two engines. When the dialect parser accepts the input, policy
//! checks run over the syntax tree. When it rejects the input, recovery
//! heuristics work from the token stream to explain the most likely mistake.
//! Either way the result is a list of [`Diagnostic`]s; malformed SQL is never
//! an error.

pub mod config;
pub mod functions;
mod policy;
mod recovery;
mod visit;

use config::LintConfig;
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::metadata::TableMetadata;
use crate::parser::{parse, ParseOutcome};
use crate::scanner::scan;
use crate::types::{Diagnostic, Span};
use recovery::Failure;

/// The SQL linter, holding configuration and optional table metadata.
#[derive(Debug, Clone, Default)]
pub struct Linter {
    config: LintConfig,
    metadata: Vec<TableMetadata>,
}

impl Linter {
    /// Creates a new linter with the given configuration.
    pub fn new(config: LintConfig) -> Self {
        Self {
            config,
            metadata: Vec::new(),
        }
    }

    /// Supplies known Data Extensions to the metadata-aware heuristics.
    pub fn with_metadata(mut self, metadata: Vec<TableMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns true if linting is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    pub fn metadata(&self) -> &[TableMetadata] {
        &self.metadata
    }

    /// Lints `sql`, returning diagnostics in source-discovery order.
    ///
    /// Offsets are byte offsets into `sql`; every returned span is non-empty.
    pub fn lint(&self, sql: &str) -> Vec<Diagnostic> {
        if !self.config.enabled || sql.trim().is_empty() {
            return Vec::new();
        }

        let tokens = scan(sql);
        let diagnostics = match parse(sql) {
            ParseOutcome::Success { statements } => {
                let mut diagnostics = policy::check_statements(sql, &tokens, &statements);
                let whole = Span::new(0, sql.len());
                diagnostics.extend(functions::check_function_calls(sql, &statements, whole));
                diagnostics
            }
            ParseOutcome::Failure {
                message,
                location,
                kind,
            } => {
                let failure = Failure {
                    message: &message,
                    location,
                    kind,
                };
                recovery::recover(sql, &tokens, failure, &self.metadata, &self.config)
            }
        };

        #[cfg(feature = "tracing")]
        debug!(count = diagnostics.len(), "lint finished");

        diagnostics
            .into_iter()
            .filter(|d| self.config.is_rule_enabled(d.code))
            .map(|d| {
                let span = non_empty_span(sql, d.span());
                d.with_span(span)
            })
            .collect()
    }
}

/// Lints `sql` with the default configuration and no metadata.
pub fn lint(sql: &str) -> Vec<Diagnostic> {
    Linter::default().lint(sql)
}

/// Clamps `span` into `sql` and widens it to at least one character.
fn non_empty_span(sql: &str, span: Span) -> Span {
    let len = sql.len();
    let mut start = span.start.min(len);
    while !sql.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = span.end.min(len);
    while !sql.is_char_boundary(end) {
        end += 1;
    }
    if end > start {
        return Span::new(start, end);
    }
    match sql[start..].chars().next() {
        Some(ch) => Span::new(start, start + ch.len_utf8()),
        None => {
            let previous = sql[..start].chars().next_back().map_or(0, char::len_utf8);
            Span::new(start - previous, start)
        }
    }
}
