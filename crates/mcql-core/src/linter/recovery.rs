//! Heuristics that turn a parser rejection into actionable guidance.
//!
//! The dialect parser fails on the first problem it meets, and its message is
//! written for grammar authors. Before falling back to a cleaned-up version of
//! that message, recovery looks for the two mistakes query authors make most:
//! calling a function the engine does not support, and referencing a Data
//! Extension whose name contains spaces without wrapping it in brackets.

use regex::Regex;
use std::sync::OnceLock;
#[cfg(feature = "tracing")]
use tracing::debug;

use super::config::LintConfig;
use super::functions::scan_function_calls;
use super::policy::limit_diagnostic;
use crate::error::ParseErrorKind;
use crate::metadata::{find_table, TableMetadata};
use crate::scanner::segments::{is_word_char, Segments};
use crate::scanner::{Token, TokenKind};
use crate::targets::{extract_targets_from_tokens, FromJoinTarget};
use crate::types::{diagnostic_codes, Diagnostic, Span};

/// A parse failure as reported by [`crate::parser::parse`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Failure<'a> {
    pub message: &'a str,
    pub location: Option<usize>,
    pub kind: ParseErrorKind,
}

/// Produces diagnostics for SQL the parser rejected.
pub(crate) fn recover(
    sql: &str,
    tokens: &[Token],
    failure: Failure<'_>,
    metadata: &[TableMetadata],
    config: &LintConfig,
) -> Vec<Diagnostic> {
    if config.is_rule_enabled(diagnostic_codes::UNSUPPORTED_FUNCTION) {
        let functions = scan_function_calls(sql);
        if !functions.is_empty() {
            #[cfg(feature = "tracing")]
            debug!(count = functions.len(), "recovered unsupported function calls");
            return functions;
        }
    }

    if let Some(location) = failure.location {
        if config.is_rule_enabled(diagnostic_codes::MISSING_BRACKETS) {
            if let Some(diagnostic) = missing_brackets(sql, tokens, location, metadata) {
                #[cfg(feature = "tracing")]
                debug!(location, "recovered missing brackets");
                return vec![diagnostic];
            }
        }
    }

    if config.is_rule_enabled(diagnostic_codes::LIMIT_NOT_SUPPORTED) {
        let limit = tokens.iter().find(|t| t.depth == 0 && t.is_word("LIMIT"));
        if let Some(limit) = limit {
            if failure.location.map_or(true, |location| location >= limit.start) {
                return vec![limit_diagnostic(sql, tokens, &(0..sql.len()))];
            }
        }
    }

    vec![syntax_error(sql, failure, config.max_message_length)]
}

/// Looks for an unbracketed multi-word table name around the error offset.
fn missing_brackets(
    sql: &str,
    tokens: &[Token],
    location: usize,
    metadata: &[TableMetadata],
) -> Option<Diagnostic> {
    extract_targets_from_tokens(sql, tokens)
        .iter()
        .filter(|t| !t.is_subquery && !t.is_bracketed)
        .filter(|t| t.start <= location && location <= t.end + 2)
        .find_map(|target| {
            let suggestion = bracketed_suggestion(target, tokens, metadata)?;
            Some(Diagnostic::error(
                diagnostic_codes::MISSING_BRACKETS,
                format!("Names containing spaces must be wrapped in brackets: {suggestion}"),
                target.span(),
            ))
        })
}

fn bracketed_suggestion(
    target: &FromJoinTarget,
    tokens: &[Token],
    metadata: &[TableMetadata],
) -> Option<String> {
    let name = target.unprefixed_text();
    let prefix = &target.raw_text[..target.raw_text.len() - name.len()];

    if let Some((table, rest)) = known_table_prefix(name, metadata) {
        return Some(format!("{prefix}[{}]{rest}", table.name));
    }

    if target.word_count < 3 || !name.contains(char::is_whitespace) {
        return None;
    }
    if let Some((table, alias)) = split_qualifier_alias(target, name, tokens) {
        return Some(format!("{prefix}[{table}] {alias}"));
    }
    Some(format!("{prefix}[{name}]"))
}

/// Splits `name` into table words and a trailing alias when the last word is
/// used elsewhere as a qualifier (`alias.Column`).
fn split_qualifier_alias<'n>(
    target: &FromJoinTarget,
    name: &'n str,
    tokens: &[Token],
) -> Option<(&'n str, &'n str)> {
    let alias_start = name.rfind(char::is_whitespace)? + 1;
    let (table, alias) = (name[..alias_start].trim_end(), &name[alias_start..]);
    if !table.contains(char::is_whitespace) || !alias.chars().all(is_word_char) {
        return None;
    }

    let qualifies = tokens.windows(2).any(|pair| {
        let [word, dot] = pair else {
            return false;
        };
        let outside = word.end <= target.start || word.start >= target.end;
        outside
            && word.kind == TokenKind::Word
            && word.text.eq_ignore_ascii_case(alias)
            && dot.is_symbol(".")
            && dot.start == word.end
    });
    qualifies.then_some((table, alias))
}

/// Longest run of two or more leading words of `name` that is a known table,
/// with whatever follows it (usually an alias).
fn known_table_prefix<'m>(
    name: &str,
    metadata: &'m [TableMetadata],
) -> Option<(&'m TableMetadata, String)> {
    let words: Vec<&str> = name.split_whitespace().collect();
    (2..=words.len()).rev().find_map(|n| {
        let table = find_table(metadata, &words[..n].join(" "))?;
        let rest = words[n..]
            .iter()
            .map(|word| format!(" {word}"))
            .collect::<String>();
        Some((table, rest))
    })
}

fn syntax_error(sql: &str, failure: Failure<'_>, max_message_length: usize) -> Diagnostic {
    Diagnostic::error(
        diagnostic_codes::SYNTAX_ERROR,
        simplify_message(failure.message, max_message_length),
        error_span(sql, failure),
    )
}

/// Span of the offending token, or of the last token when input ended early.
fn error_span(sql: &str, failure: Failure<'_>) -> Span {
    let significant_end = sql.trim_end().len();
    let last_segment = || {
        Segments::new(sql)
            .filter(|s| s.is_significant())
            .last()
            .map(|s| Span::new(s.start, s.end))
    };

    match failure.location {
        Some(location) if location < significant_end => Segments::new(sql)
            .find(|s| s.is_significant() && s.start <= location && location < s.end)
            .map(|s| Span::new(location, s.end))
            .unwrap_or_else(|| Span::new(location, next_char_boundary(sql, location))),
        Some(_) => last_segment().unwrap_or_else(|| Span::new(0, sql.len())),
        None if failure.kind == ParseErrorKind::UnexpectedEof => {
            last_segment().unwrap_or_else(|| Span::new(0, sql.len()))
        }
        None => {
            let leading = sql.len() - sql.trim_start().len();
            Span::new(leading, significant_end.max(leading))
        }
    }
}

fn next_char_boundary(sql: &str, offset: usize) -> usize {
    sql[offset..]
        .chars()
        .next()
        .map_or(offset, |ch| offset + ch.len_utf8())
}

/// Rewrites a parser message for query authors.
///
/// `Expected: X, found: Y` becomes `Unexpected 'Y', expected X`, a premature
/// end of input becomes `Incomplete query`, the position suffix is dropped,
/// and the result is capped at `max_len` characters.
pub(crate) fn simplify_message(raw: &str, max_len: usize) -> String {
    static LOCATION_SUFFIX: OnceLock<Regex> = OnceLock::new();
    static EXPECTED_FOUND: OnceLock<Regex> = OnceLock::new();
    static BUT_FOUND: OnceLock<Regex> = OnceLock::new();

    let location_suffix = LOCATION_SUFFIX.get_or_init(|| {
        Regex::new(r"\s*at Line:\s*\d+\s*,\s*Column:\s*\d+\s*$").expect("Invalid regex pattern")
    });
    let expected_found = EXPECTED_FOUND.get_or_init(|| {
        Regex::new(r"(?s)^Expected:?\s*(.+?),\s*found:?\s*(.+)$").expect("Invalid regex pattern")
    });
    let but_found = BUT_FOUND.get_or_init(|| {
        Regex::new(r"(?i)\bbut\s+(.+?)\s+found\b").expect("Invalid regex pattern")
    });

    let trimmed = raw.trim();
    let text = trimmed
        .strip_prefix("sql parser error:")
        .unwrap_or(trimmed)
        .trim();
    let text = location_suffix.replace(text, "");

    let simplified = if let Some(caps) = expected_found.captures(&text) {
        let expected = caps[1].trim();
        let found = caps[2].trim();
        if found.eq_ignore_ascii_case("eof") {
            format!("Incomplete query: expected {expected}")
        } else {
            format!("Unexpected '{found}', expected {expected}")
        }
    } else if let Some(caps) = but_found.captures(&text) {
        format!("Unexpected '{}'", caps[1].trim())
    } else if text.to_ascii_lowercase().contains("unexpected end") {
        "Incomplete query".to_string()
    } else {
        text.to_string()
    };

    truncate(&format!("Syntax error: {simplified}"), max_len)
}

fn truncate(message: &str, max_len: usize) -> String {
    if message.chars().count() <= max_len {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(max_len.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
