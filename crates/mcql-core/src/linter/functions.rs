//! Functions the query engine rejects, with their supported replacements.

use regex::Regex;
use sqlparser::ast::{ObjectName, Statement};
use std::sync::OnceLock;

use super::visit::visit_function_calls;
use crate::scanner::classify::is_inside_literal_or_comment;
use crate::types::{diagnostic_codes, Diagnostic, Span};

/// A function name that parses fine but fails at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedFunction {
    /// Lowercase function name.
    pub name: &'static str,
    /// Supported construct to use instead, if one exists.
    pub alternative: Option<&'static str>,
}

const fn entry(name: &'static str, alternative: Option<&'static str>) -> UnsupportedFunction {
    UnsupportedFunction { name, alternative }
}

const XML_PATH_CONCAT: Option<&str> = Some("FOR XML PATH('') with STUFF()");
const NULL_FALLBACK: Option<&str> = Some("ISNULL() or COALESCE()");
const CASE_EXPRESSION: Option<&str> = Some("a CASE expression");

pub const UNSUPPORTED_FUNCTIONS: &[UnsupportedFunction] = &[
    entry("string_agg", XML_PATH_CONCAT),
    entry("group_concat", XML_PATH_CONCAT),
    entry("listagg", XML_PATH_CONCAT),
    entry("concat_ws", Some("CONCAT() or the + operator")),
    entry("string_split", None),
    entry("string_escape", None),
    entry("translate", Some("nested REPLACE() calls")),
    entry("openjson", None),
    entry("json_query", None),
    entry("json_modify", None),
    entry("json_object", None),
    entry("json_array", None),
    entry("isjson", None),
    entry("now", Some("GETDATE()")),
    entry("curdate", Some("CAST(GETDATE() AS DATE)")),
    entry("date_trunc", Some("DATEADD() with DATEDIFF()")),
    entry("datetrunc", Some("DATEADD() with DATEDIFF()")),
    entry("date_bucket", None),
    entry("generate_series", None),
    entry("ifnull", NULL_FALLBACK),
    entry("nvl", NULL_FALLBACK),
    entry("greatest", CASE_EXPRESSION),
    entry("least", CASE_EXPRESSION),
    entry("length", Some("LEN()")),
    entry("to_char", Some("FORMAT() or CONVERT()")),
    entry("to_date", Some("CONVERT() or CAST()")),
    entry("approx_count_distinct", Some("COUNT(DISTINCT ...)")),
];

/// Looks up a function name case-insensitively.
pub fn lookup(name: &str) -> Option<&'static UnsupportedFunction> {
    UNSUPPORTED_FUNCTIONS
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name))
}

impl UnsupportedFunction {
    pub fn message(&self) -> String {
        let display = self.name.to_ascii_uppercase();
        match self.alternative {
            Some(alternative) => {
                format!("{display}() is not supported. Use {alternative} instead.")
            }
            None => format!("{display}() is not supported and has no direct alternative."),
        }
    }
}

fn call_patterns() -> &'static [(&'static UnsupportedFunction, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static UnsupportedFunction, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        UNSUPPORTED_FUNCTIONS
            .iter()
            .map(|f| {
                let pattern = format!(r"(?i)\b{}\s*\(", regex::escape(f.name));
                (f, Regex::new(&pattern).expect("Invalid regex pattern"))
            })
            .collect()
    })
}

/// Spans of `name(` call sites outside strings and comments, in source order.
fn call_sites(sql: &str, function: &UnsupportedFunction) -> Vec<Span> {
    let Some((_, pattern)) = call_patterns().iter().find(|(f, _)| f.name == function.name) else {
        return Vec::new();
    };
    pattern
        .find_iter(sql)
        .filter(|m| !is_inside_literal_or_comment(sql, m.start()))
        .map(|m| Span::new(m.start(), m.start() + function.name.len()))
        .collect()
}

/// Reports every unsupported function call in the parsed statements.
///
/// Each call node yields one diagnostic positioned at the first textual
/// occurrence of its name, so repeated calls share a span.
pub(crate) fn check_function_calls(
    sql: &str,
    statements: &[Statement],
    fallback: Span,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for statement in statements {
        visit_function_calls(statement, &mut |name: &ObjectName| {
            let Some(function) = function_name(name).and_then(|n| lookup(&n)) else {
                return;
            };
            let span = call_sites(sql, function)
                .first()
                .copied()
                .unwrap_or(fallback);
            diagnostics.push(Diagnostic::error(
                diagnostic_codes::UNSUPPORTED_FUNCTION,
                function.message(),
                span,
            ));
        });
    }
    diagnostics
}

/// Scans raw source for unsupported calls when no syntax tree is available.
///
/// One diagnostic per call site.
pub(crate) fn scan_function_calls(sql: &str) -> Vec<Diagnostic> {
    let mut found: Vec<Diagnostic> = UNSUPPORTED_FUNCTIONS
        .iter()
        .flat_map(|function| {
            call_sites(sql, function).into_iter().map(move |span| {
                Diagnostic::error(
                    diagnostic_codes::UNSUPPORTED_FUNCTION,
                    function.message(),
                    span,
                )
            })
        })
        .collect();
    found.sort_by_key(|d| d.start_index);
    found
}

fn function_name(name: &ObjectName) -> Option<String> {
    name.0
        .last()
        .and_then(|part| part.as_ident())
        .map(|ident| ident.value.to_lowercase())
}
