//! Statement-level policy checks over a parsed syntax tree.
//!
//! Query activities accept exactly one kind of statement: a plain `SELECT`
//! whose result is written to a pre-configured target. Everything else is
//! reported here.

use sqlparser::ast::{LimitClause, Query, SetExpr, Statement};
use std::ops::Range;
#[cfg(feature = "tracing")]
use tracing::trace;

use crate::scanner::{split_statements, Token, TokenKind};
use crate::types::{diagnostic_codes, Diagnostic, Span};

/// Leading keywords of statements that modify data, schema or session state.
const DISALLOWED_KEYWORDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "CREATE", "ALTER", "DROP", "TRUNCATE", "MERGE", "EXEC",
    "EXECUTE", "GRANT", "REVOKE", "DECLARE", "SET", "USE",
];

pub(crate) const LIMIT_MESSAGE: &str = "LIMIT is not supported. Use SELECT TOP n instead, \
     or ORDER BY ... OFFSET n ROWS FETCH NEXT m ROWS ONLY.";

const CTE_MESSAGE: &str = "Common Table Expressions (WITH ... AS) are not supported. \
     Rewrite the CTE as a subquery in the FROM clause.";

const SELECT_INTO_MESSAGE: &str = "SELECT ... INTO is not supported. The target Data \
     Extension is chosen in the query activity settings.";

const ORDER_BY_MESSAGE: &str = "ORDER BY without TOP or OFFSET ... FETCH does not \
     guarantee the order of rows written to the target.";

enum StatementClass<'a> {
    Select(&'a Query),
    Disallowed(String),
    Other(String),
}

/// Runs the per-statement policy checks.
pub(crate) fn check_statements(
    sql: &str,
    tokens: &[Token],
    statements: &[Statement],
) -> Vec<Diagnostic> {
    let ranges = statement_ranges(sql, statements.len());
    let mut diagnostics = Vec::new();

    for (statement, range) in statements.iter().zip(ranges) {
        let statement_tokens: Vec<&Token> = tokens
            .iter()
            .filter(|t| t.start >= range.start && t.end <= range.end)
            .collect();
        let span = Span::new(range.start, range.end);

        let query = match classify(statement, &statement_tokens) {
            StatementClass::Select(query) => query,
            StatementClass::Disallowed(keyword) => {
                #[cfg(feature = "tracing")]
                trace!(%keyword, "disallowed statement");
                diagnostics.push(Diagnostic::error(
                    diagnostic_codes::STATEMENT_NOT_ALLOWED,
                    format!(
                        "{keyword} statements are not allowed. Only SELECT queries can run in a query activity."
                    ),
                    span,
                ));
                continue;
            }
            StatementClass::Other(keyword) => {
                let message = if keyword.is_empty() {
                    "Only SELECT statements are supported.".to_string()
                } else {
                    format!("Only SELECT statements are supported (found {keyword}).")
                };
                diagnostics.push(Diagnostic::error(
                    diagnostic_codes::STATEMENT_NOT_SELECT,
                    message,
                    span,
                ));
                continue;
            }
        };

        if query.with.is_some() {
            // Anchored at the start of the source, through the first `WITH` anywhere in it.
            let end = tokens
                .iter()
                .find(|t| t.is_word("WITH"))
                .map_or(range.end, |t| t.end);
            diagnostics.push(Diagnostic::error(
                diagnostic_codes::CTE_NOT_SUPPORTED,
                CTE_MESSAGE,
                Span::new(0, end),
            ));
        }

        if uses_limit(query) {
            diagnostics.push(limit_diagnostic(sql, tokens, &range));
        }

        if let Some(into_span) = select_into_span(query, &statement_tokens) {
            diagnostics.push(Diagnostic::error(
                diagnostic_codes::SELECT_INTO_NOT_SUPPORTED,
                SELECT_INTO_MESSAGE,
                into_span,
            ));
        }

        if orders_without_row_limit(query) {
            if let Some(span) = order_by_span(&statement_tokens) {
                diagnostics.push(Diagnostic::warning(
                    diagnostic_codes::ORDER_BY_WITHOUT_TOP,
                    ORDER_BY_MESSAGE,
                    span,
                ));
            }
        }
    }

    diagnostics
}

/// One range per parsed statement; the whole trimmed source when the
/// textual split and the parse disagree.
fn statement_ranges(sql: &str, count: usize) -> Vec<Range<usize>> {
    let ranges = split_statements(sql);
    if ranges.len() == count {
        return ranges;
    }
    let leading = sql.len() - sql.trim_start().len();
    let whole = leading..sql.trim_end().len().max(leading);
    vec![whole; count]
}

fn classify<'a>(statement: &'a Statement, tokens: &[&Token]) -> StatementClass<'a> {
    if let Statement::Query(query) = statement {
        return match query.body.as_ref() {
            SetExpr::Insert(_) => StatementClass::Disallowed("INSERT".to_string()),
            SetExpr::Update(_) => StatementClass::Disallowed("UPDATE".to_string()),
            SetExpr::Delete(_) => StatementClass::Disallowed("DELETE".to_string()),
            SetExpr::Merge(_) => StatementClass::Disallowed("MERGE".to_string()),
            _ => StatementClass::Select(query),
        };
    }

    let keyword = tokens
        .iter()
        .find(|t| t.kind == TokenKind::Word)
        .map(|t| t.text.to_ascii_uppercase())
        .unwrap_or_default();
    if DISALLOWED_KEYWORDS.contains(&keyword.as_str()) {
        StatementClass::Disallowed(keyword)
    } else {
        StatementClass::Other(keyword)
    }
}

/// True for `LIMIT n` and `LIMIT offset, n`; `OFFSET ... FETCH` alone is allowed.
fn uses_limit(query: &Query) -> bool {
    match &query.limit_clause {
        Some(LimitClause::LimitOffset { limit, .. }) => limit.is_some(),
        Some(LimitClause::OffsetCommaLimit { .. }) => true,
        None => false,
    }
}

/// Builds the LIMIT diagnostic from the first top-level `LIMIT` keyword in
/// `range`, spanning to the end of the source.
pub(crate) fn limit_diagnostic(sql: &str, tokens: &[Token], range: &Range<usize>) -> Diagnostic {
    let in_range = |t: &&Token| t.start >= range.start && t.end <= range.end && t.is_word("LIMIT");
    let start = tokens
        .iter()
        .filter(in_range)
        .find(|t| t.depth == 0)
        .or_else(|| tokens.iter().find(in_range))
        .map_or(range.start, |t| t.start);
    Diagnostic::error(
        diagnostic_codes::LIMIT_NOT_SUPPORTED,
        LIMIT_MESSAGE,
        Span::new(start, sql.len()),
    )
}

fn select_into_span(query: &Query, tokens: &[&Token]) -> Option<Span> {
    let SetExpr::Select(select) = query.body.as_ref() else {
        return None;
    };
    select.into.as_ref()?;
    let into = tokens.iter().find(|t| t.depth == 0 && t.is_word("INTO"))?;
    let end = tokens
        .iter()
        .find(|t| t.start > into.start && t.is_name())
        .map_or(into.end, |t| t.end);
    Some(Span::new(into.start, end))
}

fn orders_without_row_limit(query: &Query) -> bool {
    if query.order_by.is_none() || query.fetch.is_some() || query.limit_clause.is_some() {
        return false;
    }
    match query.body.as_ref() {
        SetExpr::Select(select) => select.top.is_none(),
        _ => true,
    }
}

fn order_by_span(tokens: &[&Token]) -> Option<Span> {
    let position = tokens
        .iter()
        .rposition(|t| t.depth == 0 && t.is_word("ORDER"))?;
    let order = tokens[position];
    let end = tokens
        .get(position + 1)
        .filter(|t| t.is_word("BY"))
        .map_or(order.end, |t| t.end);
    Some(Span::new(order.start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_statements;
    use crate::scanner::scan;
    use rstest::rstest;

    fn check(sql: &str) -> Vec<Diagnostic> {
        let statements = parse_statements(sql).expect("valid SQL");
        check_statements(sql, &scan(sql), &statements)
    }

    fn codes(sql: &str) -> Vec<&'static str> {
        check(sql).iter().map(|d| d.code).collect()
    }

    #[rstest]
    #[case("INSERT INTO Target (Id) SELECT Id FROM Contacts", "INSERT")]
    #[case("UPDATE Contacts SET Name = 'x'", "UPDATE")]
    #[case("DELETE FROM Contacts WHERE Id = 1", "DELETE")]
    #[case("DROP TABLE Contacts", "DROP")]
    #[case("TRUNCATE TABLE Contacts", "TRUNCATE")]
    #[case("CREATE TABLE t (id INT)", "CREATE")]
    fn test_disallowed_statement(#[case] sql: &str, #[case] keyword: &str) {
        let diagnostics = check(sql);
        assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");
        assert_eq!(diagnostics[0].code, diagnostic_codes::STATEMENT_NOT_ALLOWED);
        assert!(diagnostics[0].message.contains(keyword));
        assert_eq!(diagnostics[0].span(), Span::new(0, sql.len()));
    }

    #[test]
    fn test_plain_select_is_clean() {
        assert!(check("SELECT TOP 10 Id FROM Contacts WHERE Id > 5").is_empty());
    }

    #[test]
    fn test_cte_spans_to_with_keyword() {
        let diagnostics = check("WITH c AS (SELECT 1 AS x) SELECT x FROM c");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].span(), Span::new(0, 4));
        assert!(diagnostics[0].message.contains("Common Table Expression"));
    }

    #[test]
    fn test_cte_in_later_statement_spans_from_source_start() {
        let sql = "SELECT 1; WITH c AS (SELECT 1 AS x) SELECT x FROM c";
        let diagnostics = check(sql);
        assert_eq!(codes(sql), vec![diagnostic_codes::CTE_NOT_SUPPORTED]);
        assert_eq!(diagnostics[0].span(), Span::new(0, 14));
        assert_eq!(&sql[10..14], "WITH");
    }

    #[test]
    fn test_limit_spans_to_end_of_source() {
        let sql = "SELECT * FROM Contacts LIMIT 10";
        let diagnostics = check(sql);
        assert_eq!(codes(sql), vec![diagnostic_codes::LIMIT_NOT_SUPPORTED]);
        assert_eq!(diagnostics[0].span(), Span::new(23, sql.len()));
        assert!(diagnostics[0].message.contains("TOP"));
    }

    #[test]
    fn test_offset_fetch_is_allowed() {
        assert!(
            check("SELECT Id FROM Contacts ORDER BY Id OFFSET 10 ROWS FETCH NEXT 20 ROWS ONLY")
                .is_empty()
        );
    }

    #[test]
    fn test_select_into_is_reported() {
        let sql = "SELECT Id INTO #tmp FROM Contacts";
        let diagnostics = check(sql);
        assert_eq!(codes(sql), vec![diagnostic_codes::SELECT_INTO_NOT_SUPPORTED]);
        assert_eq!(&sql[diagnostics[0].start_index..diagnostics[0].end_index], "INTO #tmp");
    }

    #[test]
    fn test_order_by_without_top_warns() {
        let sql = "SELECT Id FROM Contacts ORDER BY Id";
        let diagnostics = check(sql);
        assert_eq!(codes(sql), vec![diagnostic_codes::ORDER_BY_WITHOUT_TOP]);
        assert_eq!(diagnostics[0].severity, crate::types::Severity::Warning);
        assert_eq!(&sql[diagnostics[0].start_index..diagnostics[0].end_index], "ORDER BY");
        assert!(check("SELECT TOP 5 Id FROM Contacts ORDER BY Id").is_empty());
    }

    #[test]
    fn test_each_statement_is_checked() {
        let sql = "SELECT 1; DELETE FROM Contacts";
        let diagnostics = check(sql);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].span(), Span::new(10, sql.len()));
    }
}
