//! Editor assistance: cursor context, inline ghost-text suggestions and the
//! completion dropdown trigger policy.
//!
//! Everything here is a pure function of the text and cursor offset, cheap
//! enough to run on every keystroke.

mod context;
pub mod rules;
mod trigger;

pub use context::cursor_context;
pub use rules::{all_rules, inline_suggestion, InlineRule, RuleContext};
pub use trigger::{should_trigger, MIN_TRIGGER_CHARS};

/// Keywords recognized by the cursor context and offered by keyword
/// completion.
pub const KEYWORDS: &[&str] = &[
    "ALL", "AND", "APPLY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CONVERT", "CROSS",
    "DESC", "DISTINCT", "ELSE", "END", "EXCEPT", "EXISTS", "FETCH", "FIRST", "FROM", "FULL",
    "GROUP", "HAVING", "IN", "INNER", "INTERSECT", "IS", "JOIN", "LEFT", "LIKE", "NEXT", "NOT",
    "NULL", "OFFSET", "ON", "ONLY", "OR", "ORDER", "OUTER", "OVER", "PARTITION", "PERCENT",
    "RIGHT", "ROWS", "SELECT", "THEN", "TIES", "TOP", "UNION", "WHEN", "WHERE", "WITH",
];

/// True when `word` is one of [`KEYWORDS`], ignoring case.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.iter().any(|kw| kw.eq_ignore_ascii_case(word))
}
