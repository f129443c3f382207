//! Cursor context report.

use mcql_core::{CursorContext, InlineSuggestion};
use std::fmt::{Display, Write};

/// Format a cursor context and its inline suggestion as JSON.
pub fn format_context_json(
    context: &CursorContext,
    suggestion: Option<&InlineSuggestion>,
    should_trigger: bool,
) -> String {
    let value = serde_json::json!({
        "context": context,
        "suggestion": suggestion,
        "shouldTrigger": should_trigger,
    });
    serde_json::to_string_pretty(&value).unwrap_or_default()
}

/// Format a cursor context as aligned `label value` lines.
pub fn format_context_text(
    context: &CursorContext,
    suggestion: Option<&InlineSuggestion>,
    should_trigger: bool,
) -> String {
    let mut out = String::new();

    field(&mut out, "current word:", format!("{:?}", context.current_word));
    field(&mut out, "last keyword:", or_dash(context.last_keyword.as_deref()));
    field(&mut out, "qualifier:", or_dash(context.alias_before_dot.as_deref()));
    field(&mut out, "after FROM/JOIN:", context.is_after_from_join);
    field(&mut out, "open dropdown:", should_trigger);
    field(
        &mut out,
        "ghost text:",
        suggestion.map_or_else(|| "-".to_string(), |s| format!("{:?}", s.text)),
    );
    field(&mut out, "tables in scope:", context.tables_in_scope.len());

    for table in &context.tables_in_scope {
        let _ = match &table.alias {
            Some(alias) => writeln!(out, "  {} AS {alias}", table.name),
            None => writeln!(out, "  {}", table.name),
        };
    }

    out
}

fn field(out: &mut String, label: &str, value: impl Display) {
    let _ = writeln!(out, "{label:<17}{value}");
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
