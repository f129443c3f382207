//! Inline (ghost text) suggestion rules.
//!
//! Each rule inspects the text before the cursor and may propose a fragment
//! to append. Rules are evaluated in priority order and the first suggestion
//! wins. New rules implement [`InlineRule`] and are appended to the list in
//! [`all_rules`].

use super::{cursor_context, is_keyword, KEYWORDS};
use crate::metadata::{find_table, TableMetadata};
use crate::scanner::classify::{clamp_offset, is_inside_literal_or_comment};
use crate::scanner::segments::is_word_char;
use crate::scanner::{scan, Token, TokenKind};
use crate::types::{CursorContext, InlineSuggestion};

/// Input shared by every rule for one evaluation.
pub struct RuleContext<'a> {
    pub sql: &'a str,
    /// Byte offset of the cursor, clamped to a character boundary.
    pub cursor: usize,
    pub cursor_context: CursorContext,
    pub metadata: &'a [TableMetadata],
    tokens_before: Vec<Token>,
}

impl<'a> RuleContext<'a> {
    pub fn new(sql: &'a str, cursor: usize, metadata: &'a [TableMetadata]) -> Self {
        let cursor = clamp_offset(sql, cursor);
        Self {
            sql,
            cursor,
            cursor_context: cursor_context(sql, cursor),
            metadata,
            tokens_before: scan(&sql[..cursor]),
        }
    }

    pub fn text_before_cursor(&self) -> &'a str {
        &self.sql[..self.cursor]
    }

    /// True when the cursor is in plain SQL rather than inside a string,
    /// comment or quoted identifier.
    pub fn in_code(&self) -> bool {
        !is_inside_literal_or_comment(self.sql, self.cursor)
    }

    /// True when no word continues past the cursor.
    pub fn at_word_end(&self) -> bool {
        !self.sql[self.cursor..]
            .chars()
            .next()
            .is_some_and(is_word_char)
    }

    /// True when the text before the cursor ends in whitespace and no word
    /// has been started.
    fn after_whitespace(&self) -> bool {
        self.cursor_context.current_word.is_empty()
            && self
                .text_before_cursor()
                .ends_with(|ch: char| ch.is_whitespace())
    }

    /// Tokens before the cursor, oldest first.
    pub fn tokens_before(&self) -> &[Token] {
        &self.tokens_before
    }
}

/// A ghost-text rule.
pub trait InlineRule: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Cheap applicability check.
    fn matches(&self, ctx: &RuleContext<'_>) -> bool;

    /// The fragment to append at the cursor, if the rule has one.
    fn suggestion(&self, ctx: &RuleContext<'_>) -> Option<InlineSuggestion>;
}

static RULES: [&dyn InlineRule; 6] = [
    &AliasField,
    &JoinOn,
    &GroupOrderBy,
    &IsNull,
    &SelectStarFrom,
    &KeywordPrefix,
];

/// Every rule, in priority order.
pub fn all_rules() -> &'static [&'static dyn InlineRule] {
    &RULES
}

/// Returns the first suggestion any rule produces at `cursor`.
pub fn inline_suggestion(
    sql: &str,
    cursor: usize,
    metadata: &[TableMetadata],
) -> Option<InlineSuggestion> {
    let ctx = RuleContext::new(sql, cursor, metadata);
    all_rules()
        .iter()
        .filter(|rule| rule.matches(&ctx))
        .find_map(|rule| rule.suggestion(&ctx))
}

/// Renders `text` in the case the author typed `typed` in.
fn match_case(typed: &str, text: &str) -> String {
    let lowercase = typed.chars().any(char::is_lowercase) && !typed.chars().any(char::is_uppercase);
    if lowercase {
        text.to_lowercase()
    } else {
        text.to_uppercase()
    }
}

fn last_tokens<'a, const N: usize>(ctx: &'a RuleContext<'_>) -> Option<&'a [Token; N]> {
    let tokens = ctx.tokens_before();
    tokens.get(tokens.len().checked_sub(N)?..)?.try_into().ok()
}

/// `alias.Pre` completes to a field of the aliased Data Extension.
struct AliasField;

impl InlineRule for AliasField {
    fn name(&self) -> &'static str {
        "alias-field"
    }

    fn matches(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.in_code()
            && ctx.at_word_end()
            && !ctx.metadata.is_empty()
            && ctx.cursor_context.alias_before_dot.is_some()
            && !ctx.cursor_context.current_word.is_empty()
    }

    fn suggestion(&self, ctx: &RuleContext<'_>) -> Option<InlineSuggestion> {
        let qualifier = ctx.cursor_context.alias_before_dot.as_deref()?;
        let typed = ctx.cursor_context.current_word.as_str();

        let table = ctx.cursor_context.tables_in_scope.iter().find(|t| {
            t.alias
                .as_deref()
                .is_some_and(|alias| alias.eq_ignore_ascii_case(qualifier))
        });
        let table_name = table.map_or(qualifier, |t| t.name.as_str());
        let metadata = find_table(ctx.metadata, table_name)?;

        metadata
            .fields
            .iter()
            .filter(|field| field.name.len() > typed.len())
            .find(|field| {
                field
                    .name
                    .get(..typed.len())
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(typed))
            })
            .map(|field| InlineSuggestion::new(&field.name[typed.len()..]))
    }
}

/// `JOIN <table> [AS] <alias> ` continues with `ON `.
struct JoinOn;

impl InlineRule for JoinOn {
    fn name(&self) -> &'static str {
        "join-on"
    }

    fn matches(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.in_code()
            && ctx.after_whitespace()
            && matches!(ctx.cursor_context.last_keyword.as_deref(), Some("join" | "as"))
    }

    fn suggestion(&self, ctx: &RuleContext<'_>) -> Option<InlineSuggestion> {
        let tokens = ctx.tokens_before();
        let join_index = tokens.iter().rposition(|t| t.is_word("JOIN"))?;
        let join = &tokens[join_index];
        let rest = &tokens[join_index + 1..];

        let [.., previous, alias] = rest else {
            return None;
        };
        let alias_is_word = alias.kind == TokenKind::Word && !is_keyword(&alias.text);
        let separated = previous.end < alias.start && previous.kind != TokenKind::Symbol;
        let only_names = rest
            .iter()
            .all(|t| t.is_name() || t.is_symbol(".") || t.is_symbol("-"));
        // After `AS` the JOIN must still be the current clause: `<table> AS <alias>`.
        if previous.is_word("AS") {
            let table = &rest[..rest.len() - 2];
            let plain_table = !table.is_empty()
                && table
                    .iter()
                    .all(|t| t.kind != TokenKind::Word || !is_keyword(&t.text));
            if !plain_table {
                return None;
            }
        }

        (alias_is_word && separated && only_names)
            .then(|| InlineSuggestion::new(format!("{} ", match_case(&join.text, "ON"))))
    }
}

/// `GROUP ` and `ORDER ` continue with `BY `.
struct GroupOrderBy;

impl InlineRule for GroupOrderBy {
    fn name(&self) -> &'static str {
        "group-order-by"
    }

    fn matches(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.in_code()
            && ctx.after_whitespace()
            && matches!(
                ctx.cursor_context.last_keyword.as_deref(),
                Some("group" | "order")
            )
    }

    fn suggestion(&self, ctx: &RuleContext<'_>) -> Option<InlineSuggestion> {
        let [keyword] = last_tokens::<1>(ctx)?;
        (keyword.is_word("GROUP") || keyword.is_word("ORDER"))
            .then(|| InlineSuggestion::new(format!("{} ", match_case(&keyword.text, "BY"))))
    }
}

/// `IS ` and `IS NOT ` continue with `NULL`.
struct IsNull;

impl InlineRule for IsNull {
    fn name(&self) -> &'static str {
        "is-null"
    }

    fn matches(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.in_code()
            && ctx.after_whitespace()
            && matches!(ctx.cursor_context.last_keyword.as_deref(), Some("is" | "not"))
    }

    fn suggestion(&self, ctx: &RuleContext<'_>) -> Option<InlineSuggestion> {
        let is = match last_tokens::<2>(ctx) {
            Some([is, not]) if is.is_word("IS") && not.is_word("NOT") => is,
            _ => {
                let [is] = last_tokens::<1>(ctx)?;
                if !is.is_word("IS") {
                    return None;
                }
                is
            }
        };
        Some(InlineSuggestion::new(match_case(&is.text, "NULL")))
    }
}

/// `SELECT * ` continues with `FROM `.
struct SelectStarFrom;

impl InlineRule for SelectStarFrom {
    fn name(&self) -> &'static str {
        "select-star-from"
    }

    fn matches(&self, ctx: &RuleContext<'_>) -> bool {
        ctx.in_code()
            && ctx.after_whitespace()
            && ctx.cursor_context.last_keyword.as_deref() == Some("select")
    }

    fn suggestion(&self, ctx: &RuleContext<'_>) -> Option<InlineSuggestion> {
        let [select, star] = last_tokens::<2>(ctx)?;
        (select.is_word("SELECT") && star.is_symbol("*"))
            .then(|| InlineSuggestion::new(format!("{} ", match_case(&select.text, "FROM"))))
    }
}

/// A partial word that only one keyword extends completes to that keyword.
struct KeywordPrefix;

impl InlineRule for KeywordPrefix {
    fn name(&self) -> &'static str {
        "keyword-prefix"
    }

    fn matches(&self, ctx: &RuleContext<'_>) -> bool {
        let word = &ctx.cursor_context.current_word;
        ctx.in_code()
            && ctx.at_word_end()
            && ctx.cursor_context.alias_before_dot.is_none()
            && !ctx.text_before_cursor()[..ctx.cursor - word.len()].ends_with('.')
            && word.chars().count() >= 2
            && !is_keyword(word)
    }

    fn suggestion(&self, ctx: &RuleContext<'_>) -> Option<InlineSuggestion> {
        let typed = ctx.cursor_context.current_word.as_str();
        let mut candidates = KEYWORDS.iter().filter(|kw| {
            kw.len() > typed.len()
                && kw
                    .get(..typed.len())
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(typed))
        });
        let keyword = candidates.next()?;
        if candidates.next().is_some() {
            return None;
        }
        Some(InlineSuggestion::new(match_case(
            typed,
            &keyword[typed.len()..],
        )))
    }
}
