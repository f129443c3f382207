//! Cursor context resolution.
//!
//! Derives what the author is typing from `(sql, cursor)` alone. Works on the
//! token stream, so half-written queries resolve as well as complete ones.

use super::is_keyword;
use crate::scanner::classify::{clamp_offset, is_inside_literal_or_comment};
use crate::scanner::segments::is_word_char;
use crate::scanner::{scan, Token, TokenKind};
use crate::targets::{extract_targets_from_tokens, is_boundary_keyword, FromJoinTarget, ENT_PREFIX};
use crate::types::{CursorContext, TableInScope};

/// Resolves the editing context at byte offset `cursor` of `sql`.
///
/// Offsets past the end clamp to the end of the text.
pub fn cursor_context(sql: &str, cursor: usize) -> CursorContext {
    let cursor = clamp_offset(sql, cursor);
    let tokens = scan(sql);

    let current_word = current_word(&sql[..cursor]);
    let word_start = cursor - current_word.len();
    let before: Vec<&Token> = tokens.iter().filter(|t| t.end <= word_start).collect();

    let tables_in_scope = tables_in_scope(sql, &tokens);
    let alias_before_dot = if is_inside_literal_or_comment(sql, word_start) {
        None
    } else {
        alias_before_dot(&sql[..word_start], &tables_in_scope)
    };

    let keyword_index = before
        .iter()
        .rposition(|t| t.kind == TokenKind::Word && is_keyword(&t.text));
    let last_keyword = keyword_index.map(|i| before[i].text.to_ascii_lowercase());
    let is_after_from_join = match (keyword_index, last_keyword.as_deref()) {
        (Some(index), Some("from" | "join")) => before[index + 1..]
            .last()
            .is_none_or(|t| t.is_symbol(",") || t.is_symbol(".")),
        _ => false,
    };

    CursorContext {
        last_keyword,
        current_word: current_word.to_string(),
        tables_in_scope,
        alias_before_dot,
        is_after_from_join,
    }
}

/// Trailing run of word characters in `prefix`.
fn current_word(prefix: &str) -> &str {
    let start = prefix
        .char_indices()
        .rev()
        .take_while(|(_, ch)| is_word_char(*ch))
        .last()
        .map_or(prefix.len(), |(idx, _)| idx);
    &prefix[start..]
}

/// The identifier before a dot that ends `prefix`, e.g. `c` in `WHERE c.`.
///
/// The `ENT` namespace marker is not an alias unless the query declares a
/// table alias spelled the same way.
fn alias_before_dot(prefix: &str, tables: &[TableInScope]) -> Option<String> {
    let before_dot = prefix.strip_suffix('.')?;
    let qualifier = match before_dot.strip_suffix(']') {
        Some(inner) => &inner[inner.rfind('[')? + 1..],
        None => current_word(before_dot),
    };
    if qualifier.is_empty() {
        return None;
    }

    let declared = tables.iter().any(|t| {
        t.alias
            .as_deref()
            .is_some_and(|alias| alias.eq_ignore_ascii_case(qualifier))
    });
    if qualifier.eq_ignore_ascii_case(ENT_PREFIX) && !declared {
        return None;
    }
    Some(qualifier.to_string())
}

/// Every FROM/JOIN target in `sql` with its alias, in source order.
fn tables_in_scope(sql: &str, tokens: &[Token]) -> Vec<TableInScope> {
    extract_targets_from_tokens(sql, tokens)
        .iter()
        .map(|target| table_in_scope(target, tokens))
        .collect()
}

fn table_in_scope(target: &FromJoinTarget, tokens: &[Token]) -> TableInScope {
    let inside: Vec<&Token> = tokens
        .iter()
        .filter(|t| t.start >= target.start && t.end <= target.end)
        .collect();

    if target.is_subquery {
        return TableInScope {
            name: String::new(),
            alias: subquery_alias(tokens, target.start),
        };
    }

    if let Some((alias, name_end)) = trailing_alias(target, &inside) {
        let name = &target.raw_text[..name_end - target.start];
        return TableInScope {
            name: table_name(name.trim_end(), target.has_ent_prefix),
            alias: Some(alias.to_string()),
        };
    }

    let next = tokens.iter().position(|t| t.start >= target.end);
    TableInScope {
        name: table_name(&target.raw_text, target.has_ent_prefix),
        alias: next.and_then(|index| parse_alias(tokens, index)),
    }
}

/// Last word of an unbracketed run of two or more space-separated names.
fn trailing_alias<'t>(target: &FromJoinTarget, inside: &[&'t Token]) -> Option<(&'t str, usize)> {
    if target.is_bracketed || target.word_count < 2 {
        return None;
    }
    let [.., previous, last] = inside else {
        return None;
    };
    let separated = previous.end < last.start && previous.kind != TokenKind::Symbol;
    (last.kind == TokenKind::Word && separated).then_some((last.text.as_str(), previous.end))
}

/// `[AS] alias` starting at `index`.
fn parse_alias(tokens: &[Token], mut index: usize) -> Option<String> {
    if tokens.get(index)?.is_word("AS") {
        index += 1;
    }
    let token = tokens.get(index)?;
    let is_alias = match token.kind {
        TokenKind::Word => !is_boundary_keyword(&token.text) && !is_keyword(&token.text),
        TokenKind::Bracket => true,
        TokenKind::Symbol => false,
    };
    is_alias.then(|| unquote(&token.text).to_string())
}

/// Alias following the parenthesis that closes the subquery opened at `open`.
fn subquery_alias(tokens: &[Token], open: usize) -> Option<String> {
    let open_index = tokens.iter().position(|t| t.start == open)?;
    let depth = tokens[open_index].depth;
    let close_offset = tokens[open_index + 1..]
        .iter()
        .position(|t| t.depth == depth && t.is_symbol(")"))?;
    parse_alias(tokens, open_index + 1 + close_offset + 1)
}

/// Table name as the metadata provider knows it: no `ENT.` prefix, no quotes.
fn table_name(raw: &str, has_ent_prefix: bool) -> String {
    let name = if has_ent_prefix {
        raw.find('.').map_or(raw, |dot| &raw[dot + 1..])
    } else {
        raw
    };
    unquote(name.trim()).to_string()
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .or_else(|| text.strip_prefix('"').and_then(|t| t.strip_suffix('"')))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, alias: Option<&str>) -> TableInScope {
        TableInScope {
            name: name.to_string(),
            alias: alias.map(str::to_string),
        }
    }

    fn at_end(sql: &str) -> CursorContext {
        cursor_context(sql, sql.len())
    }

    #[test]
    fn test_join_on_context() {
        let ctx = at_end("SELECT * FROM [A] a JOIN [B] b ON ");
        assert_eq!(ctx.last_keyword.as_deref(), Some("on"));
        assert_eq!(ctx.current_word, "");
        assert_eq!(
            ctx.tables_in_scope,
            vec![table("A", Some("a")), table("B", Some("b"))]
        );
        assert!(!ctx.is_after_from_join);
    }

    #[test]
    fn test_current_word_and_keyword() {
        let ctx = at_end("SELECT Em");
        assert_eq!(ctx.current_word, "Em");
        assert_eq!(ctx.last_keyword.as_deref(), Some("select"));
    }

    #[test]
    fn test_alias_before_dot() {
        let ctx = at_end("SELECT c.Em FROM Contacts c");
        assert_eq!(ctx.alias_before_dot, None);

        let sql = "SELECT c.Em FROM Contacts c";
        let ctx = cursor_context(sql, 11);
        assert_eq!(ctx.alias_before_dot.as_deref(), Some("c"));
        assert_eq!(ctx.current_word, "Em");
        assert_eq!(ctx.tables_in_scope, vec![table("Contacts", Some("c"))]);
    }

    #[test]
    fn test_no_alias_inside_literals() {
        assert_eq!(at_end("SELECT * FROM Contacts c WHERE Name = 'c.b").alias_before_dot, None);
        assert_eq!(at_end("SELECT * FROM Contacts c -- c.").alias_before_dot, None);
        assert_eq!(at_end("SELECT * FROM Contacts c /* c.Em").alias_before_dot, None);
        let ctx = at_end("SELECT * FROM Contacts c WHERE Name = 'x' AND c.");
        assert_eq!(ctx.alias_before_dot.as_deref(), Some("c"));
    }

    #[test]
    fn test_ent_prefix_is_not_an_alias() {
        let ctx = at_end("SELECT * FROM ent.");
        assert_eq!(ctx.alias_before_dot, None);
        assert!(ctx.is_after_from_join);

        let ctx = at_end("SELECT * FROM ENT.Contacts c WHERE c.");
        assert_eq!(ctx.alias_before_dot.as_deref(), Some("c"));
        assert_eq!(ctx.tables_in_scope, vec![table("Contacts", Some("c"))]);
    }

    #[test]
    fn test_ent_declared_as_alias_resolves() {
        let ctx = at_end("SELECT * FROM Entries AS ent WHERE ent.");
        assert_eq!(ctx.alias_before_dot.as_deref(), Some("ent"));
    }

    #[test]
    fn test_after_from_join() {
        assert!(at_end("SELECT * FROM ").is_after_from_join);
        assert!(at_end("SELECT * FROM Cont").is_after_from_join);
        assert!(at_end("SELECT * FROM Contacts, ").is_after_from_join);
        assert!(!at_end("SELECT * FROM Contacts ").is_after_from_join);
        assert!(at_end("SELECT * FROM Contacts c JOIN ").is_after_from_join);
    }

    #[test]
    fn test_keywords_inside_strings_are_ignored() {
        let ctx = at_end("SELECT * FROM Contacts WHERE Name = 'from ");
        assert_eq!(ctx.last_keyword.as_deref(), Some("where"));
    }

    #[test]
    fn test_subquery_alias() {
        let ctx = at_end("SELECT * FROM (SELECT Id FROM Orders) AS o WHERE ");
        assert_eq!(
            ctx.tables_in_scope,
            vec![table("", Some("o")), table("Orders", None)]
        );
    }

    #[test]
    fn test_cursor_is_clamped() {
        let ctx = cursor_context("SELECT é", 100);
        assert_eq!(ctx.current_word, "é");
        let ctx = cursor_context("SELECT é", 8);
        assert_eq!(ctx.current_word, "");
    }
}
