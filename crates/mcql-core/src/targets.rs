//! FROM/JOIN target extraction.
//!
//! Works on the token stream alone, so it can describe table references in a
//! query the dialect parser rejected. The bracket-omission recovery heuristic
//! and the cursor context resolver are both built on it.

use serde::Serialize;

use crate::scanner::{scan, Token, TokenKind};
use crate::types::Span;

/// Namespace marker for shared (enterprise) Data Extensions, e.g. `ENT.Contacts`.
pub const ENT_PREFIX: &str = "ENT";

/// Keywords that end a table reference run.
const BOUNDARY_KEYWORDS: &[&str] = &[
    "and", "apply", "as", "cross", "else", "end", "except", "fetch", "for", "from", "full",
    "group", "having", "in", "inner", "intersect", "into", "join", "left", "limit", "not",
    "offset", "on", "option", "or", "order", "outer", "pivot", "right", "select", "then",
    "union", "unpivot", "using", "when", "where", "window", "with",
];

pub(crate) fn is_boundary_keyword(text: &str) -> bool {
    BOUNDARY_KEYWORDS
        .iter()
        .any(|kw| text.eq_ignore_ascii_case(kw))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClauseKeyword {
    From,
    Join,
}

/// A table reference span following `FROM` or `JOIN`, possibly malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FromJoinTarget {
    pub clause: ClauseKeyword,
    pub start: usize,
    pub end: usize,
    pub raw_text: String,
    /// Name tokens in the run, not counting a leading `ENT.`.
    pub word_count: usize,
    pub has_hyphen: bool,
    pub has_dot: bool,
    pub has_ent_prefix: bool,
    /// The name after any `ENT.` prefix is fully bracketed or quoted.
    pub is_bracketed: bool,
    /// The target is a parenthesized subquery; only its `(` is spanned.
    pub is_subquery: bool,
}

impl FromJoinTarget {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Text of the reference after any `ENT.` prefix.
    pub fn unprefixed_text(&self) -> &str {
        if !self.has_ent_prefix {
            return &self.raw_text;
        }
        self.raw_text
            .find('.')
            .map_or(self.raw_text.as_str(), |dot| &self.raw_text[dot + 1..])
    }
}

/// Extracts every FROM/JOIN target in `sql`, in source order.
pub fn extract_targets(sql: &str) -> Vec<FromJoinTarget> {
    extract_targets_from_tokens(sql, &scan(sql))
}

/// Same as [`extract_targets`] over an existing token stream of `sql`.
pub fn extract_targets_from_tokens(sql: &str, tokens: &[Token]) -> Vec<FromJoinTarget> {
    let mut targets = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        let clause = if token.is_word("FROM") {
            ClauseKeyword::From
        } else if token.is_word("JOIN") {
            ClauseKeyword::Join
        } else {
            continue;
        };
        collect_clause_targets(sql, tokens, index + 1, token.depth, clause, &mut targets);
    }

    targets
}

fn collect_clause_targets(
    sql: &str,
    tokens: &[Token],
    mut cursor: usize,
    depth: usize,
    clause: ClauseKeyword,
    targets: &mut Vec<FromJoinTarget>,
) {
    loop {
        while tokens.get(cursor).is_some_and(|t| t.is_symbol(",")) {
            cursor += 1;
        }
        let Some(first) = tokens.get(cursor) else {
            return;
        };
        if first.depth != depth {
            return;
        }

        if first.is_symbol("(") {
            targets.push(FromJoinTarget {
                clause,
                start: first.start,
                end: first.end,
                raw_text: first.text.clone(),
                word_count: 0,
                has_hyphen: false,
                has_dot: false,
                has_ent_prefix: false,
                is_bracketed: false,
                is_subquery: true,
            });
            cursor = skip_alias(tokens, matching_close(tokens, cursor, depth), depth);
        } else if first.kind == TokenKind::Bracket && !is_connector(tokens.get(cursor + 1), depth)
        {
            targets.push(FromJoinTarget {
                clause,
                start: first.start,
                end: first.end,
                raw_text: first.text.clone(),
                word_count: 1,
                has_hyphen: false,
                has_dot: false,
                has_ent_prefix: false,
                is_bracketed: true,
                is_subquery: false,
            });
            cursor = skip_alias(tokens, cursor + 1, depth);
        } else {
            let Some((target, next)) = collect_run(sql, tokens, cursor, depth, clause) else {
                return;
            };
            targets.push(target);
            cursor = skip_alias(tokens, next, depth);
        }

        match tokens.get(cursor) {
            Some(t) if t.is_symbol(",") && t.depth == depth => continue,
            _ => return,
        }
    }
}

fn is_run_name(token: &Token, depth: usize) -> bool {
    token.depth == depth
        && match token.kind {
            TokenKind::Bracket => true,
            TokenKind::Word => !is_boundary_keyword(&token.text),
            TokenKind::Symbol => false,
        }
}

fn is_connector(token: Option<&Token>, depth: usize) -> bool {
    token.is_some_and(|t| t.depth == depth && (t.is_symbol(".") || t.is_symbol("-")))
}

/// Greedily collects `name ((. | - | whitespace) name)*` starting at `start`.
fn collect_run(
    sql: &str,
    tokens: &[Token],
    start: usize,
    depth: usize,
    clause: ClauseKeyword,
) -> Option<(FromJoinTarget, usize)> {
    let first = tokens.get(start).filter(|t| is_run_name(t, depth))?;

    let mut last = start;
    let mut has_dot = false;
    let mut has_hyphen = false;

    loop {
        let next = last + 1;
        let Some(token) = tokens.get(next) else {
            break;
        };
        if is_connector(Some(token), depth) {
            match tokens.get(next + 1) {
                Some(name) if is_run_name(name, depth) => {
                    has_dot |= token.text == ".";
                    has_hyphen |= token.text == "-";
                    last = next + 1;
                }
                _ => break,
            }
        } else if token.kind == TokenKind::Word
            && tokens[last].kind == TokenKind::Word
            && is_run_name(token, depth)
        {
            last = next;
        } else {
            break;
        }
    }

    let run = &tokens[start..=last];
    let has_ent_prefix = run.len() >= 3 && run[0].is_word(ENT_PREFIX) && run[1].is_symbol(".");
    let names = if has_ent_prefix { &run[2..] } else { run };
    let name_tokens: Vec<&Token> = names.iter().filter(|t| t.is_name()).collect();

    let start_offset = first.start;
    let end_offset = tokens[last].end;
    Some((
        FromJoinTarget {
            clause,
            start: start_offset,
            end: end_offset,
            raw_text: sql[start_offset..end_offset].to_string(),
            word_count: name_tokens.len(),
            has_hyphen,
            has_dot,
            has_ent_prefix,
            is_bracketed: name_tokens.len() == 1 && name_tokens[0].kind == TokenKind::Bracket,
            is_subquery: false,
        },
        last + 1,
    ))
}

/// Index just past the `)` closing the `(` at `open`, or the end of input.
fn matching_close(tokens: &[Token], open: usize, depth: usize) -> usize {
    tokens
        .iter()
        .enumerate()
        .skip(open + 1)
        .find(|(_, t)| t.depth == depth && t.is_symbol(")"))
        .map_or(tokens.len(), |(index, _)| index + 1)
}

/// Skips an optional `[AS] alias` and `WITH (hints)` after a target.
fn skip_alias(tokens: &[Token], mut cursor: usize, depth: usize) -> usize {
    if tokens.get(cursor).is_some_and(|t| t.is_word("AS")) {
        cursor += 1;
    }
    if tokens
        .get(cursor)
        .is_some_and(|t| is_run_name(t, depth))
    {
        cursor += 1;
    }
    if tokens.get(cursor).is_some_and(|t| t.is_word("WITH"))
        && tokens.get(cursor + 1).is_some_and(|t| t.is_symbol("("))
    {
        cursor = matching_close(tokens, cursor + 1, depth);
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(targets: &[FromJoinTarget]) -> Vec<&str> {
        targets.iter().map(|t| t.raw_text.as_str()).collect()
    }

    #[test]
    fn extracts_multi_word_run() {
        let targets = extract_targets("SELECT * FROM My Data Extension WHERE x = 1");
        assert_eq!(raw(&targets), vec!["My Data Extension"]);
        let target = &targets[0];
        assert_eq!(target.clause, ClauseKeyword::From);
        assert_eq!(target.word_count, 3);
        assert_eq!((target.start, target.end), (14, 31));
        assert!(!target.is_bracketed);
        assert!(!target.has_ent_prefix);
    }

    #[test]
    fn bracketed_target_stops_before_alias() {
        let targets = extract_targets("SELECT * FROM [A] a JOIN [B] b ON a.id = b.id");
        assert_eq!(raw(&targets), vec!["[A]", "[B]"]);
        assert!(targets.iter().all(|t| t.is_bracketed));
        assert_eq!(targets[1].clause, ClauseKeyword::Join);
    }

    #[test]
    fn ent_prefix_is_flagged_and_excluded_from_word_count() {
        let targets = extract_targets("SELECT * FROM ENT.[Shared Contacts] s");
        let target = &targets[0];
        assert_eq!(target.raw_text, "ENT.[Shared Contacts]");
        assert!(target.has_ent_prefix);
        assert!(target.is_bracketed);
        assert_eq!(target.word_count, 1);
        assert_eq!(target.unprefixed_text(), "[Shared Contacts]");

        let targets = extract_targets("SELECT * FROM ent.My Shared DE");
        let target = &targets[0];
        assert!(target.has_ent_prefix);
        assert!(!target.is_bracketed);
        assert_eq!(target.word_count, 3);
    }

    #[test]
    fn subquery_target_has_no_words_and_inner_targets_follow() {
        let targets = extract_targets("SELECT * FROM (SELECT id FROM Orders) o JOIN Lines l ON 1 = 1");
        assert_eq!(raw(&targets), vec!["(", "Orders", "Lines l"]);
        assert!(targets[0].is_subquery);
        assert_eq!(targets[0].word_count, 0);
        assert_eq!(targets[1].clause, ClauseKeyword::From);
    }

    #[test]
    fn hyphens_and_dots_are_recorded() {
        let targets = extract_targets("SELECT * FROM My-Data.Set");
        let target = &targets[0];
        assert_eq!(target.raw_text, "My-Data.Set");
        assert!(target.has_hyphen);
        assert!(target.has_dot);
        assert_eq!(target.word_count, 3);
    }

    #[test]
    fn comma_joined_targets_are_all_reported() {
        let targets = extract_targets("SELECT * FROM A a, [B] AS b, C WHERE 1 = 1");
        assert_eq!(raw(&targets), vec!["A a", "[B]", "C"]);
    }

    #[test]
    fn keywords_inside_strings_do_not_start_targets() {
        assert!(extract_targets("SELECT 'FROM nothing' AS x").is_empty());
    }

    #[test]
    fn dangling_from_yields_no_target() {
        assert!(extract_targets("SELECT * FROM").is_empty());
        assert!(extract_targets("SELECT * FROM WHERE").is_empty());
    }

    #[test]
    fn targets_do_not_overlap() {
        let targets =
            extract_targets("SELECT * FROM a JOIN (SELECT * FROM b JOIN c ON 1=1) d ON 1=1, e");
        for pair in targets.windows(2) {
            assert!(pair[0].end <= pair[1].start, "{pair:?}");
        }
    }
}
