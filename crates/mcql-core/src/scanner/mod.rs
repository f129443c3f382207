//! Lexical scanner.
//!
//! Converts raw SQL into a position-tagged token stream. Scanning is a total
//! function of its input: unterminated quotes, brackets and comments are
//! consumed to end of input instead of failing, because the editor lints
//! half-typed queries on every keystroke.

pub mod classify;
pub(crate) mod segments;

use std::ops::Range;

use serde::Serialize;

use segments::{SegmentKind, Segments};

/// Lexical class of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    /// Keyword, identifier, number or variable.
    Word,
    /// Punctuation or operator.
    Symbol,
    /// `[bracketed]` or `"double-quoted"` identifier, delimiters included.
    Bracket,
}

/// A scanned token. String literals and comments never produce tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Parenthesis nesting depth. An opening `(` carries the depth outside
    /// it; a closing `)` carries the restored outer depth.
    pub depth: usize,
}

impl Token {
    /// Case-insensitive keyword comparison for word tokens.
    pub fn is_word(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(keyword)
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }

    /// Word or bracketed identifier.
    pub fn is_name(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::Bracket)
    }
}

/// Scans `sql` into tokens in source order.
pub fn scan(sql: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;

    for segment in Segments::new(sql) {
        let kind = match segment.kind {
            SegmentKind::Word => TokenKind::Word,
            SegmentKind::Symbol => TokenKind::Symbol,
            SegmentKind::QuotedIdentifier => TokenKind::Bracket,
            SegmentKind::Whitespace
            | SegmentKind::String
            | SegmentKind::LineComment
            | SegmentKind::BlockComment => continue,
        };
        let text = &sql[segment.start..segment.end];

        let token_depth = match (kind, text) {
            (TokenKind::Symbol, "(") => {
                depth += 1;
                depth - 1
            }
            (TokenKind::Symbol, ")") => {
                depth = depth.saturating_sub(1);
                depth
            }
            _ => depth,
        };

        tokens.push(Token {
            kind,
            text: text.to_string(),
            start: segment.start,
            end: segment.end,
            depth: token_depth,
        });
    }

    tokens
}

/// Splits `sql` on top-level `;` into statement ranges.
///
/// Each range runs from the first to the last significant character of the
/// statement (whitespace and comments at either edge are excluded). Empty
/// statements are skipped, matching how the dialect parser treats repeated
/// semicolons.
pub fn split_statements(sql: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut depth = 0usize;
    let mut current: Option<Range<usize>> = None;

    for segment in Segments::new(sql) {
        if !segment.is_significant() {
            continue;
        }
        if segment.kind == SegmentKind::Symbol {
            match &sql[segment.start..segment.end] {
                "(" => depth += 1,
                ")" => depth = depth.saturating_sub(1),
                ";" if depth == 0 => {
                    ranges.extend(current.take());
                    continue;
                }
                _ => {}
            }
        }
        match current.as_mut() {
            Some(range) => range.end = segment.end,
            None => current = Some(segment.start..segment.end),
        }
    }

    ranges.extend(current);
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn scans_words_symbols_and_brackets() {
        let tokens = scan("SELECT a.[My Field] FROM ENT.Contacts");
        assert_eq!(
            texts(&tokens),
            vec!["SELECT", "a", ".", "[My Field]", "FROM", "ENT", ".", "Contacts"]
        );
        assert_eq!(tokens[3].kind, TokenKind::Bracket);
        assert_eq!(tokens[3].start, 9);
        assert_eq!(tokens[3].end, 19);
    }

    #[test]
    fn strings_and_comments_produce_no_tokens() {
        let tokens = scan("SELECT 'FROM x' -- FROM y\n/* JOIN z */ 1");
        assert_eq!(texts(&tokens), vec!["SELECT", "1"]);
    }

    #[test]
    fn keywords_inside_escaped_strings_are_suppressed() {
        let tokens = scan("SELECT 'it''s FROM' FROM t");
        assert_eq!(texts(&tokens), vec!["SELECT", "FROM", "t"]);
    }

    #[test]
    fn tracks_parenthesis_depth() {
        let tokens = scan("SELECT (a + (b)) c");
        let depths: Vec<(&str, usize)> = tokens.iter().map(|t| (t.text.as_str(), t.depth)).collect();
        assert_eq!(
            depths,
            vec![
                ("SELECT", 0),
                ("(", 0),
                ("a", 1),
                ("+", 1),
                ("(", 1),
                ("b", 2),
                (")", 1),
                (")", 0),
                ("c", 0),
            ]
        );
    }

    #[test]
    fn unbalanced_close_paren_never_goes_negative() {
        let tokens = scan(") ) a");
        assert!(tokens.iter().all(|t| t.depth == 0));
    }

    #[test]
    fn unterminated_bracket_is_one_token() {
        let tokens = scan("SELECT * FROM [My Data");
        assert_eq!(tokens.last().unwrap().text, "[My Data");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Bracket);
    }

    #[test]
    fn split_statements_ignores_semicolons_in_strings_and_parens() {
        let sql = "SELECT ';' FROM a; SELECT 2 ;; -- done";
        let ranges = split_statements(sql);
        assert_eq!(ranges.len(), 2);
        assert_eq!(&sql[ranges[0].clone()], "SELECT ';' FROM a");
        assert_eq!(&sql[ranges[1].clone()], "SELECT 2");
    }

    #[test]
    fn split_statements_of_blank_input_is_empty() {
        assert!(split_statements("   \n -- nothing").is_empty());
    }
}
