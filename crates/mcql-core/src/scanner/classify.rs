//! Character-span classifiers.
//!
//! Each predicate replays the scanner's state machine from offset 0 up to the
//! query offset and answers a single question about the cursor, without
//! building a token vector. Escape handling is shared with [`super::scan`], so
//! a classifier and the scanner can never disagree about where a string,
//! comment or bracketed identifier ends.

use super::segments::{Segment, SegmentKind, Segments};

const COMPARISON_OPERATORS: [&str; 7] = ["=", "<", ">", "<>", "!=", "<=", ">="];

/// Words that may be followed by `(` without starting a function call.
const NON_FUNCTION_KEYWORDS: &[&str] = &[
    "all", "and", "any", "as", "by", "case", "else", "exists", "from", "having", "in", "into",
    "join", "not", "on", "or", "over", "select", "some", "then", "union", "values", "when",
    "where", "with",
];

/// Clamps `offset` into `sql` and down to a character boundary.
pub(crate) fn clamp_offset(sql: &str, offset: usize) -> usize {
    let mut offset = offset.min(sql.len());
    while !sql.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Returns the segment whose body encloses `offset`, if any.
fn enclosing_segment(sql: &str, offset: usize) -> Option<Segment> {
    let offset = clamp_offset(sql, offset);
    Segments::new(sql)
        .take_while(|segment| segment.start < offset)
        .last()
        .filter(|segment| segment.encloses(offset))
}

fn enclosed_by(sql: &str, offset: usize, kinds: &[SegmentKind]) -> bool {
    enclosing_segment(sql, offset).is_some_and(|segment| kinds.contains(&segment.kind))
}

/// True when `offset` is inside a single-quoted string literal.
pub fn is_inside_string(sql: &str, offset: usize) -> bool {
    enclosed_by(sql, offset, &[SegmentKind::String])
}

/// True when `offset` is inside a `--` or `/* */` comment.
pub fn is_inside_comment(sql: &str, offset: usize) -> bool {
    enclosed_by(
        sql,
        offset,
        &[SegmentKind::LineComment, SegmentKind::BlockComment],
    )
}

/// True when `offset` is inside a `[bracketed]` or `"quoted"` identifier.
pub fn is_inside_brackets(sql: &str, offset: usize) -> bool {
    enclosed_by(sql, offset, &[SegmentKind::QuotedIdentifier])
}

/// True when `offset` is inside any literal, comment or quoted identifier.
pub fn is_inside_literal_or_comment(sql: &str, offset: usize) -> bool {
    enclosing_segment(sql, offset).is_some_and(|segment| {
        matches!(
            segment.kind,
            SegmentKind::String
                | SegmentKind::QuotedIdentifier
                | SegmentKind::LineComment
                | SegmentKind::BlockComment
        )
    })
}

/// True when the innermost open parenthesis before `offset` belongs to a
/// function call such as `DATEADD(`.
pub fn is_inside_function_parens(sql: &str, offset: usize) -> bool {
    let offset = clamp_offset(sql, offset);
    let mut open_parens: Vec<bool> = Vec::new();
    let mut previous: Option<Segment> = None;

    for segment in Segments::new(sql).take_while(|segment| segment.end <= offset) {
        if !segment.is_significant() {
            continue;
        }
        if segment.kind == SegmentKind::Symbol {
            match &sql[segment.start..segment.end] {
                "(" => {
                    let is_call = previous.is_some_and(|prev| {
                        prev.kind == SegmentKind::Word
                            && !NON_FUNCTION_KEYWORDS
                                .iter()
                                .any(|kw| sql[prev.start..prev.end].eq_ignore_ascii_case(kw))
                    });
                    open_parens.push(is_call);
                }
                ")" => {
                    open_parens.pop();
                }
                _ => {}
            }
        }
        previous = Some(segment);
    }

    open_parens.last().copied().unwrap_or(false)
}

/// True when the last significant token before the cursor (ignoring a
/// partially typed word) is a comparison operator.
pub fn is_after_comparison_operator(sql: &str, offset: usize) -> bool {
    let offset = clamp_offset(sql, offset);
    let mut before: Vec<Segment> = Segments::new(sql)
        .take_while(|segment| segment.end <= offset)
        .filter(Segment::is_significant)
        .collect();

    if before
        .last()
        .is_some_and(|last| last.kind == SegmentKind::Word && last.end == offset)
    {
        before.pop();
    }

    before.last().is_some_and(|last| {
        last.kind == SegmentKind::Symbol
            && COMPARISON_OPERATORS.contains(&&sql[last.start..last.end])
    })
}
