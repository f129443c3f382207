//! Quote, comment and bracket state machine shared by the scanner and the
//! character-span classifiers.
//!
//! The machine splits source text into contiguous segments. Every byte of the
//! input belongs to exactly one segment, so callers can stop as soon as a
//! segment reaches the offset they care about.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentKind {
    Whitespace,
    Word,
    Symbol,
    /// `[bracketed]` or `"double-quoted"` identifier.
    QuotedIdentifier,
    /// `'string'` or `N'string'` literal.
    String,
    LineComment,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    pub kind: SegmentKind,
    pub start: usize,
    pub end: usize,
    /// False when a quote, bracket or block comment runs to end of input.
    pub terminated: bool,
}

impl Segment {
    /// Returns true when `offset` sits inside the segment's body, i.e. a
    /// character typed there would become part of it.
    pub fn encloses(&self, offset: usize) -> bool {
        if offset <= self.start {
            return false;
        }
        match self.kind {
            // A line comment extends up to, but not over, its newline.
            SegmentKind::LineComment => offset <= self.end,
            _ if !self.terminated => offset <= self.end,
            _ => offset < self.end,
        }
    }

    pub fn is_significant(&self) -> bool {
        !matches!(
            self.kind,
            SegmentKind::Whitespace | SegmentKind::LineComment | SegmentKind::BlockComment
        )
    }
}

pub(crate) fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '@' | '#' | '$')
}

const TWO_CHAR_OPERATORS: [&str; 4] = ["<>", "!=", "<=", ">="];

pub(crate) struct Segments<'a> {
    sql: &'a str,
    pos: usize,
}

impl<'a> Segments<'a> {
    pub fn new(sql: &'a str) -> Self {
        Self { sql, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.sql[self.pos..]
    }

    /// Finds the closing `quote` starting at byte `from`, treating a doubled
    /// quote as an escaped one. Returns the offset just past the close.
    fn find_close(&self, from: usize, quote: u8) -> Option<usize> {
        let bytes = self.sql.as_bytes();
        let mut i = from;
        while i < bytes.len() {
            if bytes[i] == quote {
                if bytes.get(i + 1) == Some(&quote) {
                    i += 2;
                    continue;
                }
                return Some(i + 1);
            }
            i += 1;
        }
        None
    }

    fn quoted(&self, start: usize, body_start: usize, quote: u8, kind: SegmentKind) -> Segment {
        match self.find_close(body_start, quote) {
            Some(end) => Segment {
                kind,
                start,
                end,
                terminated: true,
            },
            None => Segment {
                kind,
                start,
                end: self.sql.len(),
                terminated: false,
            },
        }
    }
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let rest = self.rest();
        let ch = rest.chars().next()?;
        let start = self.pos;

        let segment = if ch.is_whitespace() {
            let len = rest
                .char_indices()
                .find(|(_, c)| !c.is_whitespace())
                .map_or(rest.len(), |(i, _)| i);
            Segment {
                kind: SegmentKind::Whitespace,
                start,
                end: start + len,
                terminated: true,
            }
        } else if rest.starts_with("--") {
            match rest.find('\n') {
                Some(newline) => Segment {
                    kind: SegmentKind::LineComment,
                    start,
                    end: start + newline,
                    terminated: true,
                },
                None => Segment {
                    kind: SegmentKind::LineComment,
                    start,
                    end: self.sql.len(),
                    terminated: false,
                },
            }
        } else if rest.starts_with("/*") {
            match rest[2..].find("*/") {
                Some(close) => Segment {
                    kind: SegmentKind::BlockComment,
                    start,
                    end: start + 2 + close + 2,
                    terminated: true,
                },
                None => Segment {
                    kind: SegmentKind::BlockComment,
                    start,
                    end: self.sql.len(),
                    terminated: false,
                },
            }
        } else if ch == '\'' {
            self.quoted(start, start + 1, b'\'', SegmentKind::String)
        } else if matches!(ch, 'N' | 'n') && rest[1..].starts_with('\'') {
            self.quoted(start, start + 2, b'\'', SegmentKind::String)
        } else if ch == '[' {
            self.quoted(start, start + 1, b']', SegmentKind::QuotedIdentifier)
        } else if ch == '"' {
            self.quoted(start, start + 1, b'"', SegmentKind::QuotedIdentifier)
        } else if is_word_char(ch) {
            let len = rest
                .char_indices()
                .find(|(_, c)| !is_word_char(*c))
                .map_or(rest.len(), |(i, _)| i);
            Segment {
                kind: SegmentKind::Word,
                start,
                end: start + len,
                terminated: true,
            }
        } else {
            let len = if TWO_CHAR_OPERATORS.iter().any(|op| rest.starts_with(op)) {
                2
            } else {
                ch.len_utf8()
            };
            Segment {
                kind: SegmentKind::Symbol,
                start,
                end: start + len,
                terminated: true,
            }
        };

        self.pos = segment.end;
        Some(segment)
    }
}
