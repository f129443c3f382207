//! UTF-8 ↔ UTF-16 offset conversion for the wire boundary.
//!
//! Editors hosted in a browser index strings in UTF-16 code units, while the
//! engine works in UTF-8 byte offsets. Conversion happens once, where
//! requests come in and diagnostics go out.

use crate::types::Diagnostic;

/// An offset that does not address a position in the text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OffsetError {
    #[error("offset {offset} exceeds string length {len}")]
    OutOfBounds { offset: usize, len: usize },

    #[error("UTF-8 offset {0} does not land on a character boundary")]
    NotCharBoundary(usize),
}

/// Converts a UTF-16 code unit offset to a UTF-8 byte offset.
///
/// An offset that splits a surrogate pair resolves to the start of that
/// character.
pub fn utf16_to_utf8_offset(sql: &str, utf16_offset: usize) -> Result<usize, OffsetError> {
    let mut utf16_count = 0;

    for (byte_offset, ch) in sql.char_indices() {
        let next = utf16_count + ch.len_utf16();
        if utf16_offset < next {
            return Ok(byte_offset);
        }
        utf16_count = next;
    }

    if utf16_count == utf16_offset {
        return Ok(sql.len());
    }

    Err(OffsetError::OutOfBounds {
        offset: utf16_offset,
        len: utf16_count,
    })
}

/// Like [`utf16_to_utf8_offset`], but clamps offsets past the end to the
/// end of the text.
pub fn utf16_to_utf8_offset_clamped(sql: &str, utf16_offset: usize) -> usize {
    utf16_to_utf8_offset(sql, utf16_offset).unwrap_or(sql.len())
}

/// Converts a UTF-8 byte offset to a UTF-16 code unit offset.
pub fn utf8_to_utf16_offset(sql: &str, utf8_offset: usize) -> Result<usize, OffsetError> {
    if utf8_offset > sql.len() {
        return Err(OffsetError::OutOfBounds {
            offset: utf8_offset,
            len: sql.len(),
        });
    }
    if !sql.is_char_boundary(utf8_offset) {
        return Err(OffsetError::NotCharBoundary(utf8_offset));
    }

    Ok(sql[..utf8_offset].chars().map(char::len_utf16).sum())
}

/// Rewrites diagnostic offsets from UTF-8 bytes to UTF-16 code units.
///
/// Offsets that cannot be converted are left unchanged.
pub fn diagnostics_to_utf16(sql: &str, diagnostics: &mut [Diagnostic]) {
    if sql.is_ascii() {
        return;
    }
    for diagnostic in diagnostics {
        if let Ok(start) = utf8_to_utf16_offset(sql, diagnostic.start_index) {
            diagnostic.start_index = start;
        }
        if let Ok(end) = utf8_to_utf16_offset(sql, diagnostic.end_index) {
            diagnostic.end_index = end;
        }
    }
}
