// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positions in the text buffer and the unit conversions around them.

use core::ops::Range;
use core::sync::atomic::{AtomicUsize, Ordering};

use unicode_segmentation::GraphemeCursor;

use crate::{Endpoint, RangeError};

static NEXT_VERSION: AtomicUsize = AtomicUsize::new(1);

/// A fresh version number for text that has just been created or edited.
pub(crate) fn next_version() -> usize {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// A position in the text of an attributed string.
///
/// An index is tied to the text it was produced from: editing the text (not just its
/// attributes) invalidates every index previously taken from it, and using a stale or
/// foreign index panics.
///
/// Indices of the same text order by their UTF-8 offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index {
    offset: usize,
    version: usize,
}

impl Index {
    pub(crate) const fn new(offset: usize, version: usize) -> Self {
        Self { offset, version }
    }

    /// The UTF-8 byte offset of this position from the start of the whole string.
    #[must_use]
    pub const fn utf8_offset(self) -> usize {
        self.offset
    }

    pub(crate) const fn version(self) -> usize {
        self.version
    }
}

/// The first grapheme boundary in `text` after `offset`.
pub(crate) fn next_grapheme(text: &str, offset: usize) -> Option<usize> {
    if offset >= text.len() {
        return None;
    }
    let mut cursor = GraphemeCursor::new(offset, text.len(), true);
    cursor.next_boundary(text, 0).ok().flatten()
}

/// The last grapheme boundary in `text` before `offset`.
pub(crate) fn prev_grapheme(text: &str, offset: usize) -> Option<usize> {
    if offset == 0 {
        return None;
    }
    let mut cursor = GraphemeCursor::new(offset, text.len(), true);
    cursor.prev_boundary(text, 0).ok().flatten()
}

pub(crate) fn is_grapheme_boundary(text: &str, offset: usize) -> bool {
    let mut cursor = GraphemeCursor::new(offset, text.len(), true);
    cursor.is_boundary(text, 0).unwrap_or(false)
}

/// The offset just past the scalar starting at `offset`.
pub(crate) fn next_scalar(text: &str, offset: usize) -> Option<usize> {
    let c = text.get(offset..)?.chars().next()?;
    Some(offset + c.len_utf8())
}

/// The offset of the scalar ending at `offset`.
pub(crate) fn prev_scalar(text: &str, offset: usize) -> Option<usize> {
    let c = text.get(..offset)?.chars().next_back()?;
    Some(offset - c.len_utf8())
}

/// The number of UTF-16 code units needed to encode `text`.
pub(crate) fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Maps increasing UTF-16 offsets of a text to UTF-8 offsets in one forward walk.
#[derive(Clone, Debug)]
pub(crate) struct Utf16Cursor<'a> {
    text: &'a str,
    utf8: usize,
    utf16: usize,
}

impl<'a> Utf16Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            utf8: 0,
            utf16: 0,
        }
    }

    /// Move forward to `utf16` and return the matching UTF-8 offset.
    ///
    /// Returns `None` for offsets behind the cursor, past the end, or inside a surrogate
    /// pair. The cursor is left somewhere past `utf16` in the last two cases.
    pub(crate) fn advance_to(&mut self, utf16: usize) -> Option<usize> {
        if utf16 < self.utf16 {
            return None;
        }
        let mut chars = self.text[self.utf8..].chars();
        while self.utf16 < utf16 {
            let c = chars.next()?;
            self.utf8 += c.len_utf8();
            self.utf16 += c.len_utf16();
        }
        (self.utf16 == utf16).then_some(self.utf8)
    }
}

/// Check that `range` is ordered, in bounds and on UTF-8 boundaries of `text`.
pub(crate) fn validate_range(text: &str, range: &Range<usize>) -> Result<(), RangeError> {
    let len = text.len();
    if range.start > range.end {
        return Err(RangeError::invalid_range(range.start, range.end, len));
    }
    if range.end > len {
        return Err(RangeError::invalid_bounds(range.start, range.end, len));
    }
    if !text.is_char_boundary(range.start) {
        return Err(RangeError::not_on_char_boundary(
            text,
            range.start,
            range.end,
            Endpoint::Start,
            range.start,
        ));
    }
    if !text.is_char_boundary(range.end) {
        return Err(RangeError::not_on_char_boundary(
            text,
            range.start,
            range.end,
            Endpoint::End,
            range.end,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        Utf16Cursor, next_grapheme, next_scalar, prev_grapheme, prev_scalar, utf16_len,
        validate_range,
    };
    use crate::{Endpoint, RangeErrorKind};

    #[test]
    fn validates_ok_ranges() {
        let t = "Hello!";
        assert!(validate_range(t, &(0..0)).is_ok());
        assert!(validate_range(t, &(0..6)).is_ok());
        assert!(validate_range(t, &(6..6)).is_ok());
    }

    #[test]
    #[expect(
        clippy::reversed_empty_ranges,
        reason = "We want an invalid range for testing."
    )]
    fn rejects_start_greater_than_end() {
        let err = validate_range("Hello!", &(4..3)).unwrap_err();
        assert_eq!(err.kind(), RangeErrorKind::InvalidRange);
        assert_eq!((err.start(), err.end()), (4, 3));
        assert_eq!(format!("{err}"), "range starts after it ends: 4..3 in 6 bytes");
    }

    #[test]
    fn rejects_out_of_bounds() {
        let err = validate_range("Hello!", &(0..7)).unwrap_err();
        assert_eq!(err.kind(), RangeErrorKind::InvalidBounds);
        assert_eq!(err.len(), 6);
    }

    #[test]
    fn reports_enclosing_char_span() {
        // "é" is two bytes, starting at offset 1.
        let err = validate_range("aé", &(0..2)).unwrap_err();
        assert_eq!(err.kind(), RangeErrorKind::NotOnCharBoundary);
        let boundary = err.boundary().unwrap();
        assert_eq!(boundary.which, Endpoint::End);
        assert_eq!((boundary.char_start, boundary.char_end), (1, 3));
    }

    #[test]
    fn grapheme_steps_over_clusters() {
        // "e" + combining acute, then a flag made of two regional indicators.
        let text = "ae\u{301}\u{1F1FA}\u{1F1F8}";
        assert_eq!(next_grapheme(text, 0), Some(1));
        assert_eq!(next_grapheme(text, 1), Some(4));
        assert_eq!(next_grapheme(text, 4), Some(text.len()));
        assert_eq!(next_grapheme(text, text.len()), None);
        assert_eq!(prev_grapheme(text, text.len()), Some(4));
        assert_eq!(prev_grapheme(text, 4), Some(1));
        assert_eq!(prev_grapheme(text, 0), None);
    }

    #[test]
    fn scalar_steps() {
        let text = "e\u{301}";
        assert_eq!(next_scalar(text, 0), Some(1));
        assert_eq!(next_scalar(text, 1), Some(3));
        assert_eq!(next_scalar(text, 3), None);
        assert_eq!(prev_scalar(text, 3), Some(1));
        assert_eq!(prev_scalar(text, 0), None);
    }

    #[test]
    fn utf16_offsets() {
        let text = "a\u{1F600}b";
        assert_eq!(utf16_len(text), 4);
        let at = |utf16| Utf16Cursor::new(text).advance_to(utf16);
        assert_eq!(at(0), Some(0));
        assert_eq!(at(1), Some(1));
        assert_eq!(at(2), None);
        assert_eq!(at(3), Some(5));
        assert_eq!(at(4), Some(6));
        assert_eq!(at(5), None);
    }

    #[test]
    fn utf16_cursor_walks_forward() {
        let mut cursor = Utf16Cursor::new("a\u{1F600}b\u{e9}");
        assert_eq!(cursor.advance_to(1), Some(1));
        assert_eq!(cursor.advance_to(1), Some(1));
        assert_eq!(cursor.advance_to(3), Some(5));
        assert_eq!(cursor.advance_to(0), None);
        assert_eq!(cursor.advance_to(5), Some(8));
        assert_eq!(cursor.advance_to(6), None);
    }
}
