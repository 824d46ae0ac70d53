// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::boxed::Box;
use alloc::string::String;

/// Error returned by a key's encoder or decoder.
///
/// The boxed value is surfaced unchanged as the source of
/// [`Error::AttributeCodec`], so callers can downcast it back to their own type.
pub type CodecError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Errors produced by archiving and conversion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The archive does not have the expected structure.
    #[error("malformed archive: {0}")]
    MalformedArchive(String),

    /// A key's own encoder or decoder failed.
    #[error("attribute `{key}` failed to encode or decode")]
    AttributeCodec {
        /// Name of the attribute whose codec failed.
        key: &'static str,
        /// The error raised by the codec.
        #[source]
        source: CodecError,
    },

    /// A value could not be converted to or from its foreign form.
    #[error("attribute `{key}` could not be converted")]
    Conversion {
        /// Name of the attribute that failed to convert.
        key: String,
        /// Details from the key's conversion function.
        #[source]
        source: ConversionError,
    },

    /// Foreign spans do not exactly tile their text.
    #[error("foreign spans do not cover the text: {0}")]
    InvalidSpans(String),

    /// A raw offset range was rejected.
    #[error(transparent)]
    Range(#[from] RangeError),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        log::debug!("rejecting archive: {reason}");
        Self::MalformedArchive(reason)
    }
}

/// Failure to map a value between its native and foreign forms.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConversionError {
    message: String,
}

impl ConversionError {
    /// Create a conversion error with a human readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message this error was created with.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A UTF-8 offset range that does not describe a slice of the text.
///
/// Returned by [`index_at_utf8_offset`] and [`range_from_utf8`].
///
/// [`index_at_utf8_offset`]: crate::AttributedString::index_at_utf8_offset
/// [`range_from_utf8`]: crate::AttributedString::range_from_utf8
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {start}..{end} in {len} bytes")]
pub struct RangeError {
    kind: RangeErrorKind,
    start: usize,
    end: usize,
    len: usize,
    boundary: Option<BoundaryInfo>,
}

#[expect(
    clippy::len_without_is_empty,
    reason = "`len` is the length of the text that was checked, not of the error."
)]
impl RangeError {
    /// Why the range was rejected.
    pub fn kind(&self) -> RangeErrorKind {
        self.kind
    }

    /// The requested start offset.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The requested end offset.
    pub fn end(&self) -> usize {
        self.end
    }

    /// The byte length of the text the range was checked against.
    pub fn len(&self) -> usize {
        self.len
    }

    /// The character an endpoint fell inside, for [`RangeErrorKind::NotOnCharBoundary`].
    pub fn boundary(&self) -> Option<BoundaryInfo> {
        self.boundary
    }

    fn new(kind: RangeErrorKind, range: (usize, usize), len: usize) -> Self {
        Self {
            kind,
            start: range.0,
            end: range.1,
            len,
            boundary: None,
        }
    }

    pub(crate) fn invalid_bounds(start: usize, end: usize, len: usize) -> Self {
        Self::new(RangeErrorKind::InvalidBounds, (start, end), len)
    }

    pub(crate) fn invalid_range(start: usize, end: usize, len: usize) -> Self {
        Self::new(RangeErrorKind::InvalidRange, (start, end), len)
    }

    pub(crate) fn not_on_char_boundary(
        text: &str,
        start: usize,
        end: usize,
        which: Endpoint,
        index: usize,
    ) -> Self {
        let character = enclosing_character(text, index);
        Self {
            boundary: Some(BoundaryInfo {
                which,
                index,
                char_start: character.start,
                char_end: character.end,
            }),
            ..Self::new(RangeErrorKind::NotOnCharBoundary, (start, end), text.len())
        }
    }
}

/// Why a [`RangeError`] was raised.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RangeErrorKind {
    /// The range reaches past the end of the text.
    #[error("range past the end of the text")]
    InvalidBounds,

    /// The range starts after it ends.
    #[error("range starts after it ends")]
    InvalidRange,

    /// An endpoint falls inside a multi-byte character.
    #[error("range endpoint inside a character")]
    NotOnCharBoundary,
}

/// The endpoint of a range that was checked.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// `range.start`.
    Start,
    /// `range.end`.
    End,
}

/// Where a misaligned endpoint landed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoundaryInfo {
    /// The misaligned endpoint.
    pub which: Endpoint,
    /// Its offset.
    pub index: usize,
    /// Offset of the first byte of the character it falls inside.
    pub char_start: usize,
    /// Offset just past that character.
    pub char_end: usize,
}

/// The byte range of the character containing `index`.
fn enclosing_character(text: &str, index: usize) -> core::ops::Range<usize> {
    if index > text.len() || text.is_char_boundary(index) {
        return index..index;
    }
    let start = text[..index]
        .char_indices()
        .next_back()
        .map_or(0, |(offset, _)| offset);
    let end = text[start..]
        .chars()
        .next()
        .map_or(text.len(), |c| start + c.len_utf8());
    start..end
}
