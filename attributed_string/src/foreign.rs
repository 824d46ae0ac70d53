// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The legacy attributed-text model used by host frameworks.
//!
//! Text is addressed in UTF-16 code units, and attributes are dictionaries keyed by
//! name. A [`ForeignAttributedString`] keeps its spans tiling the text with no two
//! neighbors carrying equal dictionaries, like the native run list does.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

use crate::run_list::{RunEdit, RunList, StoredRun};
use crate::text::{Utf16Cursor, utf16_len};
use crate::{AttributeValue, ConversionError, Error};

/// A value in a foreign attribute dictionary.
#[derive(Clone, Debug, PartialEq)]
pub enum ForeignValue {
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    String(String),
    /// An array of values.
    Array(Vec<ForeignValue>),
    /// A native value passed through untouched.
    Boxed(AttributeValue),
}

/// A foreign attribute dictionary.
pub type ForeignAttributes = BTreeMap<String, ForeignValue>;

/// Conversion between a key's value type and [`ForeignValue`].
pub struct ForeignCodec<V> {
    /// Convert a native value to its foreign form.
    pub to_foreign: fn(&V) -> Result<ForeignValue, ConversionError>,
    /// Convert a foreign value to the native type.
    pub from_foreign: fn(&ForeignValue) -> Result<V, ConversionError>,
}

impl<V> Clone for ForeignCodec<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for ForeignCodec<V> {}

impl<V> core::fmt::Debug for ForeignCodec<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ForeignCodec").finish_non_exhaustive()
    }
}

fn unexpected(expected: &str, found: &ForeignValue) -> ConversionError {
    ConversionError::new(format!("expected {expected}, found {found:?}"))
}

impl ForeignCodec<bool> {
    /// Booleans as [`ForeignValue::Bool`].
    pub fn boolean() -> Self {
        Self {
            to_foreign: |value| Ok(ForeignValue::Bool(*value)),
            from_foreign: |value| match value {
                ForeignValue::Bool(value) => Ok(*value),
                other => Err(unexpected("a boolean", other)),
            },
        }
    }
}

impl ForeignCodec<i64> {
    /// Integers as [`ForeignValue::Integer`].
    pub fn integer() -> Self {
        Self {
            to_foreign: |value| Ok(ForeignValue::Integer(*value)),
            from_foreign: |value| match value {
                ForeignValue::Integer(value) => Ok(*value),
                other => Err(unexpected("an integer", other)),
            },
        }
    }
}

impl ForeignCodec<f64> {
    /// Floats as [`ForeignValue::Float`]. Integers are widened on the way in.
    pub fn float() -> Self {
        Self {
            to_foreign: |value| Ok(ForeignValue::Float(*value)),
            from_foreign: |value| match value {
                ForeignValue::Float(value) => Ok(*value),
                ForeignValue::Integer(value) => Ok(*value as f64),
                other => Err(unexpected("a number", other)),
            },
        }
    }
}

impl ForeignCodec<String> {
    /// Strings as [`ForeignValue::String`].
    pub fn string() -> Self {
        Self {
            to_foreign: |value| Ok(ForeignValue::String(value.clone())),
            from_foreign: |value| match value {
                ForeignValue::String(value) => Ok(value.clone()),
                other => Err(unexpected("a string", other)),
            },
        }
    }
}

/// One span of a [`ForeignAttributedString`], in UTF-16 code units.
#[derive(Clone, Debug, PartialEq)]
pub struct ForeignSpan {
    /// Offset of the first code unit.
    pub location: usize,
    /// Number of code units.
    pub length: usize,
    /// The attributes of the span.
    pub attributes: ForeignAttributes,
}

impl ForeignSpan {
    /// The covered code units.
    pub fn range(&self) -> Range<usize> {
        self.location..self.location + self.length
    }
}

/// Text with name-keyed attribute dictionaries over UTF-16 spans.
#[derive(Clone, Debug, PartialEq)]
pub struct ForeignAttributedString {
    text: String,
    spans: RunList<ForeignAttributes>,
}

impl ForeignAttributedString {
    /// `text` with `attributes` over all of it.
    pub fn new(text: impl Into<String>, attributes: ForeignAttributes) -> Self {
        let text = text.into();
        let spans = RunList::single(utf16_len(&text), attributes);
        Self { text, spans }
    }

    /// Build from spans that tile `text` in order.
    ///
    /// Spans must be non-empty, contiguous, start at zero, cover the whole text, and
    /// never split a surrogate pair. Equal neighbors are merged.
    pub fn from_spans(
        text: impl Into<String>,
        spans: impl IntoIterator<Item = ForeignSpan>,
    ) -> Result<Self, Error> {
        let text = text.into();
        let mut expected = 0;
        let mut runs = Vec::new();
        let mut cursor = Utf16Cursor::new(&text);
        for span in spans {
            if span.location != expected {
                return Err(Error::InvalidSpans(format!(
                    "span at {} should start at {expected}",
                    span.location
                )));
            }
            if span.length == 0 {
                return Err(Error::InvalidSpans(format!(
                    "empty span at {}",
                    span.location
                )));
            }
            expected += span.length;
            if cursor.advance_to(expected).is_none() {
                return Err(Error::InvalidSpans(format!(
                    "span ending at {expected} does not end on a character of the text"
                )));
            }
            runs.push(StoredRun::new(span.length, span.attributes));
        }
        let len = utf16_len(&text);
        if expected != len {
            return Err(Error::InvalidSpans(format!(
                "spans cover {expected} of {len} code units"
            )));
        }
        Ok(Self {
            text,
            spans: RunList::from_runs(runs),
        })
    }

    /// The text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The length of the text in UTF-16 code units.
    pub fn len_utf16(&self) -> usize {
        self.spans.total_len()
    }

    /// The spans, in order.
    pub fn spans(&self) -> Vec<ForeignSpan> {
        (0..self.spans.count())
            .map(|block| {
                let range = self.spans.range_of(block);
                ForeignSpan {
                    location: range.start,
                    length: range.len(),
                    attributes: self.spans.run(block).attributes.clone(),
                }
            })
            .collect()
    }

    /// The attributes at `location` and the full range of the span holding them.
    pub fn attributes_at(&self, location: usize) -> Option<(&ForeignAttributes, Range<usize>)> {
        let block = self.spans.block_containing(location);
        (block < self.spans.count())
            .then(|| (&self.spans.run(block).attributes, self.spans.range_of(block)))
    }

    /// Replace the attributes over `range` with `attributes`.
    pub fn set_attributes(
        &mut self,
        range: Range<usize>,
        attributes: ForeignAttributes,
    ) -> Result<(), Error> {
        self.check_range(&range)?;
        if !range.is_empty() {
            let length = range.len();
            self.spans
                .replace_range(range, vec![StoredRun::new(length, attributes)]);
        }
        Ok(())
    }

    /// Store `value` under `name` over `range`.
    pub fn add_attribute(
        &mut self,
        range: Range<usize>,
        name: impl Into<String>,
        value: ForeignValue,
    ) -> Result<(), Error> {
        self.check_range(&range)?;
        let name = name.into();
        self.spans.edit_runs(range, |attributes| {
            attributes.insert(name.clone(), value.clone());
            RunEdit::Compare
        });
        Ok(())
    }

    /// Remove `name` over `range`.
    pub fn remove_attribute(&mut self, range: Range<usize>, name: &str) -> Result<(), Error> {
        self.check_range(&range)?;
        self.spans.edit_runs(range, |attributes| {
            if attributes.remove(name).is_some() {
                RunEdit::Modified
            } else {
                RunEdit::Unmodified
            }
        });
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), Error> {
        let len = self.len_utf16();
        if range.start > range.end || range.end > len {
            return Err(Error::InvalidSpans(format!(
                "range {range:?} out of bounds for {len} code units"
            )));
        }
        let mut cursor = Utf16Cursor::new(&self.text);
        if cursor.advance_to(range.start).is_none() || cursor.advance_to(range.end).is_none() {
            return Err(Error::InvalidSpans(format!(
                "range {range:?} splits a surrogate pair"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ForeignAttributedString, ForeignAttributes, ForeignSpan, ForeignValue};
    use crate::Error;
    use alloc::string::ToString;
    use alloc::vec;

    fn dict(name: &str, value: i64) -> ForeignAttributes {
        [(name.to_string(), ForeignValue::Integer(value))].into()
    }

    #[test]
    fn spans_must_tile_the_text() {
        let span = |location, length| ForeignSpan {
            location,
            length,
            attributes: dict("A", 1),
        };
        assert!(ForeignAttributedString::from_spans("abcd", vec![span(0, 2), span(2, 2)]).is_ok());
        for spans in [
            vec![span(0, 2)],
            vec![span(1, 3)],
            vec![span(0, 2), span(3, 1)],
            vec![span(0, 0), span(0, 4)],
            vec![span(0, 5)],
        ] {
            assert!(matches!(
                ForeignAttributedString::from_spans("abcd", spans),
                Err(Error::InvalidSpans(_))
            ));
        }
        // Ends inside the surrogate pair of the emoji.
        assert!(
            ForeignAttributedString::from_spans("\u{1F600}", vec![span(0, 1), span(1, 1)]).is_err()
        );
    }

    #[test]
    fn equal_neighbors_merge() {
        let spans = vec![
            ForeignSpan {
                location: 0,
                length: 2,
                attributes: dict("A", 1),
            },
            ForeignSpan {
                location: 2,
                length: 2,
                attributes: dict("A", 1),
            },
        ];
        let string = ForeignAttributedString::from_spans("abcd", spans).unwrap();
        assert_eq!(string.spans().len(), 1);
    }

    #[test]
    fn editing_attributes() {
        let mut string = ForeignAttributedString::new("hello", ForeignAttributes::new());
        string
            .add_attribute(1..3, "A", ForeignValue::Integer(1))
            .unwrap();
        let (attributes, range) = string.attributes_at(2).unwrap();
        assert_eq!(attributes, &dict("A", 1));
        assert_eq!(range, 1..3);
        string.remove_attribute(0..5, "A").unwrap();
        assert_eq!(string.spans().len(), 1);
        assert!(string.set_attributes(0..6, dict("A", 2)).is_err());
    }
}
