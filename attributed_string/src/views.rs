// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy views over the text and runs of an attributed string.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::Range;
use core::str::Chars;

use unicode_segmentation::{Graphemes, UnicodeSegmentation};

use crate::guts::Guts;
use crate::text::Index;
use crate::{AttributeKey, AttributeSet};

/// The extended grapheme clusters of a string, as string slices.
#[derive(Clone, Debug)]
pub struct Characters<'a> {
    inner: Graphemes<'a>,
}

impl<'a> Characters<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            inner: text.graphemes(true),
        }
    }
}

impl<'a> Iterator for Characters<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Characters<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl FusedIterator for Characters<'_> {}

/// The Unicode scalar values of a string.
#[derive(Clone, Debug)]
pub struct UnicodeScalars<'a> {
    inner: Chars<'a>,
}

impl<'a> UnicodeScalars<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            inner: text.chars(),
        }
    }
}

impl Iterator for UnicodeScalars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for UnicodeScalars<'_> {
    fn next_back(&mut self) -> Option<char> {
        self.inner.next_back()
    }
}

impl FusedIterator for UnicodeScalars<'_> {}

/// One run of an attributed string or substring.
///
/// Runs at the edges of a substring are clamped to it.
#[derive(Clone)]
pub struct Run<'a> {
    guts: &'a Guts,
    range: Range<usize>,
    attributes: &'a AttributeSet,
}

impl<'a> Run<'a> {
    /// The positions covered by this run.
    pub fn range(&self) -> Range<Index> {
        self.guts.index(self.range.start)..self.guts.index(self.range.end)
    }

    /// The covered UTF-8 byte offsets, from the start of the whole string.
    pub fn utf8_range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The text of this run.
    pub fn text(&self) -> &'a str {
        &self.guts.text()[self.range.clone()]
    }

    /// The attributes shared by the whole run.
    pub fn attributes(&self) -> &'a AttributeSet {
        self.attributes
    }

    /// The value of `K` over this run.
    pub fn get<K: AttributeKey>(&self) -> Option<&'a K::Value> {
        self.attributes.get::<K>()
    }
}

/// Runs are equal when they have the same length and attributes.
impl PartialEq for Run<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.range.len() == other.range.len() && self.attributes == other.attributes
    }
}

impl fmt::Debug for Run<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Run")
            .field("range", &self.range)
            .field("text", &self.text())
            .field("attributes", self.attributes)
            .finish()
    }
}

impl fmt::Display for Run<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.text(), self.attributes)
    }
}

/// The runs of an attributed string or substring, in order.
#[derive(Clone)]
pub struct Runs<'a> {
    guts: &'a Guts,
    range: Range<usize>,
    front: usize,
    back: usize,
}

impl<'a> Runs<'a> {
    pub(crate) fn new(guts: &'a Guts, range: Range<usize>) -> Self {
        let blocks = guts.runs().blocks_overlapping(&range);
        Self {
            guts,
            range,
            front: blocks.start,
            back: blocks.end,
        }
    }

    fn run(&self, block: usize) -> Run<'a> {
        let runs = self.guts.runs();
        let full = runs.range_of(block);
        Run {
            guts: self.guts,
            range: full.start.max(self.range.start)..full.end.min(self.range.end),
            attributes: &runs.run(block).attributes,
        }
    }

    fn slice<V: PartialEq>(&self, select: fn(&'a AttributeSet) -> V) -> AttributeRuns<'a, V> {
        AttributeRuns {
            guts: self.guts,
            range: self.range.clone(),
            front: self.front,
            back: self.back,
            select,
        }
    }

    /// The longest ranges over which `K` has a constant value.
    ///
    /// Neighboring runs that agree on `K` are reported as one range, whatever their
    /// other attributes.
    pub fn attribute<K: AttributeKey>(&self) -> AttributeRuns<'a, Option<&'a K::Value>> {
        self.slice(|attributes| attributes.get::<K>())
    }

    /// Like [`attribute`](Self::attribute), for the combination of two keys.
    pub fn attributes2<K1: AttributeKey, K2: AttributeKey>(
        &self,
    ) -> AttributeRuns<'a, (Option<&'a K1::Value>, Option<&'a K2::Value>)> {
        self.slice(|attributes| (attributes.get::<K1>(), attributes.get::<K2>()))
    }

    /// Like [`attribute`](Self::attribute), for the combination of three keys.
    pub fn attributes3<K1: AttributeKey, K2: AttributeKey, K3: AttributeKey>(
        &self,
    ) -> AttributeRuns<
        'a,
        (
            Option<&'a K1::Value>,
            Option<&'a K2::Value>,
            Option<&'a K3::Value>,
        ),
    > {
        self.slice(|attributes| {
            (
                attributes.get::<K1>(),
                attributes.get::<K2>(),
                attributes.get::<K3>(),
            )
        })
    }

    /// Like [`attribute`](Self::attribute), for the combination of four keys.
    pub fn attributes4<K1: AttributeKey, K2: AttributeKey, K3: AttributeKey, K4: AttributeKey>(
        &self,
    ) -> AttributeRuns<
        'a,
        (
            Option<&'a K1::Value>,
            Option<&'a K2::Value>,
            Option<&'a K3::Value>,
            Option<&'a K4::Value>,
        ),
    > {
        self.slice(|attributes| {
            (
                attributes.get::<K1>(),
                attributes.get::<K2>(),
                attributes.get::<K3>(),
                attributes.get::<K4>(),
            )
        })
    }

    /// Like [`attribute`](Self::attribute), for the combination of five keys.
    pub fn attributes5<
        K1: AttributeKey,
        K2: AttributeKey,
        K3: AttributeKey,
        K4: AttributeKey,
        K5: AttributeKey,
    >(
        &self,
    ) -> AttributeRuns<
        'a,
        (
            Option<&'a K1::Value>,
            Option<&'a K2::Value>,
            Option<&'a K3::Value>,
            Option<&'a K4::Value>,
            Option<&'a K5::Value>,
        ),
    > {
        self.slice(|attributes| {
            (
                attributes.get::<K1>(),
                attributes.get::<K2>(),
                attributes.get::<K3>(),
                attributes.get::<K4>(),
                attributes.get::<K5>(),
            )
        })
    }
}

impl<'a> Iterator for Runs<'a> {
    type Item = Run<'a>;

    fn next(&mut self) -> Option<Run<'a>> {
        if self.front >= self.back {
            return None;
        }
        let run = self.run(self.front);
        self.front += 1;
        Some(run)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Runs<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.run(self.back))
    }
}

impl ExactSizeIterator for Runs<'_> {}

impl FusedIterator for Runs<'_> {}

/// Two run sequences are equal when they hold the same text and attributes run for
/// run, wherever they sit in their strings.
impl PartialEq for Runs<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .clone()
                .zip(other.clone())
                .all(|(a, b)| a.text() == b.text() && a.attributes() == b.attributes())
    }
}

impl fmt::Debug for Runs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.clone().map(|run| (run.text(), run.attributes())))
            .finish()
    }
}

impl fmt::Display for Runs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, run) in self.clone().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            fmt::Display::fmt(&run, f)?;
        }
        Ok(())
    }
}

/// Ranges over which a selection of attributes is constant, with the selected values.
///
/// Produced by [`Runs::attribute`] and its multi-key variants. Iterating from either
/// end yields the same ranges.
#[derive(Clone)]
pub struct AttributeRuns<'a, V> {
    guts: &'a Guts,
    range: Range<usize>,
    front: usize,
    back: usize,
    select: fn(&'a AttributeSet) -> V,
}

impl<'a, V: PartialEq> AttributeRuns<'a, V> {
    fn value(&self, block: usize) -> V {
        (self.select)(&self.guts.runs().run(block).attributes)
    }

    fn span(&self, blocks: Range<usize>) -> Range<Index> {
        let runs = self.guts.runs();
        let start = runs.range_of(blocks.start).start.max(self.range.start);
        let end = runs.range_of(blocks.end - 1).end.min(self.range.end);
        self.guts.index(start)..self.guts.index(end)
    }

    /// The selected value at `index` and the longest range around it holding that value.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a position within the viewed text.
    #[track_caller]
    pub fn at(&self, index: Index) -> (V, Range<Index>) {
        let offset = self.guts.offset_of(index);
        assert!(
            self.range.contains(&offset),
            "index {offset} outside of {:?}",
            self.range
        );
        let block = self.guts.runs().block_containing(offset);
        let value = self.value(block);
        let mut start = block;
        while start > self.front && self.value(start - 1) == value {
            start -= 1;
        }
        let mut end = block + 1;
        while end < self.back && self.value(end) == value {
            end += 1;
        }
        let span = self.span(start..end);
        (value, span)
    }
}

impl<'a, V: PartialEq> Iterator for AttributeRuns<'a, V> {
    type Item = (V, Range<Index>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let start = self.front;
        let value = self.value(start);
        let mut end = start + 1;
        while end < self.back && self.value(end) == value {
            end += 1;
        }
        self.front = end;
        Some((value, self.span(start..end)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let blocks = self.back - self.front;
        (usize::from(blocks > 0), Some(blocks))
    }
}

impl<V: PartialEq> DoubleEndedIterator for AttributeRuns<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let end = self.back;
        let value = self.value(end - 1);
        let mut start = end - 1;
        while start > self.front && self.value(start - 1) == value {
            start -= 1;
        }
        self.back = start;
        Some((value, self.span(start..end)))
    }
}

impl<V: PartialEq> FusedIterator for AttributeRuns<'_, V> {}

impl<V> fmt::Debug for AttributeRuns<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeRuns")
            .field("range", &self.range)
            .field("blocks", &(self.front..self.back))
            .finish_non_exhaustive()
    }
}
