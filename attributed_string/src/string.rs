// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Add, AddAssign, Range};

use crate::guts::Guts;
use crate::text::{
    Index, is_grapheme_boundary, next_grapheme, next_scalar, prev_grapheme, prev_scalar,
    validate_range,
};
use crate::views::{Characters, Runs, UnicodeScalars};
use crate::{AttributeKey, AttributeSet, AttributeValue, MergePolicy, RangeError, Scope};

/// How [`range_of`](AttributedString::range_of) searches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Search from the end and return the last match.
    pub backwards: bool,
    /// Only match at the start (or, searching backwards, the end) of the text.
    pub anchored: bool,
}

/// Unicode text partitioned into runs of attributes.
///
/// `AttributedString` is a value type: clones share storage until one of them is
/// mutated, at which point the mutated value takes its own copy.
///
/// ```
/// use attributed_string::{AttributeKey, AttributeSet, AttributedString};
///
/// struct Bold;
///
/// impl AttributeKey for Bold {
///     type Value = bool;
///     const NAME: &'static str = "Bold";
/// }
///
/// let mut text = AttributedString::new("Hello", AttributeSet::new().with::<Bold>(true));
/// text += " World";
/// assert_eq!(text.runs().count(), 2);
/// assert_eq!(text.get::<Bold>(), None);
/// ```
#[derive(Clone)]
pub struct AttributedString {
    guts: Arc<Guts>,
}

/// A range of an [`AttributedString`].
///
/// Indices into a substring are indices into its base string. Mutating a substring
/// changes its own copy of the base, never the string it was taken from.
#[derive(Clone)]
pub struct AttributedSubstring {
    base: AttributedString,
    range: Range<usize>,
}

/// A mutable range of an [`AttributedString`], for restyling part of the string in place.
pub struct SliceMut<'a> {
    string: &'a mut AttributedString,
    range: Range<usize>,
}

#[track_caller]
fn check_index(guts: &Guts, bounds: &Range<usize>, index: Index) -> usize {
    let offset = guts.offset_of(index);
    assert!(
        bounds.start <= offset && offset <= bounds.end,
        "index {offset} outside of {bounds:?}"
    );
    offset
}

#[track_caller]
fn check_range(guts: &Guts, bounds: &Range<usize>, range: &Range<Index>) -> Range<usize> {
    let range = guts.offsets_of(range);
    assert!(
        bounds.start <= range.start && range.end <= bounds.end,
        "range {range:?} outside of {bounds:?}"
    );
    range
}

fn content_eq(a: (&Guts, Range<usize>), b: (&Guts, Range<usize>)) -> bool {
    if core::ptr::eq(a.0, b.0) && a.1 == b.1 {
        return true;
    }
    a.0.text()[a.1.clone()] == b.0.text()[b.1.clone()] && a.0.runs_in(&a.1) == b.0.runs_in(&b.1)
}

/// Read access shared by strings and substrings.
macro_rules! impl_reading {
    ($ty:ty) => {
        impl $ty {
            /// The text.
            pub fn as_str(&self) -> &str {
                let (guts, range) = self.parts();
                &guts.text()[range]
            }

            /// The length of the text in UTF-8 bytes.
            pub fn len(&self) -> usize {
                self.parts().1.len()
            }

            /// Returns `true` if there is no text.
            pub fn is_empty(&self) -> bool {
                self.parts().1.is_empty()
            }

            /// The position of the first character.
            pub fn start_index(&self) -> Index {
                let (guts, range) = self.parts();
                guts.index(range.start)
            }

            /// The position just past the last character.
            pub fn end_index(&self) -> Index {
                let (guts, range) = self.parts();
                guts.index(range.end)
            }

            /// The value of `K` if the whole text carries the same one.
            pub fn get<K: AttributeKey>(&self) -> Option<&K::Value> {
                let (guts, range) = self.parts();
                guts.value_in(&range, K::NAME)?.downcast_ref()
            }

            /// The attributes every run carries, with equal values.
            pub fn common_attributes(&self) -> AttributeSet {
                let (guts, range) = self.parts();
                guts.common_attributes(&range)
            }

            /// The runs, clamped to this text.
            pub fn runs(&self) -> Runs<'_> {
                let (guts, range) = self.parts();
                Runs::new(guts, range)
            }

            /// The extended grapheme clusters.
            pub fn characters(&self) -> Characters<'_> {
                Characters::new(self.as_str())
            }

            /// The Unicode scalar values.
            pub fn unicode_scalars(&self) -> UnicodeScalars<'_> {
                UnicodeScalars::new(self.as_str())
            }

            /// The part of this text covered by `range`.
            ///
            /// # Panics
            ///
            /// Panics if `range` holds indices from other text or outside this one.
            #[track_caller]
            pub fn substring(&self, range: Range<Index>) -> AttributedSubstring {
                let (guts, bounds) = self.parts();
                let range = check_range(guts, &bounds, &range);
                AttributedSubstring::new(self.base_string().clone(), range)
            }

            /// The character starting at `index`.
            pub fn character_at(&self, index: Index) -> Option<&str> {
                let end = self.index_after_character(index)?;
                let (guts, _) = self.parts();
                Some(&guts.text()[index.utf8_offset()..end.utf8_offset()])
            }

            /// The position of the character after the one at `index`.
            #[track_caller]
            pub fn index_after_character(&self, index: Index) -> Option<Index> {
                self.step(index, next_grapheme)
            }

            /// The position of the character before `index`.
            #[track_caller]
            pub fn index_before_character(&self, index: Index) -> Option<Index> {
                self.step(index, prev_grapheme)
            }

            /// The position `distance` characters away from `index`.
            #[track_caller]
            pub fn index_offset_by_characters(
                &self,
                index: Index,
                distance: isize,
            ) -> Option<Index> {
                self.stride(index, distance, next_grapheme, prev_grapheme)
            }

            /// The position of the scalar after the one at `index`.
            #[track_caller]
            pub fn index_after_scalar(&self, index: Index) -> Option<Index> {
                self.step(index, next_scalar)
            }

            /// The position of the scalar before `index`.
            #[track_caller]
            pub fn index_before_scalar(&self, index: Index) -> Option<Index> {
                self.step(index, prev_scalar)
            }

            /// The position `distance` scalars away from `index`.
            #[track_caller]
            pub fn index_offset_by_scalars(&self, index: Index, distance: isize) -> Option<Index> {
                self.stride(index, distance, next_scalar, prev_scalar)
            }

            /// The end of the run containing `index`.
            #[track_caller]
            pub fn index_after_run(&self, index: Index) -> Option<Index> {
                let (guts, bounds) = self.parts();
                let offset = check_index(guts, &bounds, index);
                if offset >= bounds.end {
                    return None;
                }
                let block = guts.runs().block_containing(offset);
                let end = guts.runs().range_of(block).end.min(bounds.end);
                Some(guts.index(end))
            }

            /// The start of the run ending at or containing the position before `index`.
            #[track_caller]
            pub fn index_before_run(&self, index: Index) -> Option<Index> {
                let (guts, bounds) = self.parts();
                let offset = check_index(guts, &bounds, index);
                if offset <= bounds.start {
                    return None;
                }
                let block = guts.runs().block_containing(offset - 1);
                let start = guts.runs().range_of(block).start.max(bounds.start);
                Some(guts.index(start))
            }

            /// The index `offset` UTF-8 bytes from the start of this text.
            pub fn index_at_utf8_offset(&self, offset: usize) -> Result<Index, RangeError> {
                let (guts, bounds) = self.parts();
                validate_range(self.as_str(), &(offset..offset))?;
                Ok(guts.index(bounds.start + offset))
            }

            /// The indices for a range of UTF-8 offsets from the start of this text.
            pub fn range_from_utf8(&self, range: Range<usize>) -> Result<Range<Index>, RangeError> {
                let (guts, bounds) = self.parts();
                validate_range(self.as_str(), &range)?;
                Ok(guts.index(bounds.start + range.start)..guts.index(bounds.start + range.end))
            }

            /// The first (or last) occurrence of `needle` that starts and ends on
            /// character boundaries.
            pub fn range_of(&self, needle: &str, options: SearchOptions) -> Option<Range<Index>> {
                let (guts, bounds) = self.parts();
                let text = self.as_str();
                if needle.is_empty() || needle.len() > text.len() {
                    return None;
                }
                let matches_at = |start: usize| {
                    text[start..].starts_with(needle)
                        && is_grapheme_boundary(text, start)
                        && is_grapheme_boundary(text, start + needle.len())
                };
                let found = match (options.backwards, options.anchored) {
                    (false, true) => matches_at(0).then_some(0),
                    (true, true) => {
                        let start = text.len() - needle.len();
                        (text.is_char_boundary(start) && matches_at(start)).then_some(start)
                    }
                    (false, false) => text.char_indices().map(|(i, _)| i).find(|&i| matches_at(i)),
                    (true, false) => text
                        .char_indices()
                        .rev()
                        .map(|(i, _)| i)
                        .find(|&i| matches_at(i)),
                }?;
                let start = bounds.start + found;
                Some(guts.index(start)..guts.index(start + needle.len()))
            }

            /// An owned copy of this text and its attributes.
            pub fn to_attributed_string(&self) -> AttributedString {
                let (guts, range) = self.parts();
                if range.start == 0 && range.end == guts.text().len() {
                    return self.base_string().clone();
                }
                AttributedString::from_parts(guts, range)
            }

            /// A copy with `attributes` replacing every attribute.
            #[must_use]
            pub fn setting_attributes(&self, attributes: AttributeSet) -> AttributedString {
                let mut copy = self.to_attributed_string();
                copy.set_attributes(attributes);
                copy
            }

            /// A copy with `attributes` merged into every run.
            #[must_use]
            pub fn merging_attributes(
                &self,
                attributes: &AttributeSet,
                policy: MergePolicy,
            ) -> AttributedString {
                let mut copy = self.to_attributed_string();
                copy.merge_attributes(attributes, policy);
                copy
            }

            /// A copy with [`replace_attributes`](Self::replace_attributes) applied.
            #[must_use]
            pub fn replacing_attributes(
                &self,
                find: &AttributeSet,
                with: &AttributeSet,
            ) -> AttributedString {
                let mut copy = self.to_attributed_string();
                copy.replace_attributes(find, with);
                copy
            }

            /// A copy keeping only the attributes declared in `scope`.
            pub fn scoped(&self, scope: &Scope) -> AttributedString {
                let (guts, range) = self.parts();
                let mut copy = AttributedString::from_parts(guts, range);
                copy.guts = Arc::new(copy.guts.retaining(|name| scope.contains(name)));
                copy
            }

            #[track_caller]
            fn step(&self, index: Index, step: fn(&str, usize) -> Option<usize>) -> Option<Index> {
                let (guts, bounds) = self.parts();
                let offset = check_index(guts, &bounds, index);
                let next = step(self.as_str(), offset - bounds.start)?;
                Some(guts.index(bounds.start + next))
            }

            #[track_caller]
            fn stride(
                &self,
                index: Index,
                distance: isize,
                forward: fn(&str, usize) -> Option<usize>,
                backward: fn(&str, usize) -> Option<usize>,
            ) -> Option<Index> {
                let (guts, bounds) = self.parts();
                let text = self.as_str();
                let mut offset = check_index(guts, &bounds, index) - bounds.start;
                let step = if distance < 0 { backward } else { forward };
                for _ in 0..distance.unsigned_abs() {
                    offset = step(text, offset)?;
                }
                Some(guts.index(bounds.start + offset))
            }
        }
    };
}

/// Attribute edits shared by strings, substrings and mutable slices.
macro_rules! impl_restyling {
    ($ty:ty) => {
        impl $ty {
            /// Store `value` for `K` over the whole text.
            pub fn set<K: AttributeKey>(&mut self, value: K::Value) {
                let value = AttributeValue::new::<K>(value);
                let (guts, range) = self.parts_mut();
                guts.add_value(range, K::NAME, &value);
            }

            /// Store `value` for `K`, or remove `K` when `value` is `None`.
            pub fn set_optional<K: AttributeKey>(&mut self, value: Option<K::Value>) {
                match value {
                    Some(value) => self.set::<K>(value),
                    None => self.remove::<K>(),
                }
            }

            /// Remove `K` from the whole text.
            pub fn remove<K: AttributeKey>(&mut self) {
                let (guts, range) = self.parts_mut();
                guts.remove_value(range, K::NAME);
            }

            /// Replace every attribute with `attributes`.
            pub fn set_attributes(&mut self, attributes: AttributeSet) {
                let (guts, range) = self.parts_mut();
                guts.set_attributes(range, attributes);
            }

            /// Merge `attributes` into every run.
            pub fn merge_attributes(&mut self, attributes: &AttributeSet, policy: MergePolicy) {
                let (guts, range) = self.parts_mut();
                guts.merge_attributes(range, attributes, policy);
            }

            /// In every run that carries all of `find`, replace those entries with `with`.
            ///
            /// Runs may carry other attributes too; those are kept.
            pub fn replace_attributes(&mut self, find: &AttributeSet, with: &AttributeSet) {
                if find == with {
                    return;
                }
                let (guts, range) = self.parts_mut();
                guts.replace_attributes(range, find, with);
            }
        }
    };
}

impl_reading!(AttributedString);
impl_reading!(AttributedSubstring);
impl_restyling!(AttributedString);
impl_restyling!(AttributedSubstring);
impl_restyling!(SliceMut<'_>);

impl AttributedString {
    /// `text` carrying `attributes` throughout.
    pub fn new(text: impl Into<String>, attributes: AttributeSet) -> Self {
        Self {
            guts: Arc::new(Guts::with_attributes(text.into(), attributes)),
        }
    }

    fn from_parts(guts: &Guts, range: Range<usize>) -> Self {
        let runs = crate::run_list::RunList::from_runs(guts.runs_in(&range));
        Self {
            guts: Arc::new(Guts::new(String::from(&guts.text()[range]), runs)),
        }
    }

    pub(crate) fn from_guts(guts: Guts) -> Self {
        Self {
            guts: Arc::new(guts),
        }
    }

    pub(crate) fn parts(&self) -> (&Guts, Range<usize>) {
        (&self.guts, 0..self.guts.text().len())
    }

    fn parts_mut(&mut self) -> (&mut Guts, Range<usize>) {
        let len = self.guts.text().len();
        (Guts::make_unique(&mut self.guts), 0..len)
    }

    pub(crate) fn guts_mut(&mut self) -> &mut Guts {
        Guts::make_unique(&mut self.guts)
    }

    fn base_string(&self) -> &Self {
        self
    }

    /// A mutable view of `range`, for changing the attributes of part of the string.
    ///
    /// # Panics
    ///
    /// Panics if `range` holds indices from other text.
    #[track_caller]
    pub fn slice_mut(&mut self, range: Range<Index>) -> SliceMut<'_> {
        let range = self.guts.offsets_of(&range);
        SliceMut {
            string: self,
            range,
        }
    }

    /// Add `other` at the end.
    pub fn append(&mut self, other: impl Into<AttributedSubstring>) {
        let end = self.end_index();
        self.replace_subrange(end..end, other);
    }

    /// Insert `other` at `index`.
    #[track_caller]
    pub fn insert(&mut self, index: Index, other: impl Into<AttributedSubstring>) {
        self.replace_subrange(index..index, other);
    }

    /// Remove the text in `range` along with its attributes.
    #[track_caller]
    pub fn remove_subrange(&mut self, range: Range<Index>) {
        let range = self.guts.offsets_of(&range);
        self.guts_mut().replace_subrange(range, "", Vec::new());
    }

    /// Replace `range` with `other`, keeping `other`'s attributes.
    #[track_caller]
    pub fn replace_subrange(&mut self, range: Range<Index>, other: impl Into<AttributedSubstring>) {
        let range = self.guts.offsets_of(&range);
        let other = other.into();
        let (other_guts, other_range) = other.parts();
        let runs = other_guts.runs_in(&other_range);
        self.guts_mut()
            .replace_subrange(range, &other_guts.text()[other_range], runs);
    }

    /// Replace the characters in `range` with plain `text`.
    ///
    /// Replacing text passes the attributes of the first replaced run on to `text`.
    /// Inserting picks up the inheritable attributes of the preceding character.
    #[track_caller]
    pub fn replace_characters(&mut self, range: Range<Index>, text: &str) {
        let range = self.guts.offsets_of(&range);
        self.guts_mut().replace_text(range, text);
    }

    /// Like [`replace_characters`](Self::replace_characters), for a sequence of scalars.
    #[track_caller]
    pub fn replace_scalars(
        &mut self,
        range: Range<Index>,
        scalars: impl IntoIterator<Item = char>,
    ) {
        let text: String = scalars.into_iter().collect();
        self.replace_characters(range, &text);
    }

    /// Replace the character at `index` with `character`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is stale or at the end of the text.
    #[track_caller]
    pub fn set_character(&mut self, index: Index, character: &str) {
        let end = self
            .index_after_character(index)
            .unwrap_or_else(|| panic!("no character at {}", index.utf8_offset()));
        self.replace_characters(index..end, character);
    }

    /// Add plain `text` at the end, carrying the inheritable attributes of the last
    /// character.
    pub fn push_str(&mut self, text: &str) {
        let end = self.end_index();
        self.replace_characters(end..end, text);
    }
}

impl AttributedSubstring {
    pub(crate) fn new(base: AttributedString, range: Range<usize>) -> Self {
        Self { base, range }
    }

    /// The string this substring was taken from, as this substring sees it.
    pub fn base(&self) -> &AttributedString {
        &self.base
    }

    /// The range of the base covered by this substring.
    pub fn range(&self) -> Range<Index> {
        self.start_index()..self.end_index()
    }

    pub(crate) fn parts(&self) -> (&Guts, Range<usize>) {
        (&self.base.guts, self.range.clone())
    }

    fn parts_mut(&mut self) -> (&mut Guts, Range<usize>) {
        (Guts::make_unique(&mut self.base.guts), self.range.clone())
    }

    fn base_string(&self) -> &AttributedString {
        &self.base
    }
}

impl SliceMut<'_> {
    /// The text of the slice.
    pub fn as_str(&self) -> &str {
        &self.string.guts.text()[self.range.clone()]
    }

    /// The value of `K` if the whole slice carries the same one.
    pub fn get<K: AttributeKey>(&self) -> Option<&K::Value> {
        self.string
            .guts
            .value_in(&self.range, K::NAME)?
            .downcast_ref()
    }

    fn parts_mut(&mut self) -> (&mut Guts, Range<usize>) {
        (Guts::make_unique(&mut self.string.guts), self.range.clone())
    }
}

impl fmt::Debug for SliceMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceMut")
            .field("range", &self.range)
            .field("text", &self.as_str())
            .finish()
    }
}

impl Default for AttributedString {
    fn default() -> Self {
        Self::from("")
    }
}

impl From<&str> for AttributedString {
    fn from(text: &str) -> Self {
        Self::new(text, AttributeSet::new())
    }
}

impl From<String> for AttributedString {
    fn from(text: String) -> Self {
        Self::new(text, AttributeSet::new())
    }
}

impl From<AttributedSubstring> for AttributedString {
    fn from(substring: AttributedSubstring) -> Self {
        substring.to_attributed_string()
    }
}

impl From<&AttributedSubstring> for AttributedString {
    fn from(substring: &AttributedSubstring) -> Self {
        substring.to_attributed_string()
    }
}

impl From<AttributedString> for AttributedSubstring {
    fn from(string: AttributedString) -> Self {
        let len = string.len();
        Self::new(string, 0..len)
    }
}

impl From<&AttributedString> for AttributedSubstring {
    fn from(string: &AttributedString) -> Self {
        string.clone().into()
    }
}

impl From<&AttributedSubstring> for AttributedSubstring {
    fn from(substring: &AttributedSubstring) -> Self {
        substring.clone()
    }
}

impl From<&str> for AttributedSubstring {
    fn from(text: &str) -> Self {
        AttributedString::from(text).into()
    }
}

impl From<String> for AttributedSubstring {
    fn from(text: String) -> Self {
        AttributedString::from(text).into()
    }
}

impl<T: Into<AttributedSubstring>> Add<T> for AttributedString {
    type Output = Self;

    fn add(mut self, rhs: T) -> Self {
        self.append(rhs);
        self
    }
}

impl<T: Into<AttributedSubstring>> AddAssign<T> for AttributedString {
    fn add_assign(&mut self, rhs: T) {
        self.append(rhs);
    }
}

impl PartialEq for AttributedString {
    fn eq(&self, other: &Self) -> bool {
        content_eq(self.parts(), other.parts())
    }
}

impl PartialEq for AttributedSubstring {
    fn eq(&self, other: &Self) -> bool {
        content_eq(self.parts(), other.parts())
    }
}

impl PartialEq<AttributedSubstring> for AttributedString {
    fn eq(&self, other: &AttributedSubstring) -> bool {
        content_eq(self.parts(), other.parts())
    }
}

impl PartialEq<AttributedString> for AttributedSubstring {
    fn eq(&self, other: &AttributedString) -> bool {
        content_eq(self.parts(), other.parts())
    }
}

impl fmt::Debug for AttributedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AttributedString").field(&self.runs()).finish()
    }
}

impl fmt::Debug for AttributedSubstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributedSubstring")
            .field("range", &self.range)
            .field("runs", &self.runs())
            .finish()
    }
}

impl fmt::Display for AttributedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.runs(), f)
    }
}

impl fmt::Display for AttributedSubstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.runs(), f)
    }
}
