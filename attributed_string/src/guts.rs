// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shared storage behind every attributed string value.

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use crate::run_list::{RunEdit, RunList, StoredRun};
use crate::text::{Index, next_version};
use crate::{AttributeSet, AttributeValue, MergePolicy};

/// Text plus its run partition. All offsets are UTF-8 byte offsets.
#[derive(Clone, Debug)]
pub(crate) struct Guts {
    text: String,
    runs: RunList<AttributeSet>,
    /// Changes whenever `text` changes; attribute edits keep it.
    version: usize,
}

impl Guts {
    pub(crate) fn new(text: String, runs: RunList<AttributeSet>) -> Self {
        debug_assert_eq!(
            text.len(),
            runs.total_len(),
            "run lengths must cover the text exactly"
        );
        Self {
            text,
            runs,
            version: next_version(),
        }
    }

    pub(crate) fn with_attributes(text: String, attributes: AttributeSet) -> Self {
        let runs = RunList::single(text.len(), attributes);
        Self::new(text, runs)
    }

    /// Borrow `guts` mutably, cloning it first if it is shared.
    pub(crate) fn make_unique(guts: &mut Arc<Self>) -> &mut Self {
        if Arc::strong_count(guts) > 1 || Arc::weak_count(guts) > 0 {
            log::trace!(
                "cloning shared storage of {} bytes in {} run(s)",
                guts.text.len(),
                guts.runs.count()
            );
        }
        Arc::make_mut(guts)
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn runs(&self) -> &RunList<AttributeSet> {
        &self.runs
    }

    #[cfg(test)]
    pub(crate) fn version(&self) -> usize {
        self.version
    }

    pub(crate) fn index(&self, offset: usize) -> Index {
        Index::new(offset, self.version)
    }

    /// The offset behind `index`, which must come from this text.
    ///
    /// # Panics
    ///
    /// Panics if `index` was taken from other text or from before an edit, or if it lies
    /// out of bounds.
    #[track_caller]
    pub(crate) fn offset_of(&self, index: Index) -> usize {
        assert_eq!(
            index.version(),
            self.version,
            "index used with a different or since-edited attributed string"
        );
        assert!(
            index.utf8_offset() <= self.text.len(),
            "index {} out of bounds for length {}",
            index.utf8_offset(),
            self.text.len()
        );
        index.utf8_offset()
    }

    #[track_caller]
    pub(crate) fn offsets_of(&self, range: &Range<Index>) -> Range<usize> {
        let start = self.offset_of(range.start);
        let end = self.offset_of(range.end);
        assert!(start <= end, "index range {start}..{end} is reversed");
        start..end
    }

    /// The attributes of the run containing `offset`.
    pub(crate) fn attributes_at(&self, offset: usize) -> Option<&AttributeSet> {
        let block = self.runs.block_containing(offset);
        (block < self.runs.count()).then(|| &self.runs.run(block).attributes)
    }

    /// The value stored under `name`, if every run overlapping `range` holds the same one.
    pub(crate) fn value_in(&self, range: &Range<usize>, name: &str) -> Option<&AttributeValue> {
        let mut result: Option<&AttributeValue> = None;
        for block in self.runs.blocks_overlapping(range) {
            let value = self.runs.run(block).attributes.value(name)?;
            match result {
                Some(previous) if previous != value => return None,
                _ => result = Some(value),
            }
        }
        result
    }

    /// The attributes shared, with equal values, by every run overlapping `range`.
    pub(crate) fn common_attributes(&self, range: &Range<usize>) -> AttributeSet {
        let mut blocks = self.runs.blocks_overlapping(range);
        let Some(first) = blocks.next() else {
            return AttributeSet::new();
        };
        let mut common = self.runs.run(first).attributes.clone();
        for block in blocks {
            if common.is_empty() {
                break;
            }
            common.intersect(&self.runs.run(block).attributes);
        }
        common
    }

    pub(crate) fn runs_in(&self, range: &Range<usize>) -> Vec<StoredRun<AttributeSet>> {
        self.runs.runs_in(range)
    }

    pub(crate) fn add_value(
        &mut self,
        range: Range<usize>,
        name: &'static str,
        value: &AttributeValue,
    ) {
        self.runs.edit_runs(range, |attributes| {
            attributes.insert_value(name, value.clone());
            RunEdit::Compare
        });
    }

    pub(crate) fn remove_value(&mut self, range: Range<usize>, name: &str) {
        self.runs.edit_runs(range, |attributes| {
            if attributes.remove_value(name).is_some() {
                RunEdit::Modified
            } else {
                RunEdit::Unmodified
            }
        });
    }

    pub(crate) fn merge_attributes(
        &mut self,
        range: Range<usize>,
        incoming: &AttributeSet,
        policy: MergePolicy,
    ) {
        if incoming.is_empty() {
            return;
        }
        self.runs.edit_runs(range, |attributes| {
            attributes.merge(incoming, policy);
            RunEdit::Compare
        });
    }

    /// Replace every attribute in `range` with `attributes`.
    pub(crate) fn set_attributes(&mut self, range: Range<usize>, attributes: AttributeSet) {
        if range.is_empty() {
            return;
        }
        let length = range.len();
        self.runs
            .replace_range(range, vec![StoredRun::new(length, attributes)]);
    }

    /// In runs carrying all of `find`, swap those entries for `with`.
    pub(crate) fn replace_attributes(
        &mut self,
        range: Range<usize>,
        find: &AttributeSet,
        with: &AttributeSet,
    ) {
        if find == with {
            return;
        }
        self.runs.edit_runs(range, |attributes| {
            if !attributes.contains_all(find) {
                return RunEdit::Unmodified;
            }
            for name in find.names() {
                attributes.remove_value(name);
            }
            attributes.merge(with, MergePolicy::KeepNew);
            RunEdit::Compare
        });
    }

    /// Replace `range` with `text`, described by `runs`.
    ///
    /// The version only changes when the text does, so replacing text with itself to
    /// restyle it keeps existing indices valid.
    pub(crate) fn replace_subrange(
        &mut self,
        range: Range<usize>,
        text: &str,
        runs: Vec<StoredRun<AttributeSet>>,
    ) {
        debug_assert_eq!(
            runs.iter().map(|run| run.length).sum::<usize>(),
            text.len(),
            "replacement runs must cover the replacement text"
        );
        if self.text[range.clone()] != *text {
            self.text.replace_range(range.clone(), text);
            self.version = next_version();
        }
        self.runs.replace_range(range, runs);
    }

    /// Replace `range` with plain `text` taking the attributes in effect there.
    pub(crate) fn replace_text(&mut self, range: Range<usize>, text: &str) {
        let attributes = self.attributes_for_replacement(&range);
        self.replace_subrange(range, text, vec![StoredRun::new(text.len(), attributes)]);
    }

    /// The attributes plain text inserted over `range` picks up.
    ///
    /// Replaced text passes on the attributes of its first run. Inserted text takes the
    /// inheritable attributes of the preceding character, or of the first character when
    /// inserting at the start.
    pub(crate) fn attributes_for_replacement(&self, range: &Range<usize>) -> AttributeSet {
        if self.text.is_empty() {
            return AttributeSet::new();
        }
        if !range.is_empty() {
            return self.attributes_at(range.start).cloned().unwrap_or_default();
        }
        let anchor = crate::text::prev_scalar(&self.text, range.start).unwrap_or(0);
        self.attributes_at(anchor)
            .map(AttributeSet::inherited)
            .unwrap_or_default()
    }

    /// A copy holding only the entries whose name satisfies `keep`.
    pub(crate) fn retaining(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        let runs = RunList::from_runs(self.runs.iter().map(|run| {
            let mut attributes = run.attributes.clone();
            attributes.retain(&mut keep);
            StoredRun::new(run.length, attributes)
        }));
        Self {
            text: self.text.clone(),
            runs,
            version: self.version,
        }
    }
}
