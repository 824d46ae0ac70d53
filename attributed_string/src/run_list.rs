// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The run partition and its coalescing rules.
//!
//! A [`RunList`] splits `0..total_len` into contiguous, non-empty runs, and no two
//! neighboring runs carry equal attributes. Every edit only compares the runs at the
//! edges of the region it touched.

use alloc::vec::Vec;
use core::ops::Range;

/// One run as stored: a length in storage units and the attributes it carries.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StoredRun<A> {
    pub(crate) length: usize,
    pub(crate) attributes: A,
}

impl<A> StoredRun<A> {
    pub(crate) fn new(length: usize, attributes: A) -> Self {
        Self { length, attributes }
    }
}

/// What a run visitor did to the attributes it was handed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum RunEdit {
    /// Left alone; no comparison needed.
    Unmodified,
    /// Changed; no comparison needed.
    Modified,
    /// Compare against the original to find out.
    Compare,
}

/// Append `run` to `runs`, folding it into the last run when attributes agree.
pub(crate) fn push_coalesced<A: PartialEq>(runs: &mut Vec<StoredRun<A>>, run: StoredRun<A>) {
    if run.length == 0 {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.attributes == run.attributes => last.length += run.length,
        _ => runs.push(run),
    }
}

#[derive(Clone, Debug)]
pub(crate) struct RunList<A> {
    runs: Vec<StoredRun<A>>,
    /// `starts[i]` is the offset at which `runs[i]` begins.
    starts: Vec<usize>,
}

impl<A> Default for RunList<A> {
    fn default() -> Self {
        Self {
            runs: Vec::new(),
            starts: Vec::new(),
        }
    }
}

impl<A: PartialEq> PartialEq for RunList<A> {
    fn eq(&self, other: &Self) -> bool {
        self.runs == other.runs
    }
}

impl<A: Clone + PartialEq> RunList<A> {
    /// A list holding a single run, or nothing if `length` is zero.
    pub(crate) fn single(length: usize, attributes: A) -> Self {
        Self::from_runs([StoredRun::new(length, attributes)])
    }

    /// Build a list from runs in order, dropping empty runs and folding equal neighbors.
    pub(crate) fn from_runs(runs: impl IntoIterator<Item = StoredRun<A>>) -> Self {
        let mut coalesced = Vec::new();
        for run in runs {
            push_coalesced(&mut coalesced, run);
        }
        let mut next = 0;
        let starts = coalesced
            .iter()
            .map(|run| {
                let start = next;
                next += run.length;
                start
            })
            .collect();
        Self {
            runs: coalesced,
            starts,
        }
    }

    /// The number of runs.
    pub(crate) fn count(&self) -> usize {
        self.runs.len()
    }

    /// The sum of all run lengths.
    pub(crate) fn total_len(&self) -> usize {
        match (self.starts.last(), self.runs.last()) {
            (Some(start), Some(run)) => start + run.length,
            _ => 0,
        }
    }

    pub(crate) fn run(&self, block: usize) -> &StoredRun<A> {
        &self.runs[block]
    }

    pub(crate) fn range_of(&self, block: usize) -> Range<usize> {
        let start = self.starts[block];
        start..start + self.runs[block].length
    }

    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = &StoredRun<A>> + '_ {
        self.runs.iter()
    }

    /// The index of the run containing `offset`, or [`count`](Self::count) at or past the end.
    pub(crate) fn block_containing(&self, offset: usize) -> usize {
        if offset >= self.total_len() {
            return self.runs.len();
        }
        self.starts.partition_point(|&start| start <= offset) - 1
    }

    /// The indices of the runs that overlap `range`.
    pub(crate) fn blocks_overlapping(&self, range: &Range<usize>) -> Range<usize> {
        if range.is_empty() {
            return 0..0;
        }
        self.block_containing(range.start)..self.block_containing(range.end - 1) + 1
    }

    /// Copies of the runs overlapping `range`, clamped to it.
    pub(crate) fn runs_in(&self, range: &Range<usize>) -> Vec<StoredRun<A>> {
        self.blocks_overlapping(range)
            .map(|block| {
                let run_range = self.range_of(block);
                let length = run_range.end.min(range.end) - run_range.start.max(range.start);
                StoredRun::new(length, self.runs[block].attributes.clone())
            })
            .collect()
    }

    /// Replace the runs covering `range` with `new_runs`.
    ///
    /// Runs only partly covered keep their uncovered prefix or suffix. `new_runs` must
    /// already be coalesced among themselves.
    pub(crate) fn replace_range(&mut self, range: Range<usize>, new_runs: Vec<StoredRun<A>>) {
        let total = self.total_len();
        debug_assert!(
            range.start <= range.end && range.end <= total,
            "run range {range:?} out of bounds for {total}"
        );
        let mut inserting: Vec<StoredRun<A>> =
            new_runs.into_iter().filter(|run| run.length > 0).collect();

        let start_block = self.block_containing(range.start);
        if start_block < self.runs.len() {
            let prefix = range.start - self.starts[start_block];
            if prefix > 0 {
                let attributes = &self.runs[start_block].attributes;
                match inserting.first_mut() {
                    Some(first) if first.attributes == *attributes => first.length += prefix,
                    _ => inserting.insert(0, StoredRun::new(prefix, attributes.clone())),
                }
            }
        }

        let end_block = self.block_containing(range.end);
        if end_block < self.runs.len() {
            let end_range = self.range_of(end_block);
            let suffix = end_range.end - range.end;
            if suffix > 0 {
                let attributes = &self.runs[end_block].attributes;
                match inserting.last_mut() {
                    Some(last) if last.attributes == *attributes => last.length += suffix,
                    _ => inserting.push(StoredRun::new(suffix, attributes.clone())),
                }
            }
            self.replace_blocks(start_block..end_block + 1, inserting);
        } else {
            self.replace_blocks(start_block..end_block, inserting);
        }
    }

    /// Splice `new_runs` in place of `blocks`, then fold the edges into their neighbors.
    ///
    /// Offsets past the splice only move when the total length changes.
    fn replace_blocks(&mut self, blocks: Range<usize>, new_runs: Vec<StoredRun<A>>) {
        log::trace!(
            "splicing {} run(s) over blocks {blocks:?} of {}",
            new_runs.len(),
            self.runs.len()
        );
        let start = blocks.start;
        let end = start + new_runs.len();
        let offset = match self.starts.get(start) {
            Some(&offset) => offset,
            None => self.total_len(),
        };
        let removed: usize = self.runs[blocks.clone()].iter().map(|run| run.length).sum();
        let mut added = 0;
        let new_starts: Vec<usize> = new_runs
            .iter()
            .map(|run| {
                let run_start = offset + added;
                added += run.length;
                run_start
            })
            .collect();
        self.runs.splice(blocks.clone(), new_runs);
        self.starts.splice(blocks, new_starts);
        if added != removed {
            for run_start in &mut self.starts[end..] {
                *run_start = *run_start - removed + added;
            }
        }

        if end > 0
            && end < self.runs.len()
            && self.runs[end - 1].attributes == self.runs[end].attributes
        {
            self.merge_into_previous(end);
        }
        if start > 0
            && start < self.runs.len()
            && self.runs[start - 1].attributes == self.runs[start].attributes
        {
            self.merge_into_previous(start);
        }
    }

    /// Fold `runs[block]` into `runs[block - 1]`.
    fn merge_into_previous(&mut self, block: usize) {
        let removed = self.runs.remove(block);
        self.starts.remove(block);
        self.runs[block - 1].length += removed.length;
    }

    /// Visit the attributes of each run within `range`, clamped to it.
    ///
    /// Lengths never change. A modified run that straddles the range is split so only the
    /// covered piece changes. A run that ends up equal to the next one absorbs it, and the
    /// absorbed run is not visited. All changes land in one splice.
    pub(crate) fn edit_runs(
        &mut self,
        range: Range<usize>,
        mut visit: impl FnMut(&mut A) -> RunEdit,
    ) {
        let blocks = self.blocks_overlapping(&range);
        if blocks.is_empty() {
            return;
        }
        let mut replacement = Vec::with_capacity(blocks.len() + 2);
        let mut modified_any = false;
        let mut absorb_next = false;
        for block in blocks.clone() {
            let run_range = self.range_of(block);
            let original = &self.runs[block].attributes;
            if absorb_next {
                absorb_next = false;
                push_coalesced(&mut replacement, StoredRun::new(run_range.len(), original.clone()));
                continue;
            }
            let mut attributes = original.clone();
            let modified = match visit(&mut attributes) {
                RunEdit::Unmodified => false,
                RunEdit::Modified => true,
                RunEdit::Compare => attributes != *original,
            };
            if !modified {
                push_coalesced(&mut replacement, StoredRun::new(run_range.len(), original.clone()));
                continue;
            }
            modified_any = true;
            let clamped = range.start.max(run_range.start)..run_range.end.min(range.end);
            absorb_next = clamped.end == run_range.end
                && self
                    .runs
                    .get(block + 1)
                    .is_some_and(|next| next.attributes == attributes);
            push_coalesced(
                &mut replacement,
                StoredRun::new(clamped.start - run_range.start, original.clone()),
            );
            push_coalesced(&mut replacement, StoredRun::new(clamped.len(), attributes));
            push_coalesced(
                &mut replacement,
                StoredRun::new(run_range.end - clamped.end, original.clone()),
            );
        }
        if modified_any {
            self.replace_blocks(blocks, replacement);
        }
    }

    /// Returns `true` if no two neighboring runs carry equal attributes.
    #[cfg(test)]
    pub(crate) fn is_coalesced(&self) -> bool {
        self.runs.iter().all(|run| run.length > 0)
            && self
                .runs
                .windows(2)
                .all(|pair| pair[0].attributes != pair[1].attributes)
    }
}
