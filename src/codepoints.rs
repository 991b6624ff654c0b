//! Codepoint sets and their compact range serialization.
//!
//! A [`CodepointSet`] accumulates raw points and ranges in any order. It is
//! normalized only when compressed, which yields the unique minimal list of
//! inclusive runs. The serialized form is a comma-separated list of decimal
//! points and `start..end` runs.
//!
//! ```
//! use ucd_tables::codepoints::{CodepointSet, Codepoints};
//!
//! let mut set = CodepointSet::new();
//! set.add(9);
//! set.add(5..=7);
//! assert_eq!(set.serialize(), "5..7,9");
//!
//! let parsed = Codepoints::parse("5..7,9").unwrap();
//! assert_eq!(parsed.iter().collect::<Vec<_>>(), [5, 6, 7, 9]);
//! ```

use crate::parse::{
    basic::{pair, prefix},
    text::{self, TextInput},
    Parse, Success,
};
use std::fmt;
use std::ops::RangeInclusive;

/// An inclusive run of codepoints. A single codepoint has `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodepointRange {
    pub start: u32,
    pub end: u32,
}

impl CodepointRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> u64 {
        (self.end - self.start) as u64 + 1
    }
}

impl From<u32> for CodepointRange {
    fn from(cp: u32) -> Self {
        Self::new(cp, cp)
    }
}

impl From<RangeInclusive<u32>> for CodepointRange {
    fn from(range: RangeInclusive<u32>) -> Self {
        Self::new(*range.start(), *range.end())
    }
}

impl fmt::Display for CodepointRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

/// An unordered accumulation of codepoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodepointSet {
    ranges: Vec<CodepointRange>,
}

impl CodepointSet {
    pub const fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Adds a codepoint or an inclusive range of codepoints.
    ///
    /// Ranges with `start > end` are empty and ignored.
    pub fn add<R: Into<CodepointRange>>(&mut self, entry: R) {
        let range = entry.into();
        if range.start <= range.end {
            self.ranges.push(range);
        }
    }

    pub fn union_with(&mut self, other: &CodepointSet) {
        self.ranges.extend_from_slice(&other.ranges);
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Sorts the accumulated entries and merges them into maximal runs.
    ///
    /// Runs in the result are ascending, disjoint, and never adjacent: the
    /// start of each run is at least two past the end of the previous one.
    pub fn compress(&self) -> Vec<CodepointRange> {
        let mut sorted = self.ranges.clone();
        sorted.sort_unstable();

        let mut runs: Vec<CodepointRange> = Vec::with_capacity(sorted.len());
        for range in sorted {
            match runs.last_mut() {
                Some(last) if range.start <= last.end.saturating_add(1) => {
                    last.end = last.end.max(range.end);
                }
                _ => runs.push(range),
            }
        }
        runs
    }

    /// Replaces the accumulated entries by their compressed form.
    pub fn normalize(&mut self) {
        self.ranges = self.compress();
    }

    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Number of distinct codepoints in the set.
    pub fn len(&self) -> u64 {
        self.compress().iter().map(CodepointRange::len).sum()
    }
}

impl fmt::Display for CodepointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, run) in self.compress().iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{run}")?;
        }
        Ok(())
    }
}

impl<R: Into<CodepointRange>> FromIterator<R> for CodepointSet {
    fn from_iter<T: IntoIterator<Item = R>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<R: Into<CodepointRange>> Extend<R> for CodepointSet {
    fn extend<T: IntoIterator<Item = R>>(&mut self, iter: T) {
        for entry in iter {
            self.add(entry);
        }
    }
}

fn run<I: TextInput>(input: I) -> text::PResult<CodepointRange, I> {
    pair(text::dec_u32, prefix(text::verbatim(".."), text::dec_u32).opt())
        .map(|(start, end)| CodepointRange::new(start, end.unwrap_or(start)))
        .verify(|run| run.start <= run.end)
        .parse(input)
}

/// Runs must be ascending, disjoint and non-adjacent, as written by
/// [`CodepointSet::compress`].
fn run_list<I: TextInput>(input: I) -> text::PResult<Vec<CodepointRange>, I> {
    pair(run, prefix(text::verbatim(","), run).collect_many0::<Vec<_>>())
        .opt()
        .map(|list| match list {
            Some((first, mut rest)) => {
                rest.insert(0, first);
                rest
            }
            None => Vec::new(),
        })
        .verify(|runs| {
            runs.windows(2)
                .all(|pair| pair[1].start > pair[0].end.saturating_add(1))
        })
        .complete()
        .parse(input)
}

/// Ranges read back from a serialized set.
///
/// Iteration is lazy, so huge sets can be walked or sampled without being
/// expanded in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Codepoints {
    runs: Vec<CodepointRange>,
}

impl Codepoints {
    /// Parses a serialized range list. The empty string is the empty set.
    pub fn parse(serialized: &str) -> Result<Self, text::Error<&str>> {
        match run_list(serialized) {
            Ok(Success(runs, _)) => Ok(Self { runs }),
            Err(failure) => Err(failure.0),
        }
    }

    pub fn runs(&self) -> &[CodepointRange] {
        &self.runs
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.runs.iter().flat_map(|run| run.start..=run.end)
    }

    pub fn first(&self) -> Option<u32> {
        self.runs.first().map(|run| run.start)
    }

    pub fn len(&self) -> u64 {
        self.runs.iter().map(CodepointRange::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Gets the codepoint at `index` in iteration order without walking the
    /// codepoints before it.
    pub fn nth(&self, mut index: u64) -> Option<u32> {
        for run in &self.runs {
            if index < run.len() {
                return Some(run.start + index as u32);
            }
            index -= run.len();
        }
        None
    }

    pub fn contains(&self, cp: u32) -> bool {
        self.runs.iter().any(|run| run.start <= cp && cp <= run.end)
    }

    pub fn to_set(&self) -> CodepointSet {
        self.runs.iter().copied().collect()
    }
}

impl From<&CodepointSet> for Codepoints {
    fn from(set: &CodepointSet) -> Self {
        Self {
            runs: set.compress(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::text::ErrorKind;

    fn set(entries: &[RangeInclusive<u32>]) -> CodepointSet {
        entries.iter().cloned().collect()
    }

    #[test]
    fn singleton_and_runs() {
        assert_eq!(set(&[7..=7]).serialize(), "7");
        let mut points = CodepointSet::new();
        for cp in [9, 6, 5, 7] {
            points.add(cp);
        }
        assert_eq!(points.serialize(), "5..7,9");
    }

    #[test]
    fn empty_set_serializes_empty() {
        assert_eq!(CodepointSet::new().serialize(), "");
        assert!(Codepoints::parse("").unwrap().is_empty());
    }

    #[test]
    fn compress_coalesces_adjacent_and_overlapping() {
        let runs = set(&[10..=12, 0..=3, 4..=4, 2..=8, 13..=13, 20..=25]).compress();
        assert_eq!(
            runs,
            [
                CodepointRange::new(0, 8),
                CodepointRange::new(10, 13),
                CodepointRange::new(20, 25)
            ]
        );
        for pair in runs.windows(2) {
            assert!(pair[1].start > pair[0].end + 1);
        }
    }

    #[test]
    fn compress_is_idempotent() {
        let original = set(&[0x61..=0x7A, 0x41..=0x5A, 0x5B..=0x5B, 0x10FFFF..=0x10FFFF]);
        let once: CodepointSet = original.compress().into_iter().collect();
        assert_eq!(once.compress(), original.compress());
    }

    #[test]
    fn round_trip_matches_compress() {
        let original = set(&[100..=100, 3..=5, 6..=9, 50..=60, 55..=70]);
        let parsed = Codepoints::parse(&original.serialize()).unwrap();
        assert_eq!(parsed.runs(), original.compress().as_slice());
        assert_eq!(parsed.len(), original.len());
    }

    #[test]
    fn union_concatenates_members() {
        let mut upper = set(&[0x41..=0x5A]);
        upper.union_with(&set(&[0x61..=0x7A]));
        assert_eq!(upper.serialize(), "65..90,97..122");
    }

    #[test]
    fn lazy_iteration_and_indexing() {
        let parsed = Codepoints::parse("1..3,10,20..21").unwrap();
        assert_eq!(parsed.first(), Some(1));
        assert_eq!(parsed.len(), 6);
        assert_eq!(parsed.nth(3), Some(10));
        assert_eq!(parsed.nth(5), Some(21));
        assert_eq!(parsed.nth(6), None);
        assert!(parsed.contains(2));
        assert!(!parsed.contains(4));
    }

    #[test]
    fn rejects_malformed_lists() {
        assert!(Codepoints::parse("1,,2").is_err());
        assert!(Codepoints::parse("5..3").is_err());
        assert!(Codepoints::parse("1, 2").is_err());
        let err = Codepoints::parse("1..").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExpectedEof);
    }

    #[test]
    fn rejects_unordered_or_touching_runs() {
        for list in ["5,3", "1..5,4..8", "1..3,4", "7,7", "10..20,0..5"] {
            let err = Codepoints::parse(list).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{list}");
        }
        assert_eq!(Codepoints::parse("1..3,5").unwrap().first(), Some(1));
        assert!(Codepoints::parse("4294967295").is_ok());
    }
}
