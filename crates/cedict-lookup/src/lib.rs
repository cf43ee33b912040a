//! Read-side helpers for CEDICT position indices.
//!
//! A reader keeps three strings in memory: the sorted index, the dictionary
//! and the decomposition file. A lookup binary-searches the index for the
//! line of a headword, then jumps to each recorded unit offset instead of
//! scanning the dictionary.
//!
//! # How it works
//! 1. [`find_needle`] bisects the index by line, comparing headwords.
//! 2. [`IndexLine`](cedict_types::IndexLine) splits the line into occurrence
//!    and decomposition offsets.
//! 3. [`UnitMap`] turns each unit offset into a byte offset of the raw text.
//! 4. [`DictionaryEntry::parse`] reads the dictionary line found there;
//!    lines in the wrong format are skipped and counted.
//!
//! # Example
//! ```rust
//! use cedict_lookup::Lookup;
//!
//! let index = "你好 18 6\n好 0 0\n";
//! let dictionary = "好 好 [hao3] /good/\n你好 你好 [ni3 hao3] /hello/\n";
//! let ids = "好_⿰女子\n你_⿰亻尔\n";
//!
//! let lookup = Lookup::new(index, dictionary, ids);
//! let found = lookup.entries_for("你好").unwrap();
//! assert_eq!(found.entries[0].definitions, vec!["hello"]);
//! assert_eq!(found.decompositions, vec!["你_⿰亻尔"]);
//! assert!(lookup.entries_for("壞").is_none());
//! ```
//!
//! For a runnable demo, see `cargo run -p cedict-lookup --example lookup -- <index> <dict> <ids> <word>`.

mod entry;
mod units;

use std::cmp::Ordering;

use cedict_types::{GROUP_DELIMITER, IndexLine};

pub use entry::{DictionaryEntry, EntryError};
pub use units::UnitMap;

/// Find the index line whose headword is exactly `headword`.
///
/// `index` must be sorted by headword, as written by the builder. The line is
/// returned without its terminator.
pub fn find_needle<'a>(index: &'a str, headword: &str) -> Option<&'a str> {
    let bytes = index.as_bytes();
    let mut lo = 0usize;
    let mut hi = bytes.len();

    // `lo` always sits at a line start.
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let start = bytes[lo..mid]
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(lo, |p| lo + p + 1);
        let end = bytes[start..]
            .iter()
            .position(|b| *b == b'\n')
            .map_or(bytes.len(), |p| start + p);
        let line = index[start..end].trim_end_matches('\r');
        let key = line
            .split_once(GROUP_DELIMITER)
            .map_or(line, |(key, _)| key);

        match key.cmp(headword) {
            Ordering::Equal => return Some(line),
            Ordering::Less => lo = end + 1,
            Ordering::Greater => hi = start,
        }
    }
    None
}

/// Everything the index knows about one headword.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LookupResult<'a> {
    pub headword: &'a str,
    pub entries: Vec<DictionaryEntry<'a>>,
    /// Decomposition records (or their payload, for headword-keyed indices).
    pub decompositions: Vec<&'a str>,
    /// Occurrences whose dictionary line could not be parsed.
    pub skipped: usize,
}

/// Borrowed view over an index and the two sources it points into.
pub struct Lookup<'a> {
    index: &'a str,
    dictionary: UnitMap<'a>,
    decomposition: UnitMap<'a>,
}

impl<'a> Lookup<'a> {
    pub fn new(index: &'a str, dictionary: &'a str, decomposition: &'a str) -> Self {
        Self {
            index,
            dictionary: UnitMap::new(dictionary),
            decomposition: UnitMap::new(decomposition),
        }
    }

    /// Resolve `headword`, or `None` if the index has no line for it.
    pub fn entries_for(&self, headword: &str) -> Option<LookupResult<'a>> {
        let parsed = IndexLine::parse(find_needle(self.index, headword)?)?;

        let mut entries = Vec::with_capacity(parsed.occurrences.len());
        let mut skipped = 0;
        for offset in &parsed.occurrences {
            match self.dictionary.line_at(*offset).map(DictionaryEntry::parse) {
                Some(Ok(entry)) => entries.push(entry),
                _ => skipped += 1,
            }
        }

        let decompositions = parsed
            .decomposition_refs
            .iter()
            .filter_map(|offset| self.decomposition.line_at(*offset))
            .collect();

        Some(LookupResult {
            headword: parsed.headword,
            entries,
            decompositions,
            skipped,
        })
    }
}
