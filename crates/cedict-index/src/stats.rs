use std::fmt;

use cedict_types::{IndexEntry, count_units};

/// Summary figures for a built index.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IndexStats {
    pub entries: usize,
    pub occurrences: usize,
    pub entries_with_refs: usize,
    pub decomposition_refs: usize,
    /// Widest headword, in units.
    pub longest_headword: u64,
}

impl IndexStats {
    pub fn from_entries(entries: &[IndexEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut stats, entry| {
            stats.entries += 1;
            stats.occurrences += entry.occurrences.len();
            stats.decomposition_refs += entry.decomposition_refs.len();
            if !entry.decomposition_refs.is_empty() {
                stats.entries_with_refs += 1;
            }
            stats.longest_headword = stats
                .longest_headword
                .max(count_units(&entry.headword, false));
            stats
        })
    }
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {} occurrences, {} with decomposition refs ({} refs), longest headword {} units",
            self.entries,
            self.occurrences,
            self.entries_with_refs,
            self.decomposition_refs,
            self.longest_headword
        )
    }
}
