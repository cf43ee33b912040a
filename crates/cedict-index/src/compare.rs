//! Offline consistency check between two independently produced indices.

use std::collections::{BTreeSet, HashMap};

use cedict_types::IndexLine;
use tracing::info;

use crate::error::{IndexError, Mismatch};
use crate::source::SourceText;

/// Compare two index files and return the number of agreeing lines.
pub fn compare(left: &SourceText, right: &SourceText) -> Result<usize, IndexError> {
    let lines = compare_text(left.text(), right.text())?;
    info!(
        "{} and {} agree on {lines} lines",
        left.name(),
        right.name()
    );
    Ok(lines)
}

/// Compare two indices as sets of `(headword, occurrence set)` pairs.
///
/// Line order does not matter, nor does the order of offsets within a line.
/// Every left headword must appear on the right with the same occurrence
/// set, and both files must have the same number of lines. Decomposition
/// groups are not compared. Reported line numbers refer to the left file,
/// except for unparsable right lines.
pub fn compare_text(left: &str, right: &str) -> Result<usize, Mismatch> {
    let mut by_headword: HashMap<&str, BTreeSet<u64>> = HashMap::new();
    let mut right_lines = 0;
    for (idx, text) in right.lines().enumerate() {
        let parsed = parse(idx + 1, "right", text)?;
        by_headword
            .entry(parsed.headword)
            .or_default()
            .extend(parsed.occurrences.iter().copied());
        right_lines += 1;
    }

    let mut left_lines = 0;
    for (idx, text) in left.lines().enumerate() {
        let line = idx + 1;
        let parsed = parse(line, "left", text)?;
        let Some(right_set) = by_headword.get(parsed.headword) else {
            return Err(Mismatch::MissingHeadword {
                line,
                headword: parsed.headword.to_string(),
            });
        };
        let left_set: BTreeSet<u64> = parsed.occurrences.iter().copied().collect();
        if &left_set != right_set {
            return Err(Mismatch::Occurrences {
                line,
                headword: parsed.headword.to_string(),
                left: left_set.into_iter().collect(),
                right: right_set.iter().copied().collect(),
            });
        }
        left_lines += 1;
    }

    if left_lines != right_lines {
        return Err(Mismatch::LineCount {
            line: left_lines.min(right_lines) + 1,
            left: left_lines,
            right: right_lines,
        });
    }
    Ok(left_lines)
}

fn parse<'a>(line: usize, side: &'static str, text: &'a str) -> Result<IndexLine<'a>, Mismatch> {
    IndexLine::parse(text).ok_or_else(|| Mismatch::Unparsable {
        line,
        side,
        text: text.to_string(),
    })
}
