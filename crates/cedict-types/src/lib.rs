//! Shared text-width model and index record types for CEDICT position indices.
//!
//! Offsets in an index are not byte offsets. They count *units* the way the
//! consuming reader indexes its strings: one unit per codepoint in the Basic
//! Multilingual Plane, two units for anything above `U+FFFF` (a surrogate
//! pair). Sources written with CRLF line endings can additionally charge one
//! extra unit per line feed, because lines are held in memory with a bare
//! `\n` terminator while the reader sees the original `\r\n`.
//!
//! Use [`count_units`] for the raw width computation, [`lines`] to walk a
//! source the way the builder does, [`IndexEntry`] to render an index line
//! and [`IndexLine`] to parse one back.
//!
//! ```rust
//! use cedict_types::{IndexLine, LineEnding, count_units, lines};
//!
//! assert_eq!(count_units("好\n", false), 2);
//! assert_eq!(count_units("好\n", true), 3);
//! assert_eq!(count_units("𠀋", false), 2);
//!
//! let widths: Vec<u64> = lines("a\r\nbc\n").map(|l| l.units(LineEnding::Crlf)).collect();
//! assert_eq!(widths, vec![3, 4]);
//!
//! let parsed = IndexLine::parse("你好 12,40 7").unwrap();
//! assert_eq!(parsed.occurrences, vec![12, 40]);
//! ```

use std::fmt::{self, Write as _};

/// Separator between the headword, occurrence group and decomposition group.
///
/// A space sorts below every printable character, so a reader searching for
/// `headword + " "` meets lines in the same order the index was sorted in.
pub const GROUP_DELIMITER: char = ' ';

/// Separator between offsets inside one group.
pub const OFFSET_DELIMITER: char = ',';

/// First codepoint that is stored as a surrogate pair by the reader.
const SUPPLEMENTARY_START: u32 = 0x10000;

/// Width of a single codepoint in units.
pub fn char_units(c: char) -> u64 {
    if u32::from(c) >= SUPPLEMENTARY_START { 2 } else { 1 }
}

/// Number of units `line` occupies.
///
/// When `crlf_extra` is set every line feed counts one extra unit for the
/// carriage return that is missing from the in-memory line.
pub fn count_units(line: &str, crlf_extra: bool) -> u64 {
    line.chars()
        .map(|c| char_units(c) + u64::from(crlf_extra && c == '\n'))
        .sum()
}

/// Line terminator convention of a source file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    /// Parse `lf`/`crlf` (case-insensitive).
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "lf" => Some(LineEnding::Lf),
            "crlf" => Some(LineEnding::Crlf),
            _ => None,
        }
    }

    /// Inspect the first terminator in `text`. `None` when there is no line feed.
    pub fn detect(text: &str) -> Option<Self> {
        let idx = text.find('\n')?;
        if text[..idx].ends_with('\r') {
            Some(LineEnding::Crlf)
        } else {
            Some(LineEnding::Lf)
        }
    }

    /// Whether line feeds carry the extra carriage-return unit.
    pub fn counts_extra(self) -> bool {
        matches!(self, LineEnding::Crlf)
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineEnding::Lf => "lf",
            LineEnding::Crlf => "crlf",
        })
    }
}

/// One source line as held in memory: the text without its terminator, and
/// whether a terminator followed it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Line<'a> {
    pub body: &'a str,
    pub terminated: bool,
}

impl<'a> Line<'a> {
    /// Units the line occupies including its (normalised `\n`) terminator.
    pub fn units(&self, ending: LineEnding) -> u64 {
        let extra = ending.counts_extra();
        let mut units = count_units(self.body, extra);
        if self.terminated {
            units += count_units("\n", extra);
        }
        units
    }

    /// Whitespace-separated tokens of the line.
    pub fn tokens(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.body.split_whitespace()
    }

    /// The headword candidates: the first two tokens, or fewer if the line is short.
    pub fn headwords(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.tokens().take(2)
    }
}

/// Iterator returned by [`lines`].
#[derive(Clone, Debug)]
pub struct Lines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        if self.rest.is_empty() {
            return None;
        }
        match self.rest.find('\n') {
            Some(idx) => {
                let body = &self.rest[..idx];
                self.rest = &self.rest[idx + 1..];
                Some(Line {
                    body: body.strip_suffix('\r').unwrap_or(body),
                    terminated: true,
                })
            }
            None => {
                let body = self.rest;
                self.rest = "";
                Some(Line {
                    body,
                    terminated: false,
                })
            }
        }
    }
}

/// Split `text` into lines, folding `\r\n` into a single `\n` terminator.
///
/// A trailing line without terminator is yielded; an empty text yields nothing.
pub fn lines(text: &str) -> Lines<'_> {
    Lines { rest: text }
}

/// One headword of a finished index.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IndexEntry {
    pub headword: String,
    /// Dictionary offsets in file order.
    pub occurrences: Vec<u64>,
    /// Decomposition offsets, ascending, unique.
    pub decomposition_refs: Vec<u64>,
}

impl fmt::Display for IndexEntry {
    /// Renders the serialized index line without its terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.headword)?;
        f.write_char(GROUP_DELIMITER)?;
        write_offsets(f, &self.occurrences)?;
        if !self.decomposition_refs.is_empty() {
            f.write_char(GROUP_DELIMITER)?;
            write_offsets(f, &self.decomposition_refs)?;
        }
        Ok(())
    }
}

fn write_offsets(f: &mut fmt::Formatter<'_>, offsets: &[u64]) -> fmt::Result {
    for (idx, offset) in offsets.iter().enumerate() {
        if idx > 0 {
            f.write_char(OFFSET_DELIMITER)?;
        }
        write!(f, "{offset}")?;
    }
    Ok(())
}

/// Borrowed view of a serialized index line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexLine<'a> {
    pub headword: &'a str,
    pub occurrences: Vec<u64>,
    pub decomposition_refs: Vec<u64>,
}

impl<'a> IndexLine<'a> {
    /// Parse `headword occ[,occ...][ ref[,ref...]]`.
    ///
    /// Lines without a group delimiter are read in the older comma-only
    /// layout `headword,occ[,occ...]`. Returns `None` for anything else,
    /// including a headword without occurrences.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let line = raw.trim_end_matches(['\r', '\n']);
        if line.contains(GROUP_DELIMITER) {
            let mut groups = line.split(GROUP_DELIMITER);
            let headword = groups.next().filter(|h| !h.is_empty())?;
            let occurrences = parse_offsets(groups.next()?)?;
            let decomposition_refs = match groups.next() {
                Some(group) => parse_offsets(group)?,
                None => Vec::new(),
            };
            if groups.next().is_some() {
                return None;
            }
            Some(Self {
                headword,
                occurrences,
                decomposition_refs,
            })
        } else {
            let (headword, rest) = line.split_once(OFFSET_DELIMITER)?;
            if headword.is_empty() {
                return None;
            }
            Some(Self {
                headword,
                occurrences: parse_offsets(rest)?,
                decomposition_refs: Vec::new(),
            })
        }
    }
}

fn parse_offsets(group: &str) -> Option<Vec<u64>> {
    if group.is_empty() {
        return None;
    }
    group
        .split(OFFSET_DELIMITER)
        .map(|t| t.trim().parse::<u64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn astral_codepoints_take_two_units() {
        assert_eq!(char_units('a'), 1);
        assert_eq!(char_units('好'), 1);
        assert_eq!(char_units('\u{FFFF}'), 1);
        assert_eq!(char_units('\u{10000}'), 2);
        assert_eq!(char_units('𪚥'), 2);
        assert_eq!(count_units("𪚥好", false), 3);
    }

    #[test]
    fn line_feed_charges_extra_unit_only_in_crlf_mode() {
        assert_eq!(count_units("ab\n", false), 3);
        assert_eq!(count_units("ab\n", true), 4);
        assert_eq!(count_units("ab", true), 2);
        assert_eq!(count_units("", true), 0);
    }

    #[test]
    fn counts_are_additive_across_lines() {
        let text = "# header\n好 好 hao3 /good/\n𠀋 𠀋 x /rare/\n";
        for crlf in [false, true] {
            let whole = count_units(text, crlf);
            let summed: u64 = text.split_inclusive('\n').map(|l| count_units(l, crlf)).sum();
            assert_eq!(whole, summed);
        }
    }

    #[test]
    fn lines_fold_crlf_and_keep_unterminated_tail() {
        let collected: Vec<Line<'_>> = lines("a\r\nb\nc").collect();
        assert_eq!(
            collected,
            vec![
                Line { body: "a", terminated: true },
                Line { body: "b", terminated: true },
                Line { body: "c", terminated: false },
            ]
        );
        assert_eq!(lines("").count(), 0);
        assert_eq!(lines("\n").count(), 1);
    }

    #[test]
    fn line_units_follow_line_ending() {
        let line = Line {
            body: "好 好",
            terminated: true,
        };
        assert_eq!(line.units(LineEnding::Lf), 4);
        assert_eq!(line.units(LineEnding::Crlf), 5);
        let tail = Line {
            body: "好",
            terminated: false,
        };
        assert_eq!(tail.units(LineEnding::Crlf), 1);
    }

    #[test]
    fn headwords_take_at_most_two_tokens() {
        let line = Line {
            body: "  你好 你好 ni3 hao3 /hello/",
            terminated: true,
        };
        assert_eq!(line.headwords().collect::<Vec<_>>(), vec!["你好", "你好"]);
        let short = Line {
            body: "單",
            terminated: true,
        };
        assert_eq!(short.headwords().collect::<Vec<_>>(), vec!["單"]);
    }

    #[test]
    fn detects_line_endings() {
        assert_eq!(LineEnding::detect("a\r\nb"), Some(LineEnding::Crlf));
        assert_eq!(LineEnding::detect("a\nb\r\n"), Some(LineEnding::Lf));
        assert_eq!(LineEnding::detect("no newline"), None);
        assert_eq!(LineEnding::from_name("CRLF"), Some(LineEnding::Crlf));
        assert_eq!(LineEnding::from_name("cr"), None);
    }

    #[test]
    fn renders_entry_with_and_without_refs() {
        let mut entry = IndexEntry {
            headword: "好".into(),
            occurrences: vec![0, 35],
            decomposition_refs: Vec::new(),
        };
        assert_eq!(entry.to_string(), "好 0,35");
        entry.decomposition_refs = vec![4, 90];
        assert_eq!(entry.to_string(), "好 0,35 4,90");
    }

    #[test]
    fn parses_both_index_layouts() {
        let line = IndexLine::parse("好 0,35 4,90\n").unwrap();
        assert_eq!(line.headword, "好");
        assert_eq!(line.occurrences, vec![0, 35]);
        assert_eq!(line.decomposition_refs, vec![4, 90]);

        let legacy = IndexLine::parse("好,35,0").unwrap();
        assert_eq!(legacy.headword, "好");
        assert_eq!(legacy.occurrences, vec![35, 0]);
        assert!(legacy.decomposition_refs.is_empty());
    }

    #[test]
    fn rejects_malformed_index_lines() {
        assert!(IndexLine::parse("").is_none());
        assert!(IndexLine::parse("好").is_none());
        assert!(IndexLine::parse("好 ").is_none());
        assert!(IndexLine::parse("好 1,x").is_none());
        assert!(IndexLine::parse("好 1 2 3").is_none());
        assert!(IndexLine::parse(" 1").is_none());
    }
}
