use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;

use cedict_types::{IndexEntry, Line, LineEnding, Lines, count_units, lines};
use tracing::{debug, info, warn};

use crate::error::IndexError;
use crate::source::SourceText;

/// How decomposition records are attached to headwords.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MergePolicy {
    /// Every character of the headword, and of its sibling form on the same
    /// dictionary line, contributes the offset of its decomposition record.
    #[default]
    CharacterSet,
    /// Only a decomposition record keyed by the whole headword is attached,
    /// as a single offset pointing past the key and its separator.
    ExactHeadword,
}

impl MergePolicy {
    /// Parse `characters`/`chars` or `headword`/`exact`.
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "characters" | "chars" => Some(MergePolicy::CharacterSet),
            "headword" | "exact" => Some(MergePolicy::ExactHeadword),
            _ => None,
        }
    }

    /// Separator used by the decomposition files each policy was written for.
    pub fn default_separator(self) -> KeySeparator {
        match self {
            MergePolicy::CharacterSet => KeySeparator::Char('_'),
            MergePolicy::ExactHeadword => KeySeparator::Char(':'),
        }
    }
}

/// What ends the key at the start of a decomposition line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeySeparator {
    Char(char),
    /// A run of whitespace of any width.
    Whitespace,
}

impl KeySeparator {
    /// Parse `whitespace` or a single character.
    pub fn from_name(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("whitespace") {
            return Some(KeySeparator::Whitespace);
        }
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySeparator::Char(c)),
            _ => None,
        }
    }

    fn split<'a>(self, body: &'a str) -> KeyParts<'a> {
        let trimmed = body.trim_start();
        let leading = &body[..body.len() - trimmed.len()];
        let bounds = match self {
            KeySeparator::Char(sep) => trimmed
                .find(sep)
                .map(|idx| (idx, idx + sep.len_utf8())),
            KeySeparator::Whitespace => trimmed.find(char::is_whitespace).map(|idx| {
                let rest = &trimmed[idx..];
                (idx, idx + rest.len() - rest.trim_start().len())
            }),
        };
        match bounds {
            Some((key_end, sep_end)) => KeyParts {
                leading,
                key: &trimmed[..key_end],
                separator: &trimmed[key_end..sep_end],
            },
            None => KeyParts {
                leading,
                key: trimmed.trim_end(),
                separator: "",
            },
        }
    }
}

struct KeyParts<'a> {
    leading: &'a str,
    key: &'a str,
    separator: &'a str,
}

impl KeyParts<'_> {
    /// Units from the start of the line to the first payload character.
    fn payload_delta(&self) -> u64 {
        count_units(self.leading, false)
            + count_units(self.key, false)
            + count_units(self.separator, false)
    }
}

/// Knobs for one index build.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildOptions {
    /// Comment lines at the top of the dictionary that carry no entries.
    pub header_lines: usize,
    /// Line ending convention of the dictionary source.
    pub line_ending: LineEnding,
    pub policy: MergePolicy,
    pub separator: KeySeparator,
}

impl BuildOptions {
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            header_lines: 0,
            line_ending: LineEnding::Lf,
            policy,
            separator: policy.default_separator(),
        }
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new(MergePolicy::CharacterSet)
    }
}

#[derive(Default)]
struct HeadwordData {
    occurrences: Vec<u64>,
    chars: HashSet<char>,
}

/// Running state of the dictionary pass. Borrows headwords from the source.
struct DictionaryPass<'a> {
    offset: u64,
    ending: LineEnding,
    track_chars: bool,
    entries: HashMap<&'a str, HeadwordData>,
    content_lines: usize,
    tokenless_lines: usize,
}

impl<'a> DictionaryPass<'a> {
    fn new(start: u64, options: &BuildOptions) -> Self {
        Self {
            offset: start,
            ending: options.line_ending,
            track_chars: options.policy == MergePolicy::CharacterSet,
            entries: HashMap::new(),
            content_lines: 0,
            tokenless_lines: 0,
        }
    }

    fn feed(&mut self, line: Line<'a>) {
        self.content_lines += 1;

        let mut words: Vec<&'a str> = Vec::with_capacity(2);
        for word in line.headwords() {
            if !words.contains(&word) {
                words.push(word);
            }
        }
        if words.is_empty() {
            self.tokenless_lines += 1;
        }

        let line_chars: HashSet<char> = if self.track_chars {
            words.iter().flat_map(|w| w.chars()).collect()
        } else {
            HashSet::new()
        };
        for word in words {
            let data = self.entries.entry(word).or_default();
            data.occurrences.push(self.offset);
            data.chars.extend(line_chars.iter().copied());
        }

        self.offset += line.units(self.ending);
    }
}

/// Running state of the decomposition pass.
struct DecompositionPass {
    offset: u64,
    policy: MergePolicy,
    separator: KeySeparator,
    keys: HashMap<String, u64>,
    replaced: usize,
}

impl DecompositionPass {
    fn new(options: &BuildOptions) -> Self {
        Self {
            offset: 0,
            policy: options.policy,
            separator: options.separator,
            keys: HashMap::new(),
            replaced: 0,
        }
    }

    fn feed(&mut self, line: Line<'_>) {
        let parts = self.separator.split(line.body);
        if !parts.key.is_empty() {
            let at = match self.policy {
                MergePolicy::CharacterSet => self.offset,
                MergePolicy::ExactHeadword => self.offset + parts.payload_delta(),
            };
            if self.keys.insert(parts.key.to_string(), at).is_some() {
                self.replaced += 1;
            }
        }
        self.offset += line.units(LineEnding::Lf);
    }
}

/// Build the sorted index for `dictionary`, cross-referenced with `decomposition`.
///
/// Each occurrence is the unit offset at which the dictionary line holding
/// the headword starts. Fails before producing anything when the dictionary
/// is shorter than its header or has no entries, or when the decomposition
/// source is empty.
pub fn build_index(
    dictionary: &SourceText,
    decomposition: &SourceText,
    options: &BuildOptions,
) -> Result<Vec<IndexEntry>, IndexError> {
    let started = Instant::now();
    let text = dictionary.text();
    inspect_source(dictionary, options.line_ending);

    let mut dict_lines = lines(text);
    let start = skip_header(
        dictionary.name(),
        &mut dict_lines,
        options.header_lines,
        options.line_ending,
    )?;
    debug!("{}: content starts at unit {start}", dictionary.name());

    let mut pass = DictionaryPass::new(start, options);
    for line in dict_lines {
        pass.feed(line);
    }
    if pass.content_lines == 0 {
        return Err(IndexError::malformed(
            dictionary.name(),
            format!("no entries after {} header lines", options.header_lines),
        ));
    }
    if pass.entries.is_empty() {
        return Err(IndexError::malformed(dictionary.name(), "no headwords found"));
    }
    if pass.tokenless_lines > 0 {
        warn!(
            "{}: {} lines without headwords",
            dictionary.name(),
            pass.tokenless_lines
        );
    }
    info!(
        "{}: {} lines, {} headwords, {} units",
        dictionary.name(),
        pass.content_lines,
        pass.entries.len(),
        pass.offset
    );

    let keys = read_decomposition(decomposition, options)?;
    let entries = merge(pass.entries, &keys, options.policy);
    info!(
        "index assembled: {} entries in {} ms",
        entries.len(),
        started.elapsed().as_millis()
    );
    Ok(entries)
}

fn skip_header(
    name: &str,
    lines: &mut Lines<'_>,
    header_lines: usize,
    ending: LineEnding,
) -> Result<u64, IndexError> {
    let mut offset = 0;
    for seen in 0..header_lines {
        let line = lines.next().ok_or_else(|| {
            IndexError::malformed(
                name,
                format!("expected {header_lines} header lines, found {seen}"),
            )
        })?;
        offset += line.units(ending);
    }
    Ok(offset)
}

fn read_decomposition(
    decomposition: &SourceText,
    options: &BuildOptions,
) -> Result<HashMap<String, u64>, IndexError> {
    let text = decomposition.text();
    if text.trim().is_empty() {
        return Err(IndexError::malformed(
            decomposition.name(),
            "decomposition source is empty",
        ));
    }
    inspect_source(decomposition, LineEnding::Lf);

    let mut pass = DecompositionPass::new(options);
    for line in lines(text) {
        pass.feed(line);
    }
    if pass.replaced > 0 {
        debug!(
            "{}: {} keys defined more than once, last record kept",
            decomposition.name(),
            pass.replaced
        );
    }
    info!(
        "{}: {} decomposition keys, {} units",
        decomposition.name(),
        pass.keys.len(),
        pass.offset
    );
    Ok(pass.keys)
}

fn merge(
    entries: HashMap<&str, HeadwordData>,
    keys: &HashMap<String, u64>,
    policy: MergePolicy,
) -> Vec<IndexEntry> {
    let mut merged: Vec<IndexEntry> = entries
        .into_iter()
        .map(|(headword, data)| {
            let decomposition_refs = match policy {
                MergePolicy::CharacterSet => {
                    let refs: BTreeSet<u64> = data
                        .chars
                        .iter()
                        .filter_map(|c| {
                            let mut buf = [0u8; 4];
                            keys.get(&*c.encode_utf8(&mut buf)).copied()
                        })
                        .collect();
                    refs.into_iter().collect()
                }
                MergePolicy::ExactHeadword => keys.get(headword).copied().into_iter().collect(),
            };
            IndexEntry {
                headword: headword.to_string(),
                occurrences: data.occurrences,
                decomposition_refs,
            }
        })
        .collect();
    merged.sort_unstable_by(|a, b| a.headword.cmp(&b.headword));
    merged
}

fn inspect_source(source: &SourceText, declared: LineEnding) {
    let text = source.text();
    if text.starts_with('\u{feff}') {
        warn!("{}: starts with a byte order mark, counted as one unit", source.name());
    }
    if let Some(found) = LineEnding::detect(text)
        && found != declared
    {
        warn!(
            "{}: counted as {declared} but the file uses {found} line endings",
            source.name()
        );
    }
}
