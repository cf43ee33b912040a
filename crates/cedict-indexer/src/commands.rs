use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use cedict_index::{IndexStats, LoadMode, SourceText, build_index, write_index};
use cedict_lookup::Lookup;
use serde::Serialize;
use tracing::info;

use crate::config::{BuildJob, PRESETS, Preset, preset};

/// Build one index and write it atomically to `job.output`.
pub fn build(job: &BuildJob) -> Result<IndexStats> {
    let start = Instant::now();
    let dictionary = load(&job.dictionary, job.load_mode)?;
    let decomposition = load(&job.decomposition, job.load_mode)?;
    let options = job.options(dictionary.text());
    info!(
        "building {} from {} ({}, {} header lines, {:?})",
        job.output.display(),
        dictionary.name(),
        options.line_ending,
        options.header_lines,
        options.policy
    );

    let entries = build_index(&dictionary, &decomposition, &options)?;
    write_index(&job.output, &entries)?;

    let stats = IndexStats::from_entries(&entries);
    info!("{stats}");
    info!(
        "wrote {} in {} ms",
        job.output.display(),
        start.elapsed().as_millis()
    );
    Ok(stats)
}

/// Build the named presets from `data_dir`, or every preset when `names` is empty.
pub fn build_presets(
    data_dir: &Path,
    names: &[String],
    load_mode: LoadMode,
) -> Result<Vec<(&'static str, IndexStats)>> {
    let selected: Vec<&Preset> = if names.is_empty() {
        PRESETS.iter().collect()
    } else {
        names
            .iter()
            .map(|name| {
                preset(name).with_context(|| {
                    let known: Vec<&str> = PRESETS.iter().map(|p| p.name).collect();
                    format!("unknown preset `{name}` (known: {})", known.join(", "))
                })
            })
            .collect::<Result<_>>()?
    };

    info!("data directory: {}", data_dir.display());
    let mut built = Vec::with_capacity(selected.len());
    for preset in selected {
        let stats = build(&preset.job(data_dir, load_mode))
            .with_context(|| format!("building preset `{}`", preset.name))?;
        built.push((preset.name, stats));
    }
    Ok(built)
}

/// Check that two index files agree; returns the number of lines compared.
pub fn compare(left: &Path, right: &Path, load_mode: LoadMode) -> Result<usize> {
    let left = load(left, load_mode)?;
    let right = load(right, load_mode)?;
    Ok(cedict_index::compare(&left, &right)?)
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EntryReport {
    pub traditional: String,
    pub simplified: String,
    pub pinyin: String,
    pub definitions: Vec<String>,
}

/// Owned, serializable form of a lookup.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LookupReport {
    pub headword: String,
    pub entries: Vec<EntryReport>,
    pub decompositions: Vec<String>,
    pub skipped: usize,
}

impl LookupReport {
    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.headword);
        for entry in &self.entries {
            out.push_str(&format!(
                "  {} {} [{}]\n",
                entry.traditional, entry.simplified, entry.pinyin
            ));
            for definition in &entry.definitions {
                out.push_str(&format!("    - {definition}\n"));
            }
        }
        for record in &self.decompositions {
            out.push_str(&format!("  ids: {record}\n"));
        }
        if self.skipped > 0 {
            out.push_str(&format!("  ({} unreadable dictionary lines)\n", self.skipped));
        }
        out
    }
}

pub struct LookupPaths<'a> {
    pub index: &'a Path,
    pub dictionary: &'a Path,
    pub decomposition: &'a Path,
}

/// Resolve `word` through an index. Fails when the index has no line for it.
pub fn lookup(paths: &LookupPaths<'_>, word: &str, load_mode: LoadMode) -> Result<LookupReport> {
    let index = load(paths.index, load_mode)?;
    let dictionary = load(paths.dictionary, load_mode)?;
    let decomposition = load(paths.decomposition, load_mode)?;

    let lookup = Lookup::new(index.text(), dictionary.text(), decomposition.text());
    let Some(found) = lookup.entries_for(word) else {
        bail!("`{word}` is not in {}", index.name());
    };

    Ok(LookupReport {
        headword: found.headword.to_string(),
        entries: found
            .entries
            .into_iter()
            .map(|entry| EntryReport {
                traditional: entry.traditional.to_string(),
                simplified: entry.simplified.to_string(),
                pinyin: entry.pinyin.to_string(),
                definitions: entry.definitions.into_iter().map(str::to_string).collect(),
            })
            .collect(),
        decompositions: found.decompositions.into_iter().map(str::to_string).collect(),
        skipped: found.skipped,
    })
}

fn load(path: &Path, mode: LoadMode) -> Result<SourceText> {
    SourceText::load(path, mode).with_context(|| format!("loading {}", path.display()))
}
