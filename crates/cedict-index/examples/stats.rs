use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cedict_index::{BuildOptions, IndexStats, LoadMode, SourceText, build_index};
use cedict_types::LineEnding;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let usage = "usage: cargo run -p cedict-index --example stats -- <dictionary> <decomposition> [header-lines]";
    let dict_path = args.next().map(PathBuf::from).context(usage)?;
    let ids_path = args.next().map(PathBuf::from).context(usage)?;
    let header_lines = match args.next() {
        Some(raw) => raw.parse().context("header-lines must be a number")?,
        None => 0,
    };

    let dictionary = SourceText::load(&dict_path, LoadMode::Mmap)
        .with_context(|| format!("loading {}", dict_path.display()))?;
    let ids = SourceText::load(&ids_path, LoadMode::Mmap)
        .with_context(|| format!("loading {}", ids_path.display()))?;
    let line_ending = LineEnding::detect(dictionary.text()).unwrap_or_default();

    let options = BuildOptions {
        header_lines,
        line_ending,
        ..BuildOptions::default()
    };
    let entries = build_index(&dictionary, &ids, &options)?;
    let stats = IndexStats::from_entries(&entries);

    println!("Dictionary   : {} ({line_ending})", dict_path.display());
    println!("Decomposition: {}", ids_path.display());
    println!("Entries      : {}", stats.entries);
    println!("Occurrences  : {}", stats.occurrences);
    println!("With refs    : {}", stats.entries_with_refs);
    println!("Refs         : {}", stats.decomposition_refs);
    println!("Longest head : {} units", stats.longest_headword);

    // Spot-check a few common headwords.
    for headword in ["好", "你好", "中国"] {
        match entries.iter().find(|e| e.headword == headword) {
            Some(entry) => println!("  {entry}"),
            None => println!("  {headword}: not indexed"),
        }
    }

    Ok(())
}
