use std::env;
use std::path::PathBuf;

use cedict_index::{BuildOptions, IndexStats, LoadMode, SourceText, build_index};
use cedict_types::LineEnding;

fn data_dir() -> Option<PathBuf> {
    env::var("CEDICT_DATA_DIR").ok().map(PathBuf::from)
}

#[test]
fn indexes_english_cedict() {
    let Some(dir) = data_dir() else {
        eprintln!("skipping: CEDICT_DATA_DIR not set");
        return;
    };
    let dictionary =
        SourceText::load(dir.join("cedict_en.u8"), LoadMode::Mmap).expect("load cedict_en.u8");
    let ids = SourceText::load(dir.join("char_en.txt"), LoadMode::Mmap).expect("load char_en.txt");
    let options = BuildOptions {
        header_lines: 30,
        line_ending: LineEnding::Crlf,
        ..BuildOptions::default()
    };
    let entries = build_index(&dictionary, &ids, &options).expect("build index");
    let stats = IndexStats::from_entries(&entries);

    assert!(stats.entries > 10_000, "index too small: {stats}");
    assert!(stats.entries_with_refs > 1_000, "too few decomposition refs: {stats}");
    assert!(entries.iter().any(|e| e.headword == "好"));
}
