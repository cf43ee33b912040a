use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use cedict_index::{KeySeparator, LoadMode, MergePolicy, compare_text};
use cedict_indexer::commands::{self, LookupPaths};
use cedict_indexer::config::{BuildJob, LineEndingChoice};
use cedict_types::IndexLine;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("cedict-index")
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> String {
    fs::read_to_string(fixture(name)).expect("read fixture")
}

fn job(dir: &TempDir) -> BuildJob {
    BuildJob {
        dictionary: fixture("cedict_sample.u8"),
        decomposition: fixture("char_sample.txt"),
        output: dir.path().join("out.idx"),
        header_lines: 3,
        line_ending: LineEndingChoice::Auto,
        policy: MergePolicy::CharacterSet,
        separator: None,
        load_mode: LoadMode::Mmap,
    }
}

/// `reference` with every occurrence moved by `shift` units.
fn shifted(reference: &str, shift: u64) -> String {
    reference
        .lines()
        .map(|line| {
            let parsed = IndexLine::parse(line).unwrap();
            let occurrences: Vec<String> = parsed
                .occurrences
                .iter()
                .map(|o| (o + shift).to_string())
                .collect();
            format!("{} {}\n", parsed.headword, occurrences.join(","))
        })
        .collect()
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cedict-indexer"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("spawn cedict-indexer")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

#[test]
fn build_writes_reference_index() {
    let dir = TempDir::new().unwrap();
    let job = job(&dir);
    let stats = commands::build(&job).unwrap();

    assert_eq!(stats.entries, 11);
    let written = fs::read_to_string(&job.output).unwrap();
    assert_eq!(written, read_fixture("cedict_sample.idx"));
}

#[test]
fn build_detects_crlf_dictionary() {
    let dir = TempDir::new().unwrap();
    let dictionary = dir.path().join("cedict_crlf.u8");
    fs::write(
        &dictionary,
        read_fixture("cedict_sample.u8").replace('\n', "\r\n"),
    )
    .unwrap();

    let mut job = job(&dir);
    job.dictionary = dictionary;
    job.load_mode = LoadMode::Owned;
    commands::build(&job).unwrap();

    let written = fs::read_to_string(&job.output).unwrap();
    assert_eq!(written, read_fixture("cedict_sample_crlf.idx"));
}

#[test]
fn build_with_headword_policy() {
    let dir = TempDir::new().unwrap();
    let mut job = job(&dir);
    job.decomposition = fixture("ids_legacy.txt");
    job.policy = MergePolicy::ExactHeadword;
    let stats = commands::build(&job).unwrap();
    assert_eq!(stats.entries_with_refs, 3);

    job.separator = Some(KeySeparator::Char('_'));
    let stats = commands::build(&job).unwrap();
    assert_eq!(stats.entries_with_refs, 0);
}

#[test]
fn failed_build_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let mut job = job(&dir);
    job.dictionary = dir.path().join("missing.u8");

    let err = commands::build(&job).unwrap_err();
    assert!(format!("{err:#}").contains("missing.u8"));
    assert!(!job.output.exists());
}

#[test]
fn encoding_error_keeps_previous_output() {
    let dir = TempDir::new().unwrap();
    let mut job = job(&dir);
    job.decomposition = dir.path().join("char_bad.txt");
    fs::write(&job.decomposition, b"\xe5\xa5\xbd_ok\n\xff\xfe_bad\n").unwrap();
    fs::write(&job.output, "好 0\n").unwrap();

    let err = commands::build(&job).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("char_bad.txt"));
    assert!(message.contains("line 2"));
    assert_eq!(fs::read_to_string(&job.output).unwrap(), "好 0\n");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn presets_build_from_data_dir() {
    let dir = TempDir::new().unwrap();
    // Pad the three-line sample header up to the presets' thirty lines.
    let padding = "# pad\n".repeat(27);
    let dictionary = format!("{padding}{}", read_fixture("cedict_sample.u8"));
    fs::write(dir.path().join("cedict_vi.u8"), &dictionary).unwrap();
    fs::write(
        dir.path().join("cedict_en.u8"),
        dictionary.replace('\n', "\r\n"),
    )
    .unwrap();
    for name in ["char_vi.txt", "char_en.txt"] {
        fs::copy(fixture("char_sample.txt"), dir.path().join(name)).unwrap();
    }

    let built = commands::build_presets(dir.path(), &[], LoadMode::Owned).unwrap();
    let names: Vec<&str> = built.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["en", "vi"]);

    let vi = fs::read_to_string(dir.path().join("cedict_vi.idx")).unwrap();
    let expected = shifted(&read_fixture("cedict_sample.idx"), 27 * 6);
    assert_eq!(compare_text(&vi, &expected), Ok(11));

    let en = fs::read_to_string(dir.path().join("cedict_en.idx")).unwrap();
    let expected = shifted(&read_fixture("cedict_sample_crlf.idx"), 27 * 7);
    assert_eq!(compare_text(&en, &expected), Ok(11));
}

#[test]
fn presets_report_missing_files() {
    let dir = TempDir::new().unwrap();
    let err = commands::build_presets(dir.path(), &["vi".into()], LoadMode::Mmap).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("preset `vi`"));
    assert!(message.contains("cedict_vi.u8"));
}

#[test]
fn lookup_resolves_through_built_index() {
    let dir = TempDir::new().unwrap();
    let job = job(&dir);
    commands::build(&job).unwrap();

    let paths = LookupPaths {
        index: &job.output,
        dictionary: &job.dictionary,
        decomposition: &job.decomposition,
    };
    let report = commands::lookup(&paths, "你好", LoadMode::Mmap).unwrap();
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].pinyin, "ni3 hao3");
    assert_eq!(report.entries[0].definitions, vec!["hello", "hi"]);
    assert_eq!(report.decompositions, vec!["你_⿰亻尔", "好_⿰女子"]);

    let err = commands::lookup(&paths, "壞", LoadMode::Mmap).unwrap_err();
    assert!(err.to_string().contains("`壞` is not in"));
}

#[test]
fn binary_compare_reports_first_mismatch() {
    let dir = TempDir::new().unwrap();
    let reference = fixture("cedict_sample.idx");
    let edited = dir.path().join("edited.idx");
    fs::write(
        &edited,
        read_fixture("cedict_sample.idx").replace("好 326,349 26", "好 349,326"),
    )
    .unwrap();

    let same = run(&["compare", path_arg(&reference), path_arg(&edited)]);
    assert!(same.status.success());
    assert!(String::from_utf8_lossy(&same.stdout).contains("match (11 lines)"));

    let reversed: String = read_fixture("cedict_sample.idx")
        .lines()
        .rev()
        .map(|line| format!("{line}\n"))
        .collect();
    fs::write(&edited, reversed).unwrap();
    let reordered = run(&["compare", path_arg(&reference), path_arg(&edited)]);
    assert!(reordered.status.success());

    fs::write(
        &edited,
        read_fixture("cedict_sample.idx").replace("好 326,349", "好 326,350"),
    )
    .unwrap();
    let differs = run(&["compare", path_arg(&reference), path_arg(&edited)]);
    assert!(!differs.status.success());
    assert!(String::from_utf8_lossy(&differs.stderr).contains("line 8"));
}

#[test]
fn binary_lookup_prints_json() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("sample.idx");
    let dictionary = fixture("cedict_sample.u8");
    let decomposition = fixture("char_sample.txt");

    let built = run(&[
        "build",
        "--dictionary",
        path_arg(&dictionary),
        "--decomposition",
        path_arg(&decomposition),
        "--output",
        path_arg(&output),
        "--header-lines",
        "3",
        "--line-ending",
        "lf",
    ]);
    assert!(built.status.success());

    let found = run(&[
        "--load-mode",
        "owned",
        "lookup",
        "--index",
        path_arg(&output),
        "--dictionary",
        path_arg(&dictionary),
        "--decomposition",
        path_arg(&decomposition),
        "--json",
        "好",
    ]);
    assert!(found.status.success());
    let json: serde_json::Value = serde_json::from_slice(&found.stdout).unwrap();
    assert_eq!(json["headword"], "好");
    assert_eq!(json["entries"][1]["pinyin"], "hao4");
    assert_eq!(json["decompositions"][0], "好_⿰女子");
}

#[test]
fn binary_rejects_bad_flag_values() {
    let out = run(&[
        "build",
        "--dictionary",
        "d",
        "--decomposition",
        "i",
        "--output",
        "o",
        "--line-ending",
        "cr",
    ]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown line ending"));
}
