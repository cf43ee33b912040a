use std::env;
use std::path::{Path, PathBuf};

use cedict_index::{BuildOptions, KeySeparator, LoadMode, MergePolicy};
use cedict_types::LineEnding;
use tracing::warn;

pub const DATA_DIR_ENV: &str = "CEDICT_DATA_DIR";
pub const LOAD_MODE_ENV: &str = "CEDICT_LOAD_MODE";
const DEFAULT_DATA_DIR: &str = "data";

/// File names and flags of one dictionary language, as shipped in the data directory.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub dictionary: &'static str,
    pub decomposition: &'static str,
    pub output: &'static str,
    pub line_ending: LineEnding,
    pub header_lines: usize,
}

pub const PRESETS: [Preset; 2] = [
    Preset {
        name: "en",
        dictionary: "cedict_en.u8",
        decomposition: "char_en.txt",
        output: "cedict_en.idx",
        line_ending: LineEnding::Crlf,
        header_lines: 30,
    },
    Preset {
        name: "vi",
        dictionary: "cedict_vi.u8",
        decomposition: "char_vi.txt",
        output: "cedict_vi.idx",
        line_ending: LineEnding::Lf,
        header_lines: 30,
    },
];

pub fn preset(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

impl Preset {
    /// Build settings for this preset with every file resolved under `data_dir`.
    pub fn job(&self, data_dir: &Path, load_mode: LoadMode) -> BuildJob {
        BuildJob {
            dictionary: data_dir.join(self.dictionary),
            decomposition: data_dir.join(self.decomposition),
            output: data_dir.join(self.output),
            header_lines: self.header_lines,
            line_ending: LineEndingChoice::Fixed(self.line_ending),
            policy: MergePolicy::CharacterSet,
            separator: None,
            load_mode,
        }
    }
}

/// A declared line ending, or `Auto` to detect it from the dictionary.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LineEndingChoice {
    Fixed(LineEnding),
    #[default]
    Auto,
}

impl LineEndingChoice {
    pub fn resolve(self, text: &str) -> LineEnding {
        match self {
            LineEndingChoice::Fixed(ending) => ending,
            LineEndingChoice::Auto => LineEnding::detect(text).unwrap_or_default(),
        }
    }
}

/// Everything `build` needs, after flags and presets are resolved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildJob {
    pub dictionary: PathBuf,
    pub decomposition: PathBuf,
    pub output: PathBuf,
    pub header_lines: usize,
    pub line_ending: LineEndingChoice,
    pub policy: MergePolicy,
    /// `None` picks the policy's usual separator.
    pub separator: Option<KeySeparator>,
    pub load_mode: LoadMode,
}

impl BuildJob {
    pub fn options(&self, dictionary_text: &str) -> BuildOptions {
        BuildOptions {
            header_lines: self.header_lines,
            line_ending: self.line_ending.resolve(dictionary_text),
            policy: self.policy,
            separator: self
                .separator
                .unwrap_or_else(|| self.policy.default_separator()),
        }
    }
}

pub fn data_dir(flag: Option<PathBuf>) -> PathBuf {
    data_dir_from(flag, env::var(DATA_DIR_ENV).ok())
}

fn data_dir_from(flag: Option<PathBuf>, env_value: Option<String>) -> PathBuf {
    flag.or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn load_mode(flag: Option<LoadMode>) -> LoadMode {
    load_mode_from(flag, env::var(LOAD_MODE_ENV).ok().as_deref())
}

fn load_mode_from(flag: Option<LoadMode>, env_value: Option<&str>) -> LoadMode {
    if let Some(mode) = flag {
        return mode;
    }
    match env_value {
        Some(raw) => LoadMode::from_name(raw).unwrap_or_else(|| {
            warn!("ignoring {LOAD_MODE_ENV}={raw}; expected mmap or owned");
            LoadMode::default()
        }),
        None => LoadMode::default(),
    }
}

// clap value parsers

pub fn parse_load_mode(raw: &str) -> Result<LoadMode, String> {
    LoadMode::from_name(raw).ok_or_else(|| format!("unknown load mode `{raw}` (mmap, owned)"))
}

pub fn parse_line_ending(raw: &str) -> Result<LineEndingChoice, String> {
    if raw.eq_ignore_ascii_case("auto") {
        return Ok(LineEndingChoice::Auto);
    }
    LineEnding::from_name(raw)
        .map(LineEndingChoice::Fixed)
        .ok_or_else(|| format!("unknown line ending `{raw}` (lf, crlf, auto)"))
}

pub fn parse_policy(raw: &str) -> Result<MergePolicy, String> {
    MergePolicy::from_name(raw)
        .ok_or_else(|| format!("unknown policy `{raw}` (characters, headword)"))
}

pub fn parse_separator(raw: &str) -> Result<KeySeparator, String> {
    KeySeparator::from_name(raw)
        .ok_or_else(|| format!("separator must be one character or `whitespace`, got `{raw}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_beat_env_beat_defaults() {
        assert_eq!(
            load_mode_from(Some(LoadMode::Owned), Some("mmap")),
            LoadMode::Owned
        );
        assert_eq!(load_mode_from(None, Some("OWNED")), LoadMode::Owned);
        assert_eq!(load_mode_from(None, Some("paged")), LoadMode::Mmap);
        assert_eq!(load_mode_from(None, None), LoadMode::Mmap);

        assert_eq!(
            data_dir_from(Some("cli".into()), Some("env".into())),
            PathBuf::from("cli")
        );
        assert_eq!(data_dir_from(None, Some("env".into())), PathBuf::from("env"));
        assert_eq!(data_dir_from(None, Some(String::new())), PathBuf::from("data"));
        assert_eq!(data_dir_from(None, None), PathBuf::from("data"));
    }

    #[test]
    fn presets_match_historical_builds() {
        let en = preset("EN").unwrap();
        assert_eq!(en.line_ending, LineEnding::Crlf);
        assert_eq!(en.header_lines, 30);

        let job = preset("vi").unwrap().job(Path::new("/data"), LoadMode::Owned);
        assert_eq!(job.dictionary, PathBuf::from("/data/cedict_vi.u8"));
        assert_eq!(job.decomposition, PathBuf::from("/data/char_vi.txt"));
        assert_eq!(job.output, PathBuf::from("/data/cedict_vi.idx"));
        assert_eq!(job.options("").line_ending, LineEnding::Lf);
        assert_eq!(job.options("").separator, KeySeparator::Char('_'));

        assert!(preset("fr").is_none());
    }

    #[test]
    fn auto_line_ending_follows_the_dictionary() {
        assert_eq!(LineEndingChoice::Auto.resolve("a\r\nb\n"), LineEnding::Crlf);
        assert_eq!(LineEndingChoice::Auto.resolve("a\nb\r\n"), LineEnding::Lf);
        assert_eq!(LineEndingChoice::Auto.resolve("no terminator"), LineEnding::Lf);
        assert_eq!(
            LineEndingChoice::Fixed(LineEnding::Crlf).resolve("a\n"),
            LineEnding::Crlf
        );
    }

    #[test]
    fn parses_flag_values() {
        assert_eq!(parse_line_ending("AUTO"), Ok(LineEndingChoice::Auto));
        assert_eq!(
            parse_line_ending("crlf"),
            Ok(LineEndingChoice::Fixed(LineEnding::Crlf))
        );
        assert!(parse_line_ending("cr").is_err());
        assert_eq!(parse_policy("headword"), Ok(MergePolicy::ExactHeadword));
        assert_eq!(parse_separator(":"), Ok(KeySeparator::Char(':')));
        assert_eq!(parse_separator("whitespace"), Ok(KeySeparator::Whitespace));
        assert!(parse_separator("::").is_err());
        assert!(parse_load_mode("paged").is_err());
    }

    #[test]
    fn explicit_separator_overrides_policy_default() {
        let mut job = preset("en").unwrap().job(Path::new("d"), LoadMode::Mmap);
        job.policy = MergePolicy::ExactHeadword;
        assert_eq!(job.options("").separator, KeySeparator::Char(':'));
        job.separator = Some(KeySeparator::Whitespace);
        assert_eq!(job.options("").separator, KeySeparator::Whitespace);
    }
}
