use thiserror::Error;

/// Why a dictionary line could not be read as an entry.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum EntryError {
    #[error("missing traditional or simplified form")]
    MissingHeadword,
    #[error("missing [pronunciation] block")]
    MissingPronunciation,
    #[error("missing /definition/ block")]
    MissingDefinitions,
}

/// One CEDICT line: `TRAD SIMP [pin1 yin1] /def 1/def 2/`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DictionaryEntry<'a> {
    pub traditional: &'a str,
    pub simplified: &'a str,
    pub pinyin: &'a str,
    pub definitions: Vec<&'a str>,
}

impl<'a> DictionaryEntry<'a> {
    /// Parse a single dictionary line. A closing `]` is optional, and text
    /// after the last `/` is dropped.
    pub fn parse(line: &'a str) -> Result<Self, EntryError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (traditional, rest) = split_token(line).ok_or(EntryError::MissingHeadword)?;
        let (simplified, rest) = split_token(rest).ok_or(EntryError::MissingHeadword)?;

        let rest = rest
            .strip_prefix('[')
            .ok_or(EntryError::MissingPronunciation)?;
        let slash = rest.find('/').ok_or(EntryError::MissingDefinitions)?;
        let head = rest[..slash].trim_end();
        let pinyin = head.strip_suffix(']').unwrap_or(head).trim();

        // Anything after the last `/` is ignored.
        let tail = &rest[slash + 1..];
        let body = &tail[..tail.rfind('/').ok_or(EntryError::MissingDefinitions)?];
        let definitions: Vec<&str> = body.split('/').filter(|d| !d.is_empty()).collect();
        if definitions.is_empty() {
            return Err(EntryError::MissingDefinitions);
        }

        Ok(Self {
            traditional,
            simplified,
            pinyin,
            definitions,
        })
    }
}

/// A non-empty token followed by whitespace; returns the token and the text
/// after the whitespace run.
fn split_token(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    let end = text.find(char::is_whitespace)?;
    let token = &text[..end];
    Some((token, text[end..].trim_start()))
}
