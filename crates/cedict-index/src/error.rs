use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while loading sources, building, writing or comparing indices.
///
/// Every variant is fatal to the run that produced it.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{name}: invalid UTF-8 on line {line} (byte {byte})")]
    Encoding {
        name: String,
        line: usize,
        byte: usize,
    },

    #[error("{name}: malformed input: {reason}")]
    MalformedInput { name: String, reason: String },

    #[error("indices differ: {0}")]
    Mismatch(#[from] Mismatch),
}

impl IndexError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IndexError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        IndexError::MalformedInput {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// First divergence found between two indices. Line numbers are 1-based.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum Mismatch {
    #[error("line {line}: {side} index line is not parsable: {text:?}")]
    Unparsable {
        line: usize,
        side: &'static str,
        text: String,
    },

    #[error("line {line}: headword {headword:?} is missing from the right index")]
    MissingHeadword { line: usize, headword: String },

    #[error("line {line}: offsets for {headword:?} differ ({left:?} vs {right:?})")]
    Occurrences {
        line: usize,
        headword: String,
        left: Vec<u64>,
        right: Vec<u64>,
    },

    #[error("line {line}: line counts differ ({left} vs {right})")]
    LineCount {
        line: usize,
        left: usize,
        right: usize,
    },
}

impl Mismatch {
    /// Line at which the indices stop agreeing.
    pub fn line(&self) -> usize {
        match self {
            Mismatch::Unparsable { line, .. }
            | Mismatch::MissingHeadword { line, .. }
            | Mismatch::Occurrences { line, .. }
            | Mismatch::LineCount { line, .. } => *line,
        }
    }
}
