use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;
use tracing::debug;

use crate::error::IndexError;

/// Strategy for loading source files.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, zero-copy).
    #[default]
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

impl LoadMode {
    /// Parse `mmap`/`owned` (case-insensitive).
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "mmap" => Some(LoadMode::Mmap),
            "owned" => Some(LoadMode::Owned),
            _ => None,
        }
    }
}

enum Buffer {
    Mmap(Mmap),
    Owned(String),
}

/// A whole source file held in memory, validated as UTF-8 at load time.
pub struct SourceText {
    name: String,
    buffer: Buffer,
}

impl SourceText {
    /// Load and validate a file. Errors name the path that failed.
    pub fn load(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let mut file = File::open(path).map_err(|e| IndexError::io(path, e))?;
        let len = file.metadata().map_err(|e| IndexError::io(path, e))?.len();

        let buffer = match mode {
            LoadMode::Mmap if len > 0 => {
                let map = unsafe { Mmap::map(&file) }.map_err(|e| IndexError::io(path, e))?;
                check_utf8(&name, &map)?;
                Buffer::Mmap(map)
            }
            _ => {
                let mut bytes = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
                file.read_to_end(&mut bytes)
                    .map_err(|e| IndexError::io(path, e))?;
                let text = String::from_utf8(bytes)
                    .map_err(|e| encoding_error(&name, e.as_bytes(), e.utf8_error()))?;
                Buffer::Owned(text)
            }
        };
        debug!("loaded {name} ({len} bytes, {mode:?})");

        Ok(Self { name, buffer })
    }

    /// Wrap text that is already in memory under a display name.
    pub fn from_string(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buffer: Buffer::Owned(text.into()),
        }
    }

    /// Name used in error messages (the path for loaded files).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        match &self.buffer {
            // SAFETY: the mapped bytes were checked by `check_utf8` in `load`.
            Buffer::Mmap(map) => unsafe { std::str::from_utf8_unchecked(map) },
            Buffer::Owned(text) => text,
        }
    }
}

fn check_utf8(name: &str, bytes: &[u8]) -> Result<(), IndexError> {
    std::str::from_utf8(bytes)
        .map(|_| ())
        .map_err(|e| encoding_error(name, bytes, e))
}

fn encoding_error(name: &str, bytes: &[u8], err: std::str::Utf8Error) -> IndexError {
    let byte = err.valid_up_to();
    let line = bytes[..byte].iter().filter(|b| **b == b'\n').count() + 1;
    IndexError::Encoding {
        name: name.to_string(),
        line,
        byte,
    }
}
