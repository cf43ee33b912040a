use std::io::{self, BufWriter, Write};
use std::path::Path;

use cedict_types::IndexEntry;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::IndexError;

/// Write one line per entry, each terminated by `\n`.
pub fn write_index_to<W: Write>(entries: &[IndexEntry], out: W) -> io::Result<()> {
    let mut out = BufWriter::new(out);
    for entry in entries {
        writeln!(out, "{entry}")?;
    }
    out.flush()
}

/// Serialize the whole index into a string.
pub fn render_index(entries: &[IndexEntry]) -> String {
    let mut rendered = String::new();
    for entry in entries {
        rendered.push_str(&entry.to_string());
        rendered.push('\n');
    }
    rendered
}

/// Write the index to `path` atomically.
///
/// The lines go to a temporary file next to `path` which replaces the target
/// only once everything has been flushed, so a failed run never leaves a
/// partial index behind.
pub fn write_index(path: impl AsRef<Path>, entries: &[IndexEntry]) -> Result<(), IndexError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(parent).map_err(|e| IndexError::io(parent, e))?;
    write_index_to(entries, temp.as_file()).map_err(|e| IndexError::io(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| IndexError::io(path, e.error))?;

    info!("wrote {} entries to {}", entries.len(), path.display());
    Ok(())
}
