//! Build positional indices over CEDICT-style dictionaries.
//!
//! The index maps every headword to the unit offsets (see
//! [`cedict_types::count_units`]) of the dictionary lines it appears on, plus
//! the offsets of decomposition records for its characters. A reader keeps the
//! dictionary as one big string and jumps straight to those offsets instead of
//! parsing the whole file per lookup.
//!
//! # Pipeline
//! 1. [`SourceText::load`] reads and validates each source (mmap or owned,
//!    see [`LoadMode`]).
//! 2. [`build_index`] walks the dictionary once (after skipping its header
//!    lines), then the decomposition file once, and merges both according to
//!    the [`MergePolicy`] in [`BuildOptions`].
//! 3. [`write_index`] serializes the sorted entries atomically.
//!
//! [`compare`] checks two index files against each other, and [`IndexStats`]
//! summarises a build.
//!
//! # Example
//! ```no_run
//! use cedict_index::{BuildOptions, LoadMode, SourceText, build_index, write_index};
//! use cedict_types::LineEnding;
//!
//! # fn main() -> anyhow::Result<()> {
//! let dictionary = SourceText::load("data/cedict_en.u8", LoadMode::Mmap)?;
//! let decomposition = SourceText::load("data/char_en.txt", LoadMode::Mmap)?;
//! let options = BuildOptions {
//!     header_lines: 30,
//!     line_ending: LineEnding::Crlf,
//!     ..BuildOptions::default()
//! };
//! let entries = build_index(&dictionary, &decomposition, &options)?;
//! write_index("data/cedict_en.idx", &entries)?;
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p cedict-index --example stats -- <dict> <ids>`.

pub mod builder;
pub mod compare;
pub mod error;
pub mod source;
pub mod stats;
pub mod writer;

pub use builder::{BuildOptions, KeySeparator, MergePolicy, build_index};
pub use cedict_types::IndexEntry;
pub use compare::{compare, compare_text};
pub use error::{IndexError, Mismatch};
pub use source::{LoadMode, SourceText};
pub use stats::IndexStats;
pub use writer::{render_index, write_index, write_index_to};
