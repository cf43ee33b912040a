//! Command implementations behind the `cedict-indexer` binary.

pub mod commands;
pub mod config;
