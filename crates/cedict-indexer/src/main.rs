use std::io;
use std::path::PathBuf;

use anyhow::Result;
use cedict_index::{KeySeparator, LoadMode, MergePolicy};
use cedict_indexer::commands::{self, LookupPaths};
use cedict_indexer::config::{self, BuildJob, LineEndingChoice};
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cedict-indexer")]
#[command(about = "Build, compare and query CEDICT position indices")]
struct Cli {
    /// How source files are loaded (falls back to CEDICT_LOAD_MODE, then mmap).
    #[arg(long, global = true, value_parser = config::parse_load_mode)]
    load_mode: Option<LoadMode>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one index from explicit paths.
    Build(BuildArgs),
    /// Build the bundled language presets from a data directory.
    BuildPresets {
        /// Falls back to CEDICT_DATA_DIR, then `data`.
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Presets to build (default: all).
        languages: Vec<String>,
    },
    /// Check that two index files list the same headwords and occurrences.
    Compare { left: PathBuf, right: PathBuf },
    /// Resolve a word through an index.
    Lookup {
        #[arg(long)]
        index: PathBuf,
        #[arg(long)]
        dictionary: PathBuf,
        #[arg(long)]
        decomposition: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
        word: String,
    },
}

#[derive(Args)]
struct BuildArgs {
    #[arg(long)]
    dictionary: PathBuf,
    #[arg(long)]
    decomposition: PathBuf,
    #[arg(long)]
    output: PathBuf,
    /// Comment lines at the top of the dictionary.
    #[arg(long, default_value_t = 0)]
    header_lines: usize,
    /// lf, crlf or auto.
    #[arg(long, default_value = "auto", value_parser = config::parse_line_ending)]
    line_ending: LineEndingChoice,
    /// characters or headword.
    #[arg(long, default_value = "characters", value_parser = config::parse_policy)]
    policy: MergePolicy,
    /// One character or `whitespace` (default: `_` for characters, `:` for headword).
    #[arg(long, value_parser = config::parse_separator)]
    separator: Option<KeySeparator>,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let load_mode = config::load_mode(cli.load_mode);

    match cli.command {
        Commands::Build(args) => {
            let job = BuildJob {
                dictionary: args.dictionary,
                decomposition: args.decomposition,
                output: args.output,
                header_lines: args.header_lines,
                line_ending: args.line_ending,
                policy: args.policy,
                separator: args.separator,
                load_mode,
            };
            let stats = commands::build(&job)?;
            println!("{}: {stats}", job.output.display());
        }
        Commands::BuildPresets {
            data_dir,
            languages,
        } => {
            let data_dir = config::data_dir(data_dir);
            for (name, stats) in commands::build_presets(&data_dir, &languages, load_mode)? {
                println!("{name}: {stats}");
            }
        }
        Commands::Compare { left, right } => {
            let lines = commands::compare(&left, &right, load_mode)?;
            println!(
                "{} and {} match ({lines} lines)",
                left.display(),
                right.display()
            );
        }
        Commands::Lookup {
            index,
            dictionary,
            decomposition,
            json,
            word,
        } => {
            let paths = LookupPaths {
                index: &index,
                dictionary: &dictionary,
                decomposition: &decomposition,
            };
            let report = commands::lookup(&paths, &word, load_mode)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.render());
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
