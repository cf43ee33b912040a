use std::env;
use std::fs;

use anyhow::{Context, Result, bail};
use cedict_lookup::Lookup;

fn main() -> Result<()> {
    let usage = "usage: cargo run -p cedict-lookup --example lookup -- <index> <dictionary> <decomposition> <word>...";
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 4 {
        bail!(usage);
    }

    let read = |path: &str| fs::read_to_string(path).with_context(|| format!("reading {path}"));
    let index = read(&args[0])?;
    let dictionary = read(&args[1])?;
    let ids = read(&args[2])?;
    let lookup = Lookup::new(&index, &dictionary, &ids);

    for word in &args[3..] {
        println!("\n{word}");
        let Some(found) = lookup.entries_for(word) else {
            println!("  (not in index)");
            continue;
        };
        for entry in &found.entries {
            println!(
                "  {} {} [{}] {}",
                entry.traditional,
                entry.simplified,
                entry.pinyin,
                entry.definitions.join("; ")
            );
        }
        for record in &found.decompositions {
            println!("  ids: {record}");
        }
        if found.skipped > 0 {
            println!("  ({} malformed lines skipped)", found.skipped);
        }
    }

    Ok(())
}
