//! Legacy index migration command
//!
//! Usage: wzhosts migrate <JSON_FILE>
//!
//! The file holds either an array of indexed entries or a raw search
//! response with the entries under `hits.hits`.

use std::path::PathBuf;

use clap::Args;
use wzhosts_store::migration::{migrate, parse_indexed_entries};
use wzhosts_store::HostRepository;

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Path to the exported JSON
    pub path: PathBuf,
}

pub fn execute(repo: &HostRepository, args: MigrateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(&args.path)?;
    let entries = parse_indexed_entries(&json)?;
    let summary = migrate(repo, &entries)?;

    for id in &summary.added {
        println!("added {}", id);
    }
    for id in &summary.skipped {
        println!("skipped {}", id);
    }
    println!(
        "Migrated {} host(s), skipped {}",
        summary.added.len(),
        summary.skipped.len()
    );
    Ok(())
}
