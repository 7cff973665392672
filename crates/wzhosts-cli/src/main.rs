//! wzhosts CLI
//!
//! Administrative interface over the API hosts file

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use wzhosts_core::logging_facility::{init, Profile};
use wzhosts_store::{HostRepository, StoreConfig};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "wzhosts")]
#[command(about = "Manage the API hosts of a Wazuh app configuration file", long_about = None)]
struct Cli {
    /// Hosts file to operate on
    #[arg(long, global = true, env = "WZHOSTS_FILE")]
    file: Option<PathBuf>,

    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every host
    List,
    /// Show one host
    Get(commands::hosts::IdArgs),
    /// Add a host; prints the assigned id
    Add(commands::hosts::AddArgs),
    /// Replace the connection fields of a host
    Update(commands::hosts::UpdateArgs),
    /// Remove a host
    Delete(commands::hosts::IdArgs),
    /// Import API entries exported from the legacy index
    Migrate(commands::migrate::MigrateArgs),
    /// Resolve the hosts a scheduled job would run against
    Targets(commands::targets::TargetsArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Text => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let config = match cli.file {
        Some(path) => StoreConfig::new(path),
        None => StoreConfig::default(),
    };
    let repo = HostRepository::open(&config);

    let result = match cli.command {
        Commands::List => commands::hosts::list(&repo),
        Commands::Get(args) => commands::hosts::get(&repo, args),
        Commands::Add(args) => commands::hosts::add(&repo, args),
        Commands::Update(args) => commands::hosts::update(&repo, args),
        Commands::Delete(args) => commands::hosts::delete(&repo, args),
        Commands::Migrate(args) => commands::migrate::execute(&repo, args),
        Commands::Targets(args) => commands::targets::execute(&repo, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
