//! reorient CLI - batch EXIF orientation correction.
//!
//! Walks an input directory, rotates every JPEG, PNG and TIFF so it
//! displays upright without its orientation tag, and writes the results
//! into a mirrored output tree.
//!
//! # Usage
//!
//! ```bash
//! # Rotate a photo library into a new tree (PNG output)
//! reorient run --input ./photos --output ./upright
//!
//! # Keep the source formats, use four workers, write a report
//! reorient run --input ./photos --output ./upright --keep-format --workers 4 --report run.jsonl
//!
//! # View configuration
//! reorient config show
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reorient_core::Config;

mod cli;
mod logging;

/// reorient - apply EXIF orientation to a tree of images.
#[derive(Parser, Debug)]
#[command(name = "reorient")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "REORIENT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Rotate every image under a directory into a mirrored output tree
    Run(cli::run::RunArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config_path = cli
        .config
        .as_deref()
        .map(reorient_core::paths::expand_tilde)
        .unwrap_or_else(Config::default_path);
    let config = match &cli.config {
        Some(_) => Config::load_from(&config_path).map_err(|e| {
            anyhow::anyhow!(
                "Failed to load config from {}: {e}\n\n  \
                 Hint: Check the file, or run `reorient config init --force` to reset it.",
                config_path.display()
            )
        })?,
        None => match Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `reorient config path`."
                );
                Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("reorient v{}", reorient_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, &config, &config_path),
    }
}
