//! The `reorient run` command.

mod batch;
mod setup;
pub mod types;

pub use types::ReportKind;

use clap::Args;
use reorient_core::Config;
use std::path::PathBuf;

use batch::run_batch;
use setup::setup_reorienter;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory to read images from
    #[arg(short, long, visible_aliases = ["dir", "folder"])]
    pub input: PathBuf,

    /// Directory to write rotated images to (must differ from the input)
    #[arg(short, long, visible_aliases = ["output-dir", "output-folder"])]
    pub output: PathBuf,

    /// Keep each image's source format instead of writing PNG
    #[arg(long, visible_aliases = ["jpg", "jpeg"])]
    pub keep_format: bool,

    /// Number of parallel workers (defaults to available parallelism)
    #[arg(short, long, value_parser = parse_worker_count, conflicts_with = "single_thread")]
    pub workers: Option<usize>,

    /// Process images one at a time
    #[arg(long)]
    pub single_thread: bool,

    /// Write a per-image report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "jsonl")]
    pub report_format: ReportKind,
}

/// Manual Default impl for constructing RunArgs outside of clap.
///
/// Values match the clap annotations above.
impl Default for RunArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            keep_format: false,
            workers: None,
            single_thread: false,
            report: None,
            report_format: ReportKind::Jsonl,
        }
    }
}

fn parse_worker_count(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("worker count must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Execute the run command.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let reorienter = setup_reorienter(&args, config)?;
    run_batch(&reorienter, &args).await
}
