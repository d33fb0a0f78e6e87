//! Batch execution: progress bar, Ctrl-C cancellation, report and summary.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use reorient_core::{BatchSummary, ItemOutcome, Reorienter, ReportFormat, ReportWriter};

use super::RunArgs;

/// Drain the input tree through the worker pool.
///
/// The first Ctrl-C cancels the queue: images already being processed finish
/// and are written, the rest are discarded, and the command still returns
/// normally with a summary.
pub async fn run_batch(reorienter: &Reorienter, args: &RunArgs) -> anyhow::Result<()> {
    let queue = reorienter.seed_queue();
    let total = queue.len();
    if total == 0 {
        tracing::warn!(
            "No supported image files found under {:?}",
            reorienter.mapper().input_root()
        );
        return Ok(());
    }

    let progress = create_progress_bar(total as u64);
    let outcomes: Arc<Mutex<Vec<ItemOutcome>>> = Arc::new(Mutex::new(Vec::with_capacity(total)));

    let on_result = {
        let progress = progress.clone();
        let outcomes = Arc::clone(&outcomes);
        let start = Instant::now();
        move |outcome: ItemOutcome| {
            progress.inc(1);
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                progress.set_message(format!("{:.1} img/sec", progress.position() as f64 / elapsed));
            }
            outcomes
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(outcome);
        }
    };

    let cancel = queue.cancel_handle();
    let interrupt = {
        let progress = progress.clone();
        tokio::spawn(async move {
            let mut signals = 0;
            while tokio::signal::ctrl_c().await.is_ok() {
                signals += 1;
                match interrupt_action(signals) {
                    Interrupt::Drain => {
                        progress.suspend(|| {
                            eprintln!("\nInterrupted, waiting for in-flight images to finish...");
                            eprintln!("Press Ctrl-C again to quit immediately.");
                        });
                        let discarded = cancel.cancel();
                        tracing::info!("Cancelled, {discarded} queued images discarded");
                    }
                    Interrupt::ForceQuit => {
                        progress.suspend(|| eprintln!("\nInterrupted again, quitting now"));
                        tracing::warn!("Forced exit with images still in flight");
                        std::process::exit(FORCE_QUIT_EXIT_CODE);
                    }
                }
            }
        })
    };

    let summary = reorienter.run(queue, on_result).await;
    interrupt.abort();
    progress.finish_and_clear();

    if let Some(path) = &args.report {
        let outcomes = std::mem::take(
            &mut *outcomes
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        write_report(path, args.report_format.into(), &outcomes)?;
    }

    print_summary(&summary);
    Ok(())
}

/// Exit status after a second Ctrl-C (128 + SIGINT).
const FORCE_QUIT_EXIT_CODE: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// Stop handing out queued images and let in-flight ones finish.
    Drain,
    /// Abandon the run.
    ForceQuit,
}

/// What the `nth` Ctrl-C of a run does.
fn interrupt_action(nth: usize) -> Interrupt {
    if nth <= 1 {
        Interrupt::Drain
    } else {
        Interrupt::ForceQuit
    }
}

/// Write every outcome to `path`, sorted by input path.
fn write_report(path: &Path, format: ReportFormat, outcomes: &[ItemOutcome]) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    let mut writer = ReportWriter::new(BufWriter::new(file), format, true);
    writer.write_outcomes(outcomes)?;
    writer.flush()?;
    tracing::info!("Report with {} entries written to {:?}", writer.items_written(), path);
    Ok(())
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch processing.
fn print_summary(summary: &BatchSummary) {
    let total = summary.processed() + summary.discarded;

    eprintln!();
    eprintln!("  ====================================");
    if summary.cancelled {
        eprintln!("          Summary (cancelled)");
    } else {
        eprintln!("               Summary");
    }
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    if summary.discarded > 0 {
        eprintln!("    Discarded:    {:>8}", summary.discarded);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Workers:      {:>8}", summary.workers);
    eprintln!("    Duration:     {:>7.1}s", summary.elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", summary.rate());
    eprintln!("  ====================================");
}
