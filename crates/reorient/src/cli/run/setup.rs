//! Run setup: CLI overrides on top of the loaded config, root validation.

use reorient_core::{paths::expand_tilde, Config, Reorienter};

use super::RunArgs;

/// Validate the roots, apply overrides and build the scheduler.
pub fn setup_reorienter(args: &RunArgs, mut config: Config) -> anyhow::Result<Reorienter> {
    let input = expand_tilde(&args.input);
    if !input.exists() {
        anyhow::bail!(
            "Input directory does not exist: {:?}\n\n  Hint: Check the path and try again.",
            args.input
        );
    }
    if !input.is_dir() {
        anyhow::bail!(
            "Input path is not a directory: {:?}\n\n  Hint: Pass the folder that contains the images.",
            args.input
        );
    }

    apply_overrides(&mut config, args);
    tracing::debug!(
        "Workers: {}, force png: {}",
        config.processing.worker_count(),
        config.output.force_png
    );

    Ok(Reorienter::new(config, &input, &args.output)?)
}

/// Apply command-line flags to the config. Flags win over the file.
pub fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if args.keep_format {
        config.output.force_png = false;
    }
    if args.single_thread {
        config.processing.parallel_workers = Some(1);
    } else if let Some(workers) = args.workers {
        config.processing.parallel_workers = Some(workers);
    }
}
