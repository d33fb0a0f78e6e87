//! reorient core - batch EXIF orientation correction.
//!
//! Reads each image's EXIF orientation tag, rotates the pixels so the image
//! displays upright without metadata, and writes the result into an output
//! tree that mirrors the input tree.
//!
//! # Architecture
//!
//! ```text
//! Discover → WorkQueue → WorkerPool ─┬─ worker: pop → Validate → Orientation → Decode → Rotate → Encode
//!                                    └─ worker: ...
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use reorient_core::{Config, Reorienter};
//!
//! #[tokio::main]
//! async fn main() -> reorient_core::Result<()> {
//!     let reorienter = Reorienter::new(Config::load()?, "./photos".as_ref(), "./fixed".as_ref())?;
//!     let queue = reorienter.seed_queue();
//!     let summary = reorienter.run(queue, |outcome| println!("{outcome:?}")).await;
//!     println!("{} rotated, {} failed", summary.succeeded, summary.failed);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod orientation;
pub mod paths;
pub mod pipeline;
pub mod report;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, ReorientError, Result};
pub use orientation::{Orientation, Rotation};
pub use paths::{OutputClaims, PathMapper};
pub use pipeline::{
    CancelHandle, DiscoveredFile, FileDiscovery, ImageProcessor, ItemProcessor, WorkQueue,
    WorkerPool,
};
pub use report::{ReportFormat, ReportWriter};
pub use types::{BatchSummary, ItemFailure, ItemOutcome, ProcessedItem, WorkItem};

use std::path::Path;
use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scheduler for one batch run: discovers inputs, seeds the queue and
/// drives the worker pool.
pub struct Reorienter {
    config: Config,
    discovery: FileDiscovery,
    processor: Arc<ImageProcessor>,
}

impl Reorienter {
    /// Validate the configuration and both roots.
    ///
    /// Every configuration error surfaces here, before any file is written.
    pub fn new(config: Config, input: &Path, output: &Path) -> Result<Self> {
        config.validate()?;
        let mapper = PathMapper::new(input, output, config.output.force_png)?;
        tracing::debug!(
            "Mapping {:?} -> {:?} (force png: {})",
            mapper.input_root(),
            mapper.output_root(),
            mapper.force_png()
        );

        Ok(Self {
            discovery: FileDiscovery::new(config.processing.clone()),
            processor: Arc::new(ImageProcessor::new(&config, mapper)),
            config,
        })
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mapper(&self) -> &PathMapper {
        self.processor.mapper()
    }

    /// Find every supported image under the input root.
    pub fn discover(&self) -> Vec<DiscoveredFile> {
        self.discovery.discover(self.mapper().input_root())
    }

    /// Discover inputs and load them into a fresh queue.
    ///
    /// Output ownership is settled here, in discovery order: an input whose
    /// output path is already claimed stays queued but fails without writing.
    pub fn seed_queue(&self) -> Arc<WorkQueue> {
        let files = self.discover();
        tracing::info!(
            "Found {} images ({} bytes) under {:?}",
            files.len(),
            FileDiscovery::total_size(&files),
            self.mapper().input_root()
        );

        let claims = OutputClaims::build(self.mapper(), files.iter().map(|f| f.path.as_path()));
        if claims.collisions() > 0 {
            tracing::warn!(
                "{} images share an output path with an earlier one and will be skipped",
                claims.collisions()
            );
        }
        self.processor.set_claims(claims);

        Arc::new(WorkQueue::new(files.into_iter().map(|f| f.path)))
    }

    /// Drain `queue` with the configured number of workers.
    ///
    /// Cancel through `queue.cancel_handle()` to stop early; the returned
    /// summary says whether that happened.
    pub async fn run<F>(&self, queue: Arc<WorkQueue>, on_result: F) -> BatchSummary
    where
        F: Fn(ItemOutcome) + Send + Sync + 'static,
    {
        let pool = WorkerPool::new(self.config.processing.worker_count());
        pool.run(queue, Arc::clone(&self.processor), on_result).await
    }
}
