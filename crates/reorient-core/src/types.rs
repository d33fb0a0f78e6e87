//! Core data types for the reorient pipeline.
//!
//! These types describe the outcome of processing one image and of a whole
//! batch run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::orientation::{Orientation, Rotation};

/// One candidate image: an absolute path under the input root.
pub type WorkItem = PathBuf;

/// The result of successfully re-orienting one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedItem {
    /// Source file
    pub input: PathBuf,

    /// File written under the output root
    pub output: PathBuf,

    /// Orientation tag found in the source, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,

    /// Counter-clockwise rotation applied
    pub rotation: Rotation,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,
}

/// A failed item and why it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub input: PathBuf,
    pub error: String,
}

/// What a worker reports after finishing an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Success(ProcessedItem),
    Failure(ItemFailure),
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Success(_))
    }

    /// The source path this outcome belongs to.
    pub fn input(&self) -> &PathBuf {
        match self {
            ItemOutcome::Success(item) => &item.input,
            ItemOutcome::Failure(failure) => &failure.input,
        }
    }
}

/// Totals for a finished batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items written successfully
    pub succeeded: usize,
    /// Items that failed (including workers that panicked mid-item)
    pub failed: usize,
    /// Items dropped from the queue by cancellation, never started
    pub discarded: usize,
    /// Whether the run was cancelled before the queue drained
    pub cancelled: bool,
    /// Number of workers the pool ran
    pub workers: usize,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Items that were actually started.
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Items processed per second.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.processed() as f64 / secs
        } else {
            0.0
        }
    }
}
