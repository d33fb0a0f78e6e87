//! The worker pool that drains a [`WorkQueue`].
//!
//! Each worker runs on tokio's blocking pool and loops: pop one item under
//! the queue lock, release it, process the item, report the outcome. A
//! worker stops when the queue is drained or has been cancelled. Every
//! worker is spawned before the first is awaited, and `run` returns only
//! once all of them have stopped.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::types::{BatchSummary, ItemFailure, ItemOutcome};

use super::processor::ItemProcessor;
use super::queue::{Next, WorkQueue};

/// How a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerExit {
    /// Observed an empty queue
    Done,
    /// Observed a cancelled queue
    Aborted,
}

#[derive(Debug)]
struct WorkerReport {
    succeeded: usize,
    failed: usize,
    exit: WorkerExit,
}

/// A fixed-size pool of blocking workers.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Create a pool. A count of zero is treated as one.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Drain `queue` through `processor`.
    ///
    /// `on_result` is called from worker threads once per finished item, in
    /// completion order. Cancelling the queue stops new items from starting;
    /// items already running still finish and are reported.
    pub async fn run<P, F>(
        &self,
        queue: Arc<WorkQueue>,
        processor: Arc<P>,
        on_result: F,
    ) -> BatchSummary
    where
        P: ItemProcessor,
        F: Fn(ItemOutcome) + Send + Sync + 'static,
    {
        let start = Instant::now();
        let on_result = Arc::new(on_result);
        tracing::debug!(
            "Starting {} workers for {} items",
            self.workers,
            queue.len()
        );

        let mut handles = Vec::with_capacity(self.workers);
        for id in 0..self.workers {
            let queue = Arc::clone(&queue);
            let processor = Arc::clone(&processor);
            let on_result = Arc::clone(&on_result);
            handles.push(tokio::task::spawn_blocking(move || {
                worker_loop(id, &queue, processor.as_ref(), on_result.as_ref())
            }));
        }

        let mut summary = BatchSummary {
            workers: self.workers,
            ..Default::default()
        };
        let mut aborted = 0;
        let mut panicked = 0;
        for handle in handles {
            match handle.await {
                Ok(report) => {
                    summary.succeeded += report.succeeded;
                    summary.failed += report.failed;
                    if report.exit == WorkerExit::Aborted {
                        aborted += 1;
                    }
                }
                Err(e) => {
                    panicked += 1;
                    tracing::error!("Worker task panicked: {e}");
                }
            }
        }
        if aborted > 0 {
            tracing::debug!("{aborted} of {} workers stopped on cancellation", self.workers);
        }
        if panicked > 0 {
            tracing::warn!("{panicked} of {} workers died before the queue drained", self.workers);
        }

        summary.cancelled = queue.is_cancelled();
        summary.discarded = queue.discarded();
        summary.elapsed = start.elapsed();
        summary
    }
}

fn worker_loop<P, F>(id: usize, queue: &WorkQueue, processor: &P, on_result: &F) -> WorkerReport
where
    P: ItemProcessor,
    F: Fn(ItemOutcome),
{
    let mut succeeded = 0;
    let mut failed = 0;

    let exit = loop {
        // The queue lock is held only inside pop()
        let item = match queue.pop() {
            Next::Item { item, remaining } => {
                tracing::trace!(worker = id, remaining, "Took {:?}", item);
                item
            }
            Next::Drained => break WorkerExit::Done,
            Next::Cancelled => break WorkerExit::Aborted,
        };

        let outcome = match catch_unwind(AssertUnwindSafe(|| processor.process(&item))) {
            Ok(Ok(processed)) => ItemOutcome::Success(processed),
            Ok(Err(e)) => {
                tracing::error!("Failed: {:?} - {}", item, e);
                ItemOutcome::Failure(ItemFailure {
                    input: item,
                    error: e.to_string(),
                })
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("Panicked while processing {:?}: {}", item, message);
                ItemOutcome::Failure(ItemFailure {
                    input: item,
                    error: format!("processing panicked: {message}"),
                })
            }
        };

        if outcome.is_success() {
            succeeded += 1;
        } else {
            failed += 1;
        }
        on_result(outcome);
    };

    tracing::debug!(worker = id, ?exit, succeeded, failed, "Worker stopped");
    WorkerReport {
        succeeded,
        failed,
        exit,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
