//! The shared work queue drained by the worker pool.
//!
//! One mutex guards the pending items and the cancelled flag together, so a
//! pop and a cancellation can never interleave. Workers only ever see
//! [`WorkQueue::pop`]; clearing the queue goes through a [`CancelHandle`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::WorkItem;

/// Result of asking the queue for the next item.
#[derive(Debug, PartialEq, Eq)]
pub enum Next {
    /// An item now owned by the caller, and how many were left behind it.
    Item { item: WorkItem, remaining: usize },
    /// The queue ran dry normally.
    Drained,
    /// The queue was cleared by cancellation.
    Cancelled,
}

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<WorkItem>,
    cancelled: bool,
    discarded: usize,
}

/// Pending items shared by all workers of one run.
#[derive(Debug, Default)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
}

impl WorkQueue {
    /// Seed a queue. Items are handed out in the order given.
    pub fn new(items: impl IntoIterator<Item = WorkItem>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: items.into_iter().collect(),
                cancelled: false,
                discarded: 0,
            }),
        }
    }

    /// Remove and return the next item.
    ///
    /// The lock is held only for the removal and the remaining-count read;
    /// it is released before this returns.
    pub fn pop(&self) -> Next {
        let mut state = self.lock();
        match state.items.pop_front() {
            Some(item) => Next::Item {
                item,
                remaining: state.items.len(),
            },
            None if state.cancelled => Next::Cancelled,
            None => Next::Drained,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Items dropped by cancellation over the queue's lifetime.
    pub fn discarded(&self) -> usize {
        self.lock().discarded
    }

    /// A handle that can cancel this queue from anywhere.
    pub fn cancel_handle(self: &Arc<Self>) -> CancelHandle {
        CancelHandle {
            queue: Arc::clone(self),
        }
    }

    /// Mark cancelled and drop every pending item; returns how many were dropped.
    fn cancel(&self) -> usize {
        let mut state = self.lock();
        state.cancelled = true;
        let discarded = state.items.len();
        state.items.clear();
        state.discarded += discarded;
        discarded
    }

    /// Pop and clear leave the state consistent at every step, so a lock
    /// poisoned by a panicking holder is still safe to use.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Cooperative cancellation for a running batch.
///
/// Cancelling clears the queue under its lock. Items already handed to a
/// worker finish normally; every later pop reports [`Next::Cancelled`].
#[derive(Debug, Clone)]
pub struct CancelHandle {
    queue: Arc<WorkQueue>,
}

impl CancelHandle {
    /// Cancel the run. Returns the number of items dropped; zero on repeat calls.
    pub fn cancel(&self) -> usize {
        let discarded = self.queue.cancel();
        tracing::debug!("Work queue cancelled, {discarded} pending items dropped");
        discarded
    }

    pub fn is_cancelled(&self) -> bool {
        self.queue.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn items(n: usize) -> Vec<WorkItem> {
        (0..n).map(|i| PathBuf::from(format!("/in/{i:05}.jpg"))).collect()
    }

    #[test]
    fn test_pop_removes_exactly_one() {
        let queue = WorkQueue::new(items(3));
        assert_eq!(queue.len(), 3);

        assert_eq!(
            queue.pop(),
            Next::Item {
                item: PathBuf::from("/in/00000.jpg"),
                remaining: 2
            }
        );
        assert_eq!(queue.len(), 2);
        assert!(matches!(queue.pop(), Next::Item { remaining: 1, .. }));
        assert!(matches!(queue.pop(), Next::Item { remaining: 0, .. }));
        assert_eq!(queue.pop(), Next::Drained);
        assert_eq!(queue.pop(), Next::Drained);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_concurrent_pops_never_duplicate_or_lose() {
        const TOTAL: usize = 10_000;
        let queue = WorkQueue::new(items(TOTAL));

        let popped: Vec<Vec<WorkItem>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        let mut mine = Vec::new();
                        while let Next::Item { item, .. } = queue.pop() {
                            mine.push(item);
                        }
                        mine
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let count: usize = popped.iter().map(Vec::len).sum();
        let unique: HashSet<_> = popped.into_iter().flatten().collect();
        assert_eq!(count, TOTAL);
        assert_eq!(unique.len(), TOTAL);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_cancel_clears_and_reports_dropped() {
        let queue = Arc::new(WorkQueue::new(items(5)));
        let handle = queue.cancel_handle();

        assert!(matches!(queue.pop(), Next::Item { .. }));
        assert_eq!(handle.cancel(), 4);
        assert!(queue.is_empty());
        assert!(handle.is_cancelled());
        assert_eq!(queue.pop(), Next::Cancelled);

        // Second cancel is a no-op
        assert_eq!(handle.cancel(), 0);
        assert_eq!(queue.discarded(), 4);
    }

    #[test]
    fn test_cancel_after_drain_still_reports_cancelled() {
        let queue = Arc::new(WorkQueue::new(items(1)));
        assert!(matches!(queue.pop(), Next::Item { .. }));
        assert_eq!(queue.pop(), Next::Drained);

        assert_eq!(queue.cancel_handle().cancel(), 0);
        assert_eq!(queue.pop(), Next::Cancelled);
    }

    #[test]
    fn test_cancel_racing_pops_accounts_for_every_item() {
        const TOTAL: usize = 5_000;
        let queue = Arc::new(WorkQueue::new(items(TOTAL)));
        let handle = queue.cancel_handle();

        let (popped, discarded) = std::thread::scope(|s| {
            let poppers: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        let mut mine = Vec::new();
                        loop {
                            match queue.pop() {
                                Next::Item { item, .. } => mine.push(item),
                                Next::Drained | Next::Cancelled => break,
                            }
                        }
                        mine
                    })
                })
                .collect();
            let discarded = handle.cancel();
            let popped: Vec<WorkItem> = poppers
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect();
            (popped, discarded)
        });

        let unique: HashSet<_> = popped.iter().collect();
        assert_eq!(unique.len(), popped.len());
        assert_eq!(popped.len() + discarded, TOTAL);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let queue = Arc::new(WorkQueue::new(items(2)));
        let poisoner = Arc::clone(&queue);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.state.lock().unwrap();
            panic!("worker died holding the queue lock");
        })
        .join();

        assert!(queue.state.is_poisoned());
        assert!(matches!(queue.pop(), Next::Item { remaining: 1, .. }));
    }
}
