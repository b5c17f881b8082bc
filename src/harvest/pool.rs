//! Bounded worker pool
//!
//! A fixed number of workers share one work list. Each worker claims the next
//! item through an atomic cursor and runs the task on it, so at most `workers`
//! tasks are in flight no matter how long the list is.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::HarvestError;

/// Outcome counts of a pool run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Items whose task returned `Ok`
    pub completed: usize,

    /// Items whose task returned an error
    pub failed: usize,

    /// Workers that panicked; their in-flight item is lost
    pub panicked: usize,
}

#[derive(Debug, Default)]
struct WorkerTally {
    completed: usize,
    failed: usize,
}

/// Run `task` over every item with at most `workers` concurrent tasks.
///
/// Task errors are logged and counted; they never stop the other items.
/// Dropping the returned future aborts every worker still running.
pub async fn run_pool<T, F, Fut>(items: Vec<T>, workers: usize, task: F) -> PoolReport
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HarvestError>> + Send + 'static,
{
    let total = items.len();
    let worker_count = workers.max(1).min(total);
    debug!("Starting {} workers for {} items", worker_count, total);

    let items: Arc<[T]> = items.into();
    let cursor = Arc::new(AtomicUsize::new(0));
    let task = Arc::new(task);

    let mut set = JoinSet::new();
    for _ in 0..worker_count {
        let items = items.clone();
        let cursor = cursor.clone();
        let task = task.clone();

        set.spawn(async move {
            let mut tally = WorkerTally::default();
            loop {
                let index = cursor.fetch_add(1, Ordering::Relaxed);
                let Some(item) = items.get(index) else {
                    break;
                };

                match (*task)(item.clone()).await {
                    Ok(()) => tally.completed += 1,
                    Err(e) => {
                        warn!("Work item {} skipped: {}", index, e);
                        tally.failed += 1;
                    }
                }
            }
            tally
        });
    }

    let mut report = PoolReport::default();
    while let Some(result) = set.join_next().await {
        match result {
            Ok(tally) => {
                report.completed += tally.completed;
                report.failed += tally.failed;
            }
            Err(e) => {
                warn!("Worker task failed: {}", e);
                report.panicked += 1;
            }
        }
    }

    report
}
