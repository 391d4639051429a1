//! Bounded-concurrency batch runner with per-item retry.
//!
//! Every submitted item ends up in exactly one of the two partitions of a
//! [`BatchOutcome`]. A failing item never stops the rest of the batch.

use crate::config::RetryPolicy;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};
use tokio_retry::RetryIf;
use tracing::{debug, warn};

/// Called with `(completed, total)` each time an item settles.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct Succeeded<I, T> {
    pub item: I,
    pub value: T,
    pub attempts: u32,
}

#[derive(Debug, Clone)]
pub struct Failed<I> {
    pub item: I,
    pub error: String,
    pub attempts: u32,
}

#[derive(Debug)]
enum Settled<T> {
    Succeeded { value: T, attempts: u32 },
    Failed { error: String, attempts: u32 },
}

/// Both outcomes of a batch, each in submission order.
#[derive(Debug)]
pub struct BatchOutcome<I, T> {
    pub succeeded: Vec<Succeeded<I, T>>,
    pub failed: Vec<Failed<I>>,
}

impl<I, T> Default for BatchOutcome<I, T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<I, T> BatchOutcome<I, T> {
    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Executor {
    concurrency: usize,
    retry: RetryPolicy,
    progress_callback: Option<ProgressCallback>,
}

impl Executor {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            retry: RetryPolicy::default(),
            progress_callback: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs `worker` over every item with at most `concurrency` invocations
    /// in flight. Failed invocations are retried on the configured schedule.
    ///
    /// Dropping the returned future aborts any work still running.
    pub async fn run<I, T, E, W, Fut>(&self, items: Vec<I>, worker: W) -> BatchOutcome<I, T>
    where
        I: Clone + fmt::Debug + Send + Sync + 'static,
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
        W: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let total = items.len();
        debug!(
            "Running {} items with concurrency {} and up to {} retries",
            total, self.concurrency, self.retry.max_retries
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let worker = Arc::new(worker);
        let mut tasks = JoinSet::new();
        let mut task_slots: HashMap<Id, (usize, Arc<AtomicU32>)> = HashMap::new();

        for (index, item) in items.iter().cloned().enumerate() {
            let semaphore = semaphore.clone();
            let worker = worker.clone();
            let retry = self.retry;
            let attempts = Arc::new(AtomicU32::new(0));
            let task_attempts = attempts.clone();

            let handle = tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (
                        index,
                        Settled::Failed {
                            error: "executor shut down before the item started".to_string(),
                            attempts: 0,
                        },
                    );
                };

                let outcome = RetryIf::start(
                    retry.delays(),
                    || {
                        task_attempts.fetch_add(1, Ordering::SeqCst);
                        (*worker)(item.clone())
                    },
                    |error: &E| {
                        warn!(
                            "Attempt {} for {:?} failed: {}",
                            task_attempts.load(Ordering::SeqCst),
                            item,
                            error
                        );
                        true
                    },
                )
                .await;

                let attempts = task_attempts.load(Ordering::SeqCst);
                let settled = match outcome {
                    Ok(value) => Settled::Succeeded { value, attempts },
                    Err(error) => Settled::Failed {
                        error: error.to_string(),
                        attempts,
                    },
                };
                (index, settled)
            });
            task_slots.insert(handle.id(), (index, attempts));
        }

        let mut slots: Vec<Option<Settled<T>>> = (0..total).map(|_| None).collect();
        let mut completed = 0;

        while let Some(joined) = tasks.join_next().await {
            let (index, settled) = match joined {
                Ok(pair) => pair,
                Err(join_error) => {
                    let Some((index, attempts)) = task_slots.get(&join_error.id()) else {
                        continue;
                    };
                    warn!("Worker for item {} did not finish: {}", index, join_error);
                    let error = if join_error.is_panic() {
                        format!("worker panicked: {}", join_error)
                    } else {
                        format!("worker cancelled: {}", join_error)
                    };
                    (
                        *index,
                        Settled::Failed {
                            error,
                            attempts: attempts.load(Ordering::SeqCst),
                        },
                    )
                }
            };

            slots[index] = Some(settled);
            completed += 1;
            if let Some(ref callback) = self.progress_callback {
                callback(completed, total);
            }
        }

        let mut outcome = BatchOutcome::default();
        for (item, slot) in items.into_iter().zip(slots) {
            match slot {
                Some(Settled::Succeeded { value, attempts }) => outcome.succeeded.push(Succeeded {
                    item,
                    value,
                    attempts,
                }),
                Some(Settled::Failed { error, attempts }) => {
                    outcome.failed.push(Failed { item, error, attempts })
                }
                None => outcome.failed.push(Failed {
                    item,
                    error: "worker did not report a result".to_string(),
                    attempts: 0,
                }),
            }
        }

        debug!(
            "Batch settled: {} succeeded, {} failed",
            outcome.succeeded.len(),
            outcome.failed.len()
        );
        outcome
    }
}
