//! Parallel execution of per-document work using Rayon.
//!
//! # Design
//!
//! - `WorkerScaler` turns the configured concurrency into a worker count
//! - `ParallelExecutor` runs one job per document, sequentially or on a dedicated pool
//! - `run_with_timeout` bounds a single job by wall-clock time
//!
//! Cancellation is checked before a job starts; a job that has started
//! always runs to completion.

use rayon::prelude::*;
use std::sync::mpsc;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::error::DocumentError;

/// Configuration for worker scaling.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Requested worker count (0 = one per available CPU)
    pub requested: usize,
    /// Hard upper bound regardless of request
    pub max_workers: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            requested: 1,
            max_workers: 64,
        }
    }
}

/// Calculates the worker count for a scan.
#[derive(Debug)]
pub struct WorkerScaler {
    config: WorkerConfig,
}

impl WorkerScaler {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    /// Scaler for a requested concurrency value.
    pub fn for_concurrency(requested: usize) -> Self {
        Self::new(WorkerConfig {
            requested,
            ..WorkerConfig::default()
        })
    }

    /// Workers to use for `document_count` documents.
    ///
    /// Never more than the document count, never less than one.
    pub fn calculate_workers(&self, document_count: usize) -> usize {
        let requested = if self.config.requested == 0 {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        } else {
            self.config.requested
        };

        requested
            .min(self.config.max_workers)
            .min(document_count)
            .max(1)
    }
}

/// Runs one job per item with a fixed number of workers.
pub struct ParallelExecutor<'a> {
    worker_count: usize,
    cancel: &'a CancelToken,
}

impl<'a> ParallelExecutor<'a> {
    pub fn new(worker_count: usize, cancel: &'a CancelToken) -> Self {
        Self {
            worker_count: worker_count.max(1),
            cancel,
        }
    }

    /// Run `job` on every item.
    ///
    /// Returns one slot per item in input order; `None` marks an item that
    /// was skipped because cancellation was requested before it started.
    pub fn execute<T, R, F>(&self, items: Vec<T>, job: F) -> Vec<Option<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        if items.is_empty() {
            return Vec::new();
        }

        // One worker or one item: no thread pool needed
        if self.worker_count == 1 || items.len() == 1 {
            return self.execute_sequential(items, &job);
        }

        self.execute_parallel(items, &job)
    }

    fn execute_sequential<T, R, F>(&self, items: Vec<T>, job: &F) -> Vec<Option<R>>
    where
        F: Fn(T) -> R,
    {
        items
            .into_iter()
            .map(|item| {
                if self.cancel.is_cancelled() {
                    None
                } else {
                    Some(job(item))
                }
            })
            .collect()
    }

    fn execute_parallel<T, R, F>(&self, items: Vec<T>, job: &F) -> Vec<Option<R>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        // Build dedicated thread pool with specified worker count
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_count)
            .thread_name(|i| format!("docsift-worker-{}", i))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create thread pool, processing sequentially");
                return self.execute_sequential(items, job);
            }
        };

        let cancel = self.cancel;
        pool.install(|| {
            items
                .into_par_iter()
                .map(|item| {
                    if cancel.is_cancelled() {
                        None
                    } else {
                        Some(job(item))
                    }
                })
                .collect()
        })
    }
}

/// Run `job` on a helper thread and wait at most `timeout` for it.
///
/// `None` runs the job inline without a time limit. A job that overruns is
/// abandoned: its thread keeps running detached and its result is dropped.
pub fn run_with_timeout<T, F>(timeout: Option<Duration>, job: F) -> Result<T, DocumentError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let Some(timeout) = timeout else {
        return Ok(job());
    };

    let (tx, rx) = mpsc::channel();
    let spawned = std::thread::Builder::new()
        .name("docsift-extract".to_string())
        .spawn(move || {
            // The receiver is gone once the caller timed out
            let _ = tx.send(job());
        });

    if let Err(e) = spawned {
        tracing::warn!(error = %e, "Failed to spawn extraction thread");
        return Err(DocumentError::WorkerLost);
    }

    match rx.recv_timeout(timeout) {
        Ok(value) => Ok(value),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(DocumentError::TimedOut(timeout)),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(DocumentError::WorkerLost),
    }
}
