//! Rayon-backed worker pool.

use super::{run_task, WorkerPool};
use crate::error::{GaError, Result};
use rayon::prelude::*;

/// A dedicated rayon thread pool with one thread per worker.
///
/// The pool is private to the runner, so GA work never competes with the
/// global rayon pool. `scatter_map` blocks until every partition is done,
/// which gives the generation barrier.
pub struct ThreadPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl ThreadPool {
    /// Starts a pool with `workers` threads.
    pub fn with_workers(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(GaError::InvalidParameter(
                "worker_count must be at least 1".into(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("genroute-worker-{i}"))
            .build()
            .map_err(|e| GaError::PoolInit(e.to_string()))?;
        tracing::debug!(workers, "worker thread pool started");
        Ok(Self { pool, workers })
    }
}

impl std::fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPool")
            .field("workers", &self.workers)
            .finish()
    }
}

impl WorkerPool for ThreadPool {
    fn worker_count(&self) -> usize {
        self.workers
    }

    fn scatter_map<I, O, F>(&self, partitions: Vec<I>, task: F) -> Result<Vec<O>>
    where
        I: Send,
        O: Send,
        F: Fn(usize, I) -> Result<O> + Sync,
    {
        let task = &task;
        let gathered: Vec<Result<O>> = self.pool.install(|| {
            partitions
                .into_par_iter()
                .enumerate()
                .map(|(id, part)| run_task(id, part, task))
                .collect()
        });
        gathered.into_iter().collect()
    }
}
