//! In-thread worker pool.

use super::{run_task, WorkerPool};
use crate::error::{GaError, Result};

/// Runs every partition on the calling thread, in partition order.
///
/// Useful for debugging and for targets without threads. The population is
/// still split into `worker_count` partitions, so a run reproduces the one
/// produced by [`ThreadPool`](super::ThreadPool) with the same worker count
/// and seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequentialPool {
    workers: usize,
}

impl SequentialPool {
    /// Creates a pool that emulates `workers` execution contexts.
    pub fn with_workers(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(GaError::InvalidParameter(
                "worker_count must be at least 1".into(),
            ));
        }
        Ok(Self { workers })
    }
}

impl Default for SequentialPool {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

impl WorkerPool for SequentialPool {
    fn worker_count(&self) -> usize {
        self.workers
    }

    fn scatter_map<I, O, F>(&self, partitions: Vec<I>, task: F) -> Result<Vec<O>>
    where
        I: Send,
        O: Send,
        F: Fn(usize, I) -> Result<O> + Sync,
    {
        partitions
            .into_iter()
            .enumerate()
            .map(|(id, part)| run_task(id, part, &task))
            .collect()
    }
}
