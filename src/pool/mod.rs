//! Worker execution substrate.
//!
//! The GA never touches threads directly. Each generation it hands a list of
//! partitions to a [`WorkerPool`], which runs one stateless task per
//! partition and returns the results in partition order. Shared read-only
//! data (the distance matrix) goes through [`WorkerPool::broadcast`].
//!
//! Two implementations are provided:
//!
//! - [`SequentialPool`]: runs partitions one after another on the caller's
//!   thread. Same partitioning and seeding as the threaded pool, so results
//!   are identical for the same worker count.
//! - [`ThreadPool`] (feature `parallel`): a dedicated rayon thread pool.

mod sequential;
#[cfg(feature = "parallel")]
mod threaded;

pub use sequential::SequentialPool;
#[cfg(feature = "parallel")]
pub use threaded::ThreadPool;

use crate::error::{GaError, Result};
use std::ops::Range;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Pool used by [`GaRunner::new`](crate::ga::GaRunner::new).
#[cfg(feature = "parallel")]
pub type DefaultPool = ThreadPool;

/// Pool used by [`GaRunner::new`](crate::ga::GaRunner::new).
#[cfg(not(feature = "parallel"))]
pub type DefaultPool = SequentialPool;

/// A scatter/gather execution substrate for stateless worker tasks.
///
/// Implementations must:
///
/// - run `task(worker_id, partition)` once per partition, where `worker_id`
///   is the partition's index;
/// - return results in partition order, regardless of completion order;
/// - turn any task error or panic into [`GaError::WorkerFailure`] and
///   return it instead of partial results.
pub trait WorkerPool: Send + Sync {
    /// Number of execution contexts the population is split across.
    fn worker_count(&self) -> usize;

    /// Makes read-only data available to every worker for the whole run.
    fn broadcast<T: Send + Sync>(&self, data: T) -> Arc<T> {
        Arc::new(data)
    }

    /// Runs `task` over every partition and gathers the results in order.
    fn scatter_map<I, O, F>(&self, partitions: Vec<I>, task: F) -> Result<Vec<O>>
    where
        I: Send,
        O: Send,
        F: Fn(usize, I) -> Result<O> + Sync;
}

/// Splits `len` items into `parts` contiguous ranges whose sizes differ by
/// at most one. Earlier ranges get the extra items.
///
/// ```
/// use u_genroute::pool::partition;
///
/// let ranges = partition(10, 3);
/// assert_eq!(ranges, vec![0..4, 4..7, 7..10]);
/// ```
pub fn partition(len: usize, parts: usize) -> Vec<Range<usize>> {
    if parts == 0 {
        return Vec::new();
    }
    let (k, m) = (len / parts, len % parts);
    (0..parts)
        .map(|i| {
            let start = i * k + i.min(m);
            let end = (i + 1) * k + (i + 1).min(m);
            start..end
        })
        .collect()
}

/// Splits `count` into `parts` shares that differ by at most one.
pub fn split_count(count: usize, parts: usize) -> Vec<usize> {
    partition(count, parts).into_iter().map(|r| r.len()).collect()
}

/// Runs one task, converting errors and panics into worker failures.
pub(crate) fn run_task<I, O, F>(worker_id: usize, input: I, task: &F) -> Result<O>
where
    F: Fn(usize, I) -> Result<O>,
{
    let outcome = catch_unwind(AssertUnwindSafe(|| task(worker_id, input)));
    let err = match outcome {
        Ok(Ok(out)) => return Ok(out),
        Ok(Err(e)) => GaError::worker(worker_id, e),
        Err(payload) => GaError::worker_panic(worker_id, payload.as_ref()),
    };
    tracing::error!(worker_id, error = %err, "worker task failed");
    Err(err)
}
