//! Error taxonomy for a routing GA run.
//!
//! Every failure is treated as a configuration or programming defect:
//! nothing here is retried, and any error aborts the run.

/// Errors raised while configuring or executing a GA run.
#[derive(Debug, thiserror::Error)]
pub enum GaError {
    /// A configuration value is out of range or inconsistent with the problem.
    #[error("InvalidParameter: {0}")]
    InvalidParameter(String),

    /// Order crossover produced something other than a permutation of the
    /// non-depot genes, even after the repair fallback.
    #[error("CrossoverInvariantViolation: {reason}, offspring={offspring:?}")]
    CrossoverInvariantViolation {
        reason: String,
        offspring: Vec<usize>,
    },

    /// A dispatched partition failed. The whole generation is discarded.
    #[error("WorkerFailure: worker_id={worker_id}, reason={reason}")]
    WorkerFailure {
        worker_id: usize,
        reason: String,
        #[source]
        source: Option<Box<GaError>>,
    },

    /// Not enough unexplored permutations remain to satisfy a request.
    #[error("PopulationGenerationExhausted: requested={requested}, available={available}")]
    PopulationGenerationExhausted { requested: usize, available: usize },

    /// The worker thread pool could not be started.
    #[error("PoolInit: {0}")]
    PoolInit(String),
}

impl GaError {
    /// Wraps an error raised inside worker `worker_id`.
    pub fn worker(worker_id: usize, source: GaError) -> Self {
        GaError::WorkerFailure {
            worker_id,
            reason: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Builds a [`GaError::WorkerFailure`] for a worker that panicked.
    pub fn worker_panic(worker_id: usize, payload: &(dyn std::any::Any + Send)) -> Self {
        let reason = if let Some(msg) = payload.downcast_ref::<&str>() {
            format!("panicked: {msg}")
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            format!("panicked: {msg}")
        } else {
            "panicked".to_string()
        };
        GaError::WorkerFailure {
            worker_id,
            reason,
            source: None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GaError>;
