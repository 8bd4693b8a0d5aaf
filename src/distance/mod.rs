//! Distance matrices.
//!
//! Provides the dense, read-only distance matrix shared by every worker
//! during a run.

mod matrix;

pub use matrix::{DistanceMatrix, INFEASIBLE_DISTANCE};
