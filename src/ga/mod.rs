//! Genetic algorithm for permutation-encoded routes.
//!
//! A route visits every node of a [`DistanceMatrix`](crate::distance::DistanceMatrix)
//! once, starting at the fixed depot `0`. The GA keeps a population of
//! pairwise-distinct routes and improves it generation by generation,
//! spreading the work over a [`WorkerPool`](crate::pool::WorkerPool).
//!
//! # Key Types
//!
//! - [`Route`]: Chromosome, depot first, then a permutation of the other nodes
//! - [`GaConfig`]: Algorithm parameters (population, tournaments, regeneration)
//! - [`GaRunner`]: Executes the generational loop
//! - [`GaResult`]: Best route, distance and per-generation history
//! - [`StagnationMonitor`]: Triggers regeneration after flat generations
//!
//! # Submodules
//!
//! - [`population`]: Unique generation, worst replacement, dedupe and repair
//! - [`fitness`]: Closed-tour cost with infeasibility penalty
//! - [`selection`]: Tournament selection without replacement
//! - [`operators`]: Order crossover and swap / invert / insert mutation
//! - [`stagnation`]: Stagnation detection and regeneration policies
//! - [`report`]: Per-generation reports and run observers
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"

mod config;
pub mod fitness;
pub mod operators;
pub mod population;
pub mod report;
mod runner;
pub mod selection;
pub mod stagnation;
mod types;

pub use config::GaConfig;
pub use operators::MutationOperator;
pub use report::{GenerationReport, RunObserver, TracingObserver};
pub use runner::{GaResult, GaRunner};
pub use stagnation::{RegenerationPolicy, StagnationMonitor, StagnationStatus};
pub use types::{distance_of, FitnessScore, GenerationState, Route};
