//! Distributed genetic algorithm for permutation-encoded routing.
//!
//! Evolves tours over a fixed node graph (a Traveling-Salesman-style
//! problem) to minimize total traversal cost:
//!
//! - **Unique populations**: every individual is distinct, and routes
//!   already explored during a run are never reissued.
//! - **Parallel evaluation and breeding**: each generation scatters the
//!   population over a [`pool::WorkerPool`] and gathers results in order.
//! - **Tournament selection, order crossover, mutation**: the classic
//!   permutation GA operators, operating only on the non-depot genes.
//! - **Stagnation-driven regeneration**: after a configurable number of
//!   flat generations the population is rebuilt around its best members.
//!
//! # Example
//!
//! ```
//! use u_genroute::distance::DistanceMatrix;
//! use u_genroute::ga::{GaConfig, GaRunner};
//!
//! let points = [
//!     (0.0, 0.0), (4.0, 0.0), (4.0, 3.0), (0.0, 3.0), (2.0, 5.0),
//!     (2.0, -2.0), (6.0, 1.5), (-2.0, 1.5), (5.0, 5.0),
//! ];
//! let config = GaConfig::default()
//!     .with_population_size(40)
//!     .with_num_tournaments(6)
//!     .with_tournament_size(4)
//!     .with_worker_count(2)
//!     .with_num_generations(20)
//!     .with_seed(7);
//!
//! let runner = GaRunner::new(DistanceMatrix::from_points(&points), config).unwrap();
//! let result = runner.run().unwrap();
//! assert!(result.best_route.is_valid(9));
//! assert!(result.total_distance > 0.0);
//! ```
//!
//! # Architecture
//!
//! - [`distance`]: read-only cost matrix with an infeasibility sentinel
//! - [`ga`]: routes, operators, stagnation monitor and the [`ga::GaRunner`]
//!   coordinator
//! - [`pool`]: scatter/gather execution (sequential or rayon-backed)
//! - [`random`]: seeded generators and per-worker seed derivation
//! - [`error`]: the [`GaError`] taxonomy

pub mod distance;
pub mod error;
pub mod ga;
pub mod pool;
pub mod random;

pub use error::{GaError, Result};
