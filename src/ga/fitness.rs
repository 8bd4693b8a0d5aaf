//! Route fitness evaluation.
//!
//! Fitness is the negated closed-tour cost. A route that uses any edge
//! carrying the matrix sentinel scores `-infeasible_penalty` instead.

use super::types::{FitnessScore, Route};
use crate::distance::DistanceMatrix;
use crate::error::Result;
use crate::pool::{partition, WorkerPool};

/// Scores a single route.
///
/// Walks consecutive node pairs and sums their distances, then adds the
/// closing edge back to the first node. The walk stops at the first
/// infeasible edge.
///
/// # Examples
///
/// ```
/// use u_genroute::distance::DistanceMatrix;
/// use u_genroute::ga::{fitness::route_fitness, Route};
///
/// let dm = DistanceMatrix::from_points(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
/// let route = Route::new(vec![0, 1, 2, 3]).expect("valid");
/// assert!((route_fitness(&route, &dm, 1e6) + 4.0).abs() < 1e-10);
/// ```
pub fn route_fitness(
    route: &Route,
    distances: &DistanceMatrix,
    infeasible_penalty: f64,
) -> FitnessScore {
    let nodes = route.nodes();
    let mut total = 0.0;
    for pair in nodes.windows(2) {
        if distances.is_infeasible(pair[0], pair[1]) {
            return -infeasible_penalty;
        }
        total += distances.get(pair[0], pair[1]);
    }

    if let (Some(&last), Some(&first)) = (nodes.last(), nodes.first()) {
        if distances.is_infeasible(last, first) {
            return -infeasible_penalty;
        }
        total += distances.get(last, first);
    }
    -total
}

/// Scores `routes` in order on the calling thread.
pub fn evaluate(
    routes: &[Route],
    distances: &DistanceMatrix,
    infeasible_penalty: f64,
) -> Vec<FitnessScore> {
    routes
        .iter()
        .map(|r| route_fitness(r, distances, infeasible_penalty))
        .collect()
}

/// Scores `routes` across the worker pool.
///
/// The routes are split into one contiguous chunk per worker (sizes differ
/// by at most one) and the chunk results are concatenated in chunk order,
/// so `result[i]` always belongs to `routes[i]`.
pub fn evaluate_parallel<P: WorkerPool>(
    pool: &P,
    routes: &[Route],
    distances: &DistanceMatrix,
    infeasible_penalty: f64,
) -> Result<Vec<FitnessScore>> {
    let chunks: Vec<&[Route]> = partition(routes.len(), pool.worker_count())
        .into_iter()
        .map(|range| &routes[range])
        .collect();

    let gathered = pool.scatter_map(chunks, |_, chunk| {
        Ok(evaluate(chunk, distances, infeasible_penalty))
    })?;

    let scores: Vec<FitnessScore> = gathered.into_iter().flatten().collect();
    debug_assert_eq!(scores.len(), routes.len());
    Ok(scores)
}

/// Index of the best (highest) score. Ties keep the earliest index.
pub fn best_index(scores: &[FitnessScore]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, FitnessScore)>, (i, &s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        })
        .map(|(i, _)| i)
}
