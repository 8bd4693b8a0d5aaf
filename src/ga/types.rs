//! Core data types of the routing GA.
//!
//! A [`Route`] is the chromosome: node indices starting at the fixed depot
//! `0`, followed by a permutation of `1..num_nodes`. Fitness is the negated
//! tour cost, so higher is better.

use crate::error::{GaError, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// Fitness of a route: the negative total tour cost. Higher is better.
pub type FitnessScore = f64;

/// Converts a fitness score back to a tour distance.
pub fn distance_of(score: FitnessScore) -> f64 {
    -score
}

/// A candidate tour over every node, starting at the depot.
///
/// Invariants: `nodes[0] == 0` and the remaining entries are a permutation
/// of `1..nodes.len()`. Routes are compared and hashed by exact sequence,
/// which is what population uniqueness is defined on.
///
/// # Examples
///
/// ```
/// use u_genroute::ga::Route;
///
/// let route = Route::new(vec![0, 2, 1, 3]).expect("valid route");
/// assert_eq!(route.tail(), &[2, 1, 3]);
/// assert!(Route::new(vec![1, 0, 2]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<usize>", into = "Vec<usize>")
)]
pub struct Route {
    nodes: Vec<usize>,
}

impl Route {
    /// The fixed start node of every route.
    pub const DEPOT: usize = 0;

    /// Creates a route, checking the depot and permutation invariants.
    pub fn new(nodes: Vec<usize>) -> Result<Self> {
        if !is_depot_permutation(&nodes) {
            return Err(GaError::InvalidParameter(format!(
                "route must start at node 0 and visit every node once: {nodes:?}"
            )));
        }
        Ok(Self { nodes })
    }

    /// Builds a route from its non-depot part. The tail must already be a
    /// permutation of `1..=tail.len()`.
    pub(crate) fn from_tail(tail: Vec<usize>) -> Self {
        let mut nodes = Vec::with_capacity(tail.len() + 1);
        nodes.push(Self::DEPOT);
        nodes.extend(tail);
        debug_assert!(is_depot_permutation(&nodes));
        Self { nodes }
    }

    /// Draws `[0] + shuffle(1..num_nodes)`.
    pub fn random<R: Rng + ?Sized>(num_nodes: usize, rng: &mut R) -> Self {
        let mut nodes: Vec<usize> = (0..num_nodes.max(1)).collect();
        nodes[1..].shuffle(rng);
        Self { nodes }
    }

    /// All nodes in visiting order, depot first.
    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// The variable part of the route (everything after the depot).
    pub fn tail(&self) -> &[usize] {
        &self.nodes[1..]
    }

    pub(crate) fn tail_mut(&mut self) -> &mut [usize] {
        &mut self.nodes[1..]
    }

    /// Number of nodes, depot included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a route holds at least the depot.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if this is a valid route over exactly `num_nodes` nodes.
    pub fn is_valid(&self, num_nodes: usize) -> bool {
        self.nodes.len() == num_nodes && is_depot_permutation(&self.nodes)
    }

    /// Consumes the route, returning its nodes.
    pub fn into_nodes(self) -> Vec<usize> {
        self.nodes
    }
}

impl TryFrom<Vec<usize>> for Route {
    type Error = GaError;

    fn try_from(nodes: Vec<usize>) -> Result<Self> {
        Route::new(nodes)
    }
}

impl From<Route> for Vec<usize> {
    fn from(route: Route) -> Self {
        route.nodes
    }
}

fn is_depot_permutation(nodes: &[usize]) -> bool {
    if nodes.first() != Some(&Route::DEPOT) {
        return false;
    }
    let mut seen = vec![false; nodes.len()];
    for &n in nodes {
        if n >= nodes.len() || seen[n] {
            return false;
        }
        seen[n] = true;
    }
    true
}

/// Per-run bookkeeping updated once per generation by the stagnation monitor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationState {
    /// Index of the generation last observed.
    pub generation_index: usize,

    /// Best fitness seen so far, `None` before the first evaluation.
    pub best_fitness_so_far: Option<FitnessScore>,

    /// Consecutive generations without strict improvement.
    pub stagnation_counter: usize,
}
