//! Permutation operators on route tails.
//!
//! All operators work on the variable (non-depot) part of a route; the depot
//! at index 0 is never touched.
//!
//! # Crossover
//!
//! - [`order_crossover`] (OX): Davis (1985), with a repair step for
//!   corrupted parents
//!
//! # Mutation
//!
//! - [`MutationOperator::Swap`]: exchange two distinct positions, O(1)
//! - [`MutationOperator::Invert`]: reverse a random segment (2-opt), O(n)
//! - [`MutationOperator::Insert`]: move one gene to another position, O(n)
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use super::types::Route;
use crate::error::{GaError, Result};
use rand::seq::index;
use rand::Rng;

// ============================================================================
// Crossover
// ============================================================================

/// Order Crossover (OX) on route tails.
///
/// Both parents are the non-depot part of a route, a permutation of
/// `1..num_nodes`. Returns the child tail; the caller re-attaches the depot.
///
/// # Algorithm
///
/// 1. Repair: drop stray depot genes from each parent and append any gene
///    of `1..num_nodes` that is missing, in ascending order
/// 2. Pick two distinct cut points `start < end` in `0..num_nodes-1`
/// 3. Copy `parent1[start..=end]` into the same child slots
/// 4. Walk `parent2` from its first gene and place every gene not yet in
///    the child into the next free slot, starting after `end` and wrapping
/// 5. Fill any slot still free with the unused genes in ascending order;
///    this only happens on corrupted input and is logged as a defect
///
/// # Errors
///
/// - [`GaError::InvalidParameter`] if `num_nodes < 3`
/// - [`GaError::CrossoverInvariantViolation`] if the child is still not a
///   permutation of `1..num_nodes` after the fallback
///
/// # Examples
///
/// ```
/// use u_genroute::ga::operators::order_crossover;
/// use u_genroute::random::create_rng;
///
/// let mut rng = create_rng(42);
/// let child = order_crossover(&[1, 2, 3, 4, 5], &[5, 4, 3, 2, 1], 6, &mut rng).unwrap();
/// let mut sorted = child.clone();
/// sorted.sort();
/// assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
/// ```
pub fn order_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    num_nodes: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if num_nodes < 3 {
        return Err(GaError::InvalidParameter(format!(
            "order crossover needs at least 3 nodes, got {num_nodes}"
        )));
    }
    let size = num_nodes - 1;
    let p1 = repair_parent(parent1, num_nodes);
    let p2 = repair_parent(parent2, num_nodes);

    let (start, end) = distinct_cuts(size, rng);
    ox_with_cuts(&p1, &p2, num_nodes, start, end)
}

/// OX on repaired parents with fixed cut points `start < end < num_nodes - 1`.
fn ox_with_cuts(
    p1: &[usize],
    p2: &[usize],
    num_nodes: usize,
    start: usize,
    end: usize,
) -> Result<Vec<usize>> {
    let size = num_nodes - 1;
    let mut child: Vec<Option<usize>> = vec![None; size];
    let mut placed = vec![false; num_nodes];

    for i in start..=end {
        let gene = p1[i];
        child[i] = Some(gene);
        if gene < num_nodes {
            placed[gene] = true;
        }
    }

    let mut free = size - (end - start + 1);
    let mut pos = (end + 1) % size;
    for &gene in p2 {
        if free == 0 {
            break;
        }
        if gene == Route::DEPOT || gene >= num_nodes || placed[gene] {
            continue;
        }
        while child[pos].is_some() {
            pos = (pos + 1) % size;
        }
        child[pos] = Some(gene);
        placed[gene] = true;
        free -= 1;
        pos = (pos + 1) % size;
    }

    if free > 0 {
        tracing::error!(
            free,
            start,
            end,
            "order crossover left slots unfilled, falling back to unused genes"
        );
        let missing: Vec<usize> = (1..num_nodes).filter(|&g| !placed[g]).collect();
        if missing.len() < free {
            return Err(violation(
                "no unused genes left to fill offspring",
                child.into_iter().flatten().collect(),
            ));
        }
        for (slot, gene) in child.iter_mut().filter(|s| s.is_none()).zip(missing) {
            *slot = Some(gene);
        }
    }

    let offspring: Vec<usize> = child.into_iter().flatten().collect();
    if !is_tail_permutation(&offspring, num_nodes) {
        return Err(violation("offspring is not a permutation of 1..num_nodes", offspring));
    }
    Ok(offspring)
}

fn violation(reason: &str, offspring: Vec<usize>) -> GaError {
    tracing::error!(reason, ?offspring, "crossover invariant violated");
    GaError::CrossoverInvariantViolation {
        reason: reason.to_string(),
        offspring,
    }
}

/// Drops depot genes and appends missing genes in ascending order.
fn repair_parent(tail: &[usize], num_nodes: usize) -> Vec<usize> {
    let mut present = vec![false; num_nodes];
    let mut repaired: Vec<usize> = tail
        .iter()
        .copied()
        .filter(|&g| g != Route::DEPOT)
        .inspect(|&g| {
            if g < num_nodes {
                present[g] = true;
            }
        })
        .collect();

    let before = repaired.len();
    repaired.extend((1..num_nodes).filter(|&g| !present[g]));
    if repaired.len() != before || before != tail.len() {
        tracing::warn!(?tail, "repaired corrupted crossover parent");
    }
    repaired
}

/// Returns `true` if `tail` holds each of `1..num_nodes` exactly once.
pub fn is_tail_permutation(tail: &[usize], num_nodes: usize) -> bool {
    if tail.len() + 1 != num_nodes {
        return false;
    }
    let mut seen = vec![false; num_nodes];
    for &g in tail {
        if g == Route::DEPOT || g >= num_nodes || seen[g] {
            return false;
        }
        seen[g] = true;
    }
    true
}

// ============================================================================
// Mutation
// ============================================================================

/// Perturbation applied to an offspring's tail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MutationOperator {
    /// Exchange two distinct non-depot positions.
    #[default]
    Swap,

    /// Reverse a random non-depot segment (2-opt move).
    Invert,

    /// Remove one non-depot gene and reinsert it elsewhere.
    Insert,
}

impl MutationOperator {
    /// Applies the operator to a tail in place.
    pub fn apply<R: Rng + ?Sized>(self, tail: &mut [usize], rng: &mut R) {
        match self {
            MutationOperator::Swap => swap_mutation(tail, rng),
            MutationOperator::Invert => invert_mutation(tail, rng),
            MutationOperator::Insert => insert_mutation(tail, rng),
        }
    }
}

/// With probability `mutation_rate`, perturbs the route's tail with
/// `operator`; otherwise returns it unchanged.
pub fn mutate<R: Rng + ?Sized>(
    mut route: Route,
    mutation_rate: f64,
    operator: MutationOperator,
    rng: &mut R,
) -> Route {
    if rng.random_range(0.0..1.0) < mutation_rate {
        operator.apply(route.tail_mut(), rng);
    }
    route
}

/// Swap mutation: exchange two distinct positions.
pub fn swap_mutation<R: Rng + ?Sized>(perm: &mut [usize], rng: &mut R) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let mut j = rng.random_range(0..n - 1);
    if j >= i {
        j += 1;
    }
    perm.swap(i, j);
}

/// Invert mutation: reverse the segment between two distinct cut points.
pub fn invert_mutation<R: Rng + ?Sized>(perm: &mut [usize], rng: &mut R) {
    if perm.len() < 2 {
        return;
    }
    let (start, end) = distinct_cuts(perm.len(), rng);
    perm[start..=end].reverse();
}

/// Insert mutation: move the gene at one position to another position,
/// shifting the genes in between.
pub fn insert_mutation<R: Rng + ?Sized>(perm: &mut [usize], rng: &mut R) {
    if perm.len() < 2 {
        return;
    }
    let (a, b) = distinct_cuts(perm.len(), rng);
    if rng.random_bool(0.5) {
        // move a forward to b
        perm[a..=b].rotate_left(1);
    } else {
        // move b back to a
        perm[a..=b].rotate_right(1);
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Two distinct positions in `0..n`, sorted. Requires `n >= 2`.
fn distinct_cuts<R: Rng + ?Sized>(n: usize, rng: &mut R) -> (usize, usize) {
    let picks = index::sample(rng, n, 2);
    let (a, b) = (picks.index(0), picks.index(1));
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Tests
// ============================================================================
