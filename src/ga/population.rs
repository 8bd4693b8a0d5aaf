//! Population management: unique generation, replacement and repair.
//!
//! Every route ever issued during a run is recorded in an exploration
//! archive (a `HashSet<Route>`). New individuals are drawn by rejection
//! sampling against that archive, so the engine does not reissue a genome
//! it has already explored while unexplored routes remain. Once the archive
//! covers the permutation space, [`generate_fresh`] only avoids the current
//! population.

use super::types::{FitnessScore, Route};
use crate::error::{GaError, Result};
use crate::pool::{split_count, WorkerPool};
use crate::random::{create_rng, derive_seed};
use rand::Rng;
use std::collections::HashSet;

/// Number of distinct routes over `num_nodes` nodes: `(num_nodes - 1)!`.
///
/// Saturates at `usize::MAX` for large graphs.
pub fn permutation_count(num_nodes: usize) -> usize {
    (2..num_nodes).try_fold(1usize, |acc, k| acc.checked_mul(k)).unwrap_or(usize::MAX)
}

/// Routes not yet present in an archive holding `explored` routes.
pub fn available_permutations(num_nodes: usize, explored: usize) -> usize {
    permutation_count(num_nodes).saturating_sub(explored)
}

fn ensure_available(num_nodes: usize, explored: usize, requested: usize) -> Result<()> {
    let available = available_permutations(num_nodes, explored);
    if requested > available {
        tracing::error!(requested, available, num_nodes, "permutation space exhausted");
        return Err(GaError::PopulationGenerationExhausted {
            requested,
            available,
        });
    }
    Ok(())
}

/// Generates `count` routes that are absent from `exclusion` and distinct
/// from each other, then records them in `exclusion`.
///
/// Each candidate is `[0] + shuffle(1..num_nodes)`; candidates already in
/// the archive are rejected and redrawn.
///
/// Returns [`GaError::PopulationGenerationExhausted`] up front when fewer
/// than `count` unexplored permutations remain, instead of sampling forever.
///
/// # Examples
///
/// ```
/// use std::collections::HashSet;
/// use u_genroute::ga::population::generate_unique;
/// use u_genroute::random::create_rng;
///
/// let mut archive = HashSet::new();
/// let mut rng = create_rng(1);
/// let routes = generate_unique(&mut archive, 5, 5, &mut rng).expect("24 routes available");
/// assert_eq!(routes.len(), 5);
/// assert_eq!(archive.len(), 5);
/// ```
pub fn generate_unique<R: Rng + ?Sized>(
    exclusion: &mut HashSet<Route>,
    count: usize,
    num_nodes: usize,
    rng: &mut R,
) -> Result<Vec<Route>> {
    ensure_available(num_nodes, exclusion.len(), count)?;

    let mut routes = Vec::with_capacity(count);
    while routes.len() < count {
        let candidate = Route::random(num_nodes, rng);
        if exclusion.insert(candidate.clone()) {
            routes.push(candidate);
        }
    }
    Ok(routes)
}

/// Generates `count` routes absent from `current`, preferring routes that
/// were never explored.
///
/// Draws against the whole archive while enough unexplored permutations
/// remain. Otherwise it falls back to avoiding only `current`. Either way
/// the new routes are recorded in `exclusion`. `current` must be a subset
/// of `exclusion`.
pub fn generate_fresh<R: Rng + ?Sized>(
    exclusion: &mut HashSet<Route>,
    current: &HashSet<Route>,
    count: usize,
    num_nodes: usize,
    rng: &mut R,
) -> Result<Vec<Route>> {
    if count <= available_permutations(num_nodes, exclusion.len()) {
        return generate_unique(exclusion, count, num_nodes, rng);
    }
    tracing::debug!(
        count,
        explored = exclusion.len(),
        "exploration archive exhausted, drawing outside the current population"
    );
    let mut taken = current.clone();
    let routes = generate_unique(&mut taken, count, num_nodes, rng)?;
    exclusion.extend(routes.iter().cloned());
    Ok(routes)
}

/// Parallel variant of [`generate_unique`].
///
/// `count` is split into one share per worker. Each worker samples against
/// a read-only view of the archive with its own generator seeded from
/// `(seed, generation, worker_id)`. Shares are merged in worker order,
/// duplicates between workers are dropped, and any shortfall is topped up
/// sequentially with `rng`.
pub fn parallel_generate_unique<P, R>(
    pool: &P,
    exclusion: &mut HashSet<Route>,
    count: usize,
    num_nodes: usize,
    seed: u64,
    generation: usize,
    rng: &mut R,
) -> Result<Vec<Route>>
where
    P: WorkerPool,
    R: Rng + ?Sized,
{
    ensure_available(num_nodes, exclusion.len(), count)?;

    let shares = split_count(count, pool.worker_count());
    let archive: &HashSet<Route> = &*exclusion;
    let gathered = pool.scatter_map(shares, |worker_id, share| {
        let mut rng = create_rng(derive_seed(seed, generation as u64, worker_id as u64));
        let mut local = HashSet::with_capacity(share);
        let mut routes = Vec::with_capacity(share);
        while routes.len() < share {
            let candidate = Route::random(num_nodes, &mut rng);
            if !archive.contains(&candidate) && local.insert(candidate.clone()) {
                routes.push(candidate);
            }
        }
        Ok(routes)
    })?;

    let mut routes = Vec::with_capacity(count);
    for candidate in gathered.into_iter().flatten() {
        if exclusion.insert(candidate.clone()) {
            routes.push(candidate);
        }
    }

    let shortfall = count - routes.len();
    if shortfall > 0 {
        tracing::debug!(shortfall, "cross-worker duplicates dropped, topping up");
        routes.extend(generate_unique(exclusion, shortfall, num_nodes, rng)?);
    }
    Ok(routes)
}

/// Overwrites the worst individuals with `offspring`.
///
/// Individuals are ranked by ascending fitness (worst first, ties by
/// position) and the first `offspring.len()` are replaced. Returns how many
/// were replaced; extra offspring beyond the population size are dropped.
pub fn replace_worst(
    population: &mut [Route],
    scores: &[FitnessScore],
    offspring: Vec<Route>,
) -> usize {
    debug_assert_eq!(population.len(), scores.len());
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut replaced = 0;
    for (idx, child) in order.into_iter().zip(offspring) {
        population[idx] = child;
        replaced += 1;
    }
    replaced
}

/// Collapses `population` to its unique members (first occurrence wins)
/// and tops it back up to `target` with routes distinct from every member.
///
/// Top-ups come from [`generate_fresh`], so they avoid the archive while it
/// has room and only the surviving members once it is exhausted.
pub fn dedupe_and_repair<R: Rng + ?Sized>(
    population: Vec<Route>,
    target: usize,
    exclusion: &mut HashSet<Route>,
    num_nodes: usize,
    rng: &mut R,
) -> Result<Vec<Route>> {
    let mut seen = HashSet::with_capacity(population.len());
    let mut unique: Vec<Route> = population
        .into_iter()
        .filter(|r| seen.insert(r.clone()))
        .collect();
    unique.truncate(target);

    let current: HashSet<Route> = unique.iter().cloned().collect();
    exclusion.extend(current.iter().cloned());

    let deficit = target - unique.len();
    if deficit > 0 {
        tracing::debug!(deficit, "repairing population after dedupe");
        unique.extend(generate_fresh(exclusion, &current, deficit, num_nodes, rng)?);
    }
    Ok(unique)
}
