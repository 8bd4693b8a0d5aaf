//! Stagnation detection and population regeneration.
//!
//! The [`StagnationMonitor`] observes the best fitness of every generation.
//! After `limit` consecutive generations without strict improvement it asks
//! the coordinator to regenerate instead of reproducing, and [`regenerate`]
//! rebuilds the population according to a [`RegenerationPolicy`].

use super::population::{available_permutations, generate_fresh, parallel_generate_unique};
use super::types::{FitnessScore, GenerationState, Route};
use crate::error::Result;
use crate::pool::WorkerPool;
use rand::Rng;
use std::collections::HashSet;

/// How the population is rebuilt when stagnation fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegenerationPolicy {
    /// Keep only the single best individual.
    #[default]
    FullReset,

    /// Keep the top 10% (at least one) by fitness.
    Elitist,
}

impl RegenerationPolicy {
    /// Number of individuals carried over from a population of `population_size`.
    pub fn survivors(self, population_size: usize) -> usize {
        let keep = match self {
            RegenerationPolicy::FullReset => 1,
            RegenerationPolicy::Elitist => (population_size / 10).max(1),
        };
        keep.min(population_size)
    }
}

/// Outcome of observing one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagnationStatus {
    /// The best fitness strictly improved; the counter was reset.
    Improving,

    /// No improvement, limit not reached yet.
    Stagnating,

    /// The limit was reached; the counter was reset and this generation
    /// regenerates instead of reproducing.
    Regenerate,
}

/// Tracks improvement across generations.
///
/// A `limit` of zero disables regeneration.
///
/// # Examples
///
/// ```
/// use u_genroute::ga::{StagnationMonitor, StagnationStatus};
///
/// let mut monitor = StagnationMonitor::new(2);
/// assert_eq!(monitor.observe(0, -10.0), StagnationStatus::Improving);
/// assert_eq!(monitor.observe(1, -10.0), StagnationStatus::Stagnating);
/// assert_eq!(monitor.observe(2, -12.0), StagnationStatus::Regenerate);
/// assert_eq!(monitor.state().stagnation_counter, 0);
/// ```
#[derive(Debug, Clone)]
pub struct StagnationMonitor {
    limit: usize,
    state: GenerationState,
}

impl StagnationMonitor {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            state: GenerationState::default(),
        }
    }

    /// Records `current_best` for `generation` and decides what to do next.
    pub fn observe(&mut self, generation: usize, current_best: FitnessScore) -> StagnationStatus {
        self.state.generation_index = generation;

        let improved = match self.state.best_fitness_so_far {
            Some(best) => current_best > best,
            None => true,
        };
        if improved {
            self.state.best_fitness_so_far = Some(current_best);
            self.state.stagnation_counter = 0;
            return StagnationStatus::Improving;
        }

        self.state.stagnation_counter += 1;
        if self.limit > 0 && self.state.stagnation_counter >= self.limit {
            self.state.stagnation_counter = 0;
            StagnationStatus::Regenerate
        } else {
            StagnationStatus::Stagnating
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Rebuilds `population` under `policy`.
///
/// The survivors are the best individuals by descending fitness (ties keep
/// the earlier position) and lead the returned population. The rest is
/// drawn across the pool and avoids every route in `exclusion`. Once the
/// archive has no room left, the rest is drawn on the calling thread and
/// only avoids the survivors.
#[allow(clippy::too_many_arguments)]
pub fn regenerate<P, R>(
    pool: &P,
    population: &[Route],
    scores: &[FitnessScore],
    policy: RegenerationPolicy,
    exclusion: &mut HashSet<Route>,
    num_nodes: usize,
    seed: u64,
    generation: usize,
    rng: &mut R,
) -> Result<Vec<Route>>
where
    P: WorkerPool,
    R: Rng + ?Sized,
{
    debug_assert_eq!(population.len(), scores.len());
    let size = population.len();
    let keep = policy.survivors(size);

    let mut order: Vec<usize> = (0..size).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut next: Vec<Route> = order[..keep]
        .iter()
        .map(|&i| population[i].clone())
        .collect();
    exclusion.extend(next.iter().cloned());

    let wanted = size - keep;
    let fresh = if wanted <= available_permutations(num_nodes, exclusion.len()) {
        parallel_generate_unique(pool, exclusion, wanted, num_nodes, seed, generation, rng)?
    } else {
        let survivors: HashSet<Route> = next.iter().cloned().collect();
        generate_fresh(exclusion, &survivors, wanted, num_nodes, rng)?
    };
    tracing::info!(
        generation,
        ?policy,
        kept = keep,
        regenerated = fresh.len(),
        "population regenerated"
    );
    next.extend(fresh);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::SequentialPool;
    use crate::random::create_rng;

    #[test]
    fn test_first_observation_improves() {
        let mut m = StagnationMonitor::new(3);
        assert_eq!(m.observe(0, -100.0), StagnationStatus::Improving);
        assert_eq!(m.state().best_fitness_so_far, Some(-100.0));
    }

    #[test]
    fn test_counter_resets_on_strict_improvement() {
        let mut m = StagnationMonitor::new(5);
        m.observe(0, -100.0);
        assert_eq!(m.observe(1, -100.0), StagnationStatus::Stagnating);
        assert_eq!(m.observe(2, -120.0), StagnationStatus::Stagnating);
        assert_eq!(m.state().stagnation_counter, 2);
        assert_eq!(m.observe(3, -90.0), StagnationStatus::Improving);
        assert_eq!(m.state().stagnation_counter, 0);
        assert_eq!(m.state().generation_index, 3);
    }

    #[test]
    fn test_best_so_far_is_monotonic() {
        let mut m = StagnationMonitor::new(0);
        let mut prev = f64::NEG_INFINITY;
        for (g, f) in [-50.0, -60.0, -40.0, -45.0, -30.0].into_iter().enumerate() {
            m.observe(g, f);
            let best = m.state().best_fitness_so_far.unwrap_or(f64::NEG_INFINITY);
            assert!(best >= prev);
            prev = best;
        }
        assert_eq!(prev, -30.0);
    }

    #[test]
    fn test_fires_at_limit_then_resets() {
        let mut m = StagnationMonitor::new(3);
        m.observe(0, -10.0);
        assert_eq!(m.observe(1, -10.0), StagnationStatus::Stagnating);
        assert_eq!(m.observe(2, -10.0), StagnationStatus::Stagnating);
        assert_eq!(m.observe(3, -10.0), StagnationStatus::Regenerate);
        // never on the very next generation for limit >= 2
        assert_eq!(m.observe(4, -10.0), StagnationStatus::Stagnating);
    }

    #[test]
    fn test_limit_one_fires_every_flat_generation() {
        let mut m = StagnationMonitor::new(1);
        m.observe(0, -10.0);
        assert_eq!(m.observe(1, -10.0), StagnationStatus::Regenerate);
        assert_eq!(m.observe(2, -10.0), StagnationStatus::Regenerate);
    }

    #[test]
    fn test_zero_limit_disables() {
        let mut m = StagnationMonitor::new(0);
        m.observe(0, -10.0);
        for g in 1..50 {
            assert_eq!(m.observe(g, -10.0), StagnationStatus::Stagnating);
        }
    }

    #[test]
    fn test_survivor_counts() {
        assert_eq!(RegenerationPolicy::FullReset.survivors(100), 1);
        assert_eq!(RegenerationPolicy::Elitist.survivors(100), 10);
        assert_eq!(RegenerationPolicy::Elitist.survivors(6), 1);
        assert_eq!(RegenerationPolicy::Elitist.survivors(0), 0);
    }

    fn setup(n: usize, size: usize) -> (Vec<Route>, Vec<FitnessScore>, HashSet<Route>) {
        let mut rng = create_rng(1);
        let mut archive = HashSet::new();
        let pop = crate::ga::population::generate_unique(&mut archive, size, n, &mut rng)
            .expect("space");
        let scores = (0..size).map(|i| -(i as f64) - 1.0).collect();
        (pop, scores, archive)
    }

    #[test]
    fn test_full_reset_keeps_best() {
        let pool = SequentialPool::with_workers(2).expect("pool");
        let (pop, scores, mut archive) = setup(7, 20);
        let mut rng = create_rng(2);
        let next = regenerate(
            &pool,
            &pop,
            &scores,
            RegenerationPolicy::FullReset,
            &mut archive,
            7,
            9,
            3,
            &mut rng,
        )
        .expect("ok");
        assert_eq!(next.len(), 20);
        assert_eq!(next[0], pop[0]);
        // everything else is new
        assert!(next[1..].iter().all(|r| !pop.contains(r)));
        assert_eq!(archive.len(), 39);
    }

    #[test]
    fn test_elitist_keeps_top_tenth() {
        let pool = SequentialPool::with_workers(3).expect("pool");
        let (pop, mut scores, mut archive) = setup(7, 30);
        scores.reverse(); // best are now at the end
        let mut rng = create_rng(2);
        let next = regenerate(
            &pool,
            &pop,
            &scores,
            RegenerationPolicy::Elitist,
            &mut archive,
            7,
            9,
            3,
            &mut rng,
        )
        .expect("ok");
        assert_eq!(next.len(), 30);
        assert_eq!(&next[..3], &[pop[29].clone(), pop[28].clone(), pop[27].clone()]);
        let unique: HashSet<_> = next.iter().cloned().collect();
        assert_eq!(unique.len(), 30);
    }

    #[test]
    fn test_regenerate_with_exhausted_archive() {
        // 5 nodes => 24 routes, every one already explored
        let pool = SequentialPool::with_workers(2).expect("pool");
        let mut rng = create_rng(4);
        let mut archive = HashSet::new();
        let all = crate::ga::population::generate_unique(&mut archive, 24, 5, &mut rng)
            .expect("ok");
        let pop: Vec<Route> = all[..6].to_vec();
        let scores: Vec<FitnessScore> = (0..6).map(|i| -(i as f64)).collect();

        let next = regenerate(
            &pool,
            &pop,
            &scores,
            RegenerationPolicy::FullReset,
            &mut archive,
            5,
            1,
            2,
            &mut rng,
        )
        .expect("fallback");
        assert_eq!(next.len(), 6);
        assert_eq!(next[0], pop[0]);
        let unique: HashSet<_> = next.iter().cloned().collect();
        assert_eq!(unique.len(), 6);
        assert!(next.iter().all(|r| r.is_valid(5)));
        assert_eq!(archive.len(), 24);
    }
}
