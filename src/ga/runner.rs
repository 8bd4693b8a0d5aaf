//! Generational loop execution.
//!
//! [`GaRunner`] is the coordinator. It owns the canonical population and
//! drives, per generation:
//! evaluate → check stagnation → (regenerate | reproduce) → replace → repair.
//!
//! Reproduction is scattered over a [`WorkerPool`]: the population is split
//! into one contiguous partition per worker, each worker runs
//! selection → crossover → mutation on its partition alone, and the
//! coordinator gathers the offspring in partition order.

use super::config::GaConfig;
use super::fitness::{best_index, evaluate_parallel};
use super::operators::{mutate, order_crossover};
use super::population::{dedupe_and_repair, parallel_generate_unique, replace_worst};
use super::report::{GenerationReport, RunObserver, TracingObserver};
use super::selection::tournament_select;
use super::stagnation::{regenerate, StagnationMonitor, StagnationStatus};
use super::types::{distance_of, FitnessScore, Route};
use crate::distance::DistanceMatrix;
use crate::error::{GaError, Result};
use crate::pool::{partition, DefaultPool, WorkerPool};
use crate::random::{create_rng, derive_seed};
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// The best route found.
    pub best_route: Route,

    /// Fitness of `best_route` (negated distance).
    pub best_fitness: FitnessScore,

    /// Total tour distance of `best_route`.
    pub total_distance: f64,

    /// Number of generations executed.
    pub generations: usize,

    /// Number of generations that regenerated instead of reproducing.
    pub regenerations: usize,

    /// Wall-clock time of the whole run.
    pub elapsed: Duration,

    /// Best fitness evaluated at each generation.
    pub fitness_history: Vec<FitnessScore>,

    /// One report per generation.
    pub reports: Vec<GenerationReport>,
}

/// Executes the routing GA over a distance matrix.
///
/// # Usage
///
/// ```
/// use u_genroute::distance::DistanceMatrix;
/// use u_genroute::ga::{GaConfig, GaRunner};
/// use u_genroute::pool::SequentialPool;
///
/// let points = [
///     (0.0, 0.0), (3.0, 0.0), (3.0, 4.0), (0.0, 4.0),
///     (1.5, 6.0), (5.0, 2.0), (-2.0, 2.0), (1.5, -2.0),
/// ];
/// let config = GaConfig::default()
///     .with_population_size(12)
///     .with_num_tournaments(4)
///     .with_tournament_size(3)
///     .with_worker_count(2)
///     .with_num_generations(5)
///     .with_seed(42);
/// let pool = SequentialPool::with_workers(2).unwrap();
/// let runner = GaRunner::with_pool(DistanceMatrix::from_points(&points), config, pool).unwrap();
/// let result = runner.run_with_observer(&mut ()).unwrap();
/// assert_eq!(result.best_route.nodes()[0], 0);
/// assert_eq!(result.generations, 5);
/// ```
pub struct GaRunner<P: WorkerPool = DefaultPool> {
    distances: Arc<DistanceMatrix>,
    config: GaConfig,
    pool: P,
    initial_routes: Vec<Route>,
}

impl GaRunner<DefaultPool> {
    /// Creates a runner on the default pool with `config.worker_count` workers.
    ///
    /// # Errors
    ///
    /// [`GaError::InvalidParameter`] if the configuration does not fit the
    /// matrix, [`GaError::PoolInit`] if the pool cannot be started.
    pub fn new(distances: DistanceMatrix, config: GaConfig) -> Result<Self> {
        config.validate(distances.size())?;
        let pool = DefaultPool::with_workers(config.worker_count)?;
        Self::with_pool(distances, config, pool)
    }
}

impl<P: WorkerPool> GaRunner<P> {
    /// Creates a runner on a caller-supplied pool.
    ///
    /// The pool's worker count overrides `config.worker_count`.
    pub fn with_pool(distances: DistanceMatrix, mut config: GaConfig, pool: P) -> Result<Self> {
        if config.worker_count != pool.worker_count() {
            tracing::debug!(
                configured = config.worker_count,
                pool = pool.worker_count(),
                "worker count taken from pool"
            );
            config.worker_count = pool.worker_count();
        }
        config.validate(distances.size())?;
        let distances = pool.broadcast(distances);
        Ok(Self {
            distances,
            config,
            pool,
            initial_routes: Vec::new(),
        })
    }

    /// Seeds the initial population with known routes.
    ///
    /// Duplicates are dropped and at most `population_size` routes are used;
    /// the rest of the population is generated.
    ///
    /// # Errors
    ///
    /// [`GaError::InvalidParameter`] if a route does not cover the matrix's
    /// nodes starting at the depot.
    pub fn with_initial_routes(mut self, routes: Vec<Route>) -> Result<Self> {
        let num_nodes = self.distances.size();
        if let Some(bad) = routes.iter().find(|r| !r.is_valid(num_nodes)) {
            return Err(GaError::InvalidParameter(format!(
                "initial route {:?} is not a route over {num_nodes} nodes",
                bad.nodes()
            )));
        }
        self.initial_routes = routes;
        Ok(self)
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// The matrix this runner scores routes against.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Runs the GA, logging progress through `tracing`.
    pub fn run(&self) -> Result<GaResult> {
        self.run_with_observer(&mut TracingObserver)
    }

    /// Runs the GA, reporting every generation and the final result to
    /// `observer`.
    ///
    /// # Errors
    ///
    /// Any worker failure, crossover invariant violation or exhausted
    /// permutation space aborts the run.
    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(
            num_nodes = self.distances.size(),
            population = self.config.population_size,
            workers = self.pool.worker_count(),
            generations = self.config.num_generations,
        )
    )]
    pub fn run_with_observer<O: RunObserver>(&self, observer: &mut O) -> Result<GaResult> {
        let start = Instant::now();
        let cfg = &self.config;
        let num_nodes = self.distances.size();

        let seed = cfg.seed.unwrap_or_else(rand::random);
        tracing::info!(seed, "run started");
        let mut rng = create_rng(seed);
        // breeding and regeneration use separate worker streams
        let regen_seed = !seed;

        let mut archive: HashSet<Route> = HashSet::with_capacity(cfg.population_size * 2);
        let mut population = self.initial_population(&mut archive, regen_seed, &mut rng)?;

        let mut monitor = StagnationMonitor::new(cfg.stagnation_limit);
        let mut fitness_history = Vec::with_capacity(cfg.num_generations);
        let mut reports = Vec::with_capacity(cfg.num_generations);
        let mut regenerations = 0;
        let mut best_ever: Option<(Route, FitnessScore)> = None;

        for generation in 0..cfg.num_generations {
            let scores = self.evaluate(&population)?;
            let best = best_of(&scores)?;
            let current_best = scores[best];
            let best_route = population[best].clone();
            fitness_history.push(current_best);
            if best_ever.as_ref().map_or(true, |(_, f)| current_best > *f) {
                best_ever = Some((best_route.clone(), current_best));
            }

            let status = monitor.observe(generation, current_best);
            let regenerated = status == StagnationStatus::Regenerate;

            population = if regenerated {
                regenerations += 1;
                regenerate(
                    &self.pool,
                    &population,
                    &scores,
                    cfg.regeneration_policy,
                    &mut archive,
                    num_nodes,
                    regen_seed,
                    generation,
                    &mut rng,
                )?
            } else {
                let offspring = self.reproduce(&population, &scores, seed, generation)?;
                tracing::debug!(generation, offspring = offspring.len(), "offspring gathered");
                archive.extend(offspring.iter().cloned());
                replace_worst(&mut population, &scores, offspring);
                dedupe_and_repair(
                    population,
                    cfg.population_size,
                    &mut archive,
                    num_nodes,
                    &mut rng,
                )?
            };

            let state = monitor.state();
            let report = GenerationReport {
                generation,
                current_best_fitness: current_best,
                best_fitness_so_far: state.best_fitness_so_far.unwrap_or(current_best),
                stagnation_counter: state.stagnation_counter,
                regenerated,
                best_route,
                population_size: population.len(),
            };
            observer.on_generation(&report);
            reports.push(report);
        }

        let scores = self.evaluate(&population)?;
        let best = best_of(&scores)?;
        let (best_route, best_fitness) = match best_ever {
            Some((route, fitness)) if fitness > scores[best] => (route, fitness),
            _ => (population[best].clone(), scores[best]),
        };

        let result = GaResult {
            total_distance: distance_of(best_fitness),
            best_route,
            best_fitness,
            generations: cfg.num_generations,
            regenerations,
            elapsed: start.elapsed(),
            fitness_history,
            reports,
        };
        observer.on_complete(&result);
        Ok(result)
    }

    fn evaluate(&self, population: &[Route]) -> Result<Vec<FitnessScore>> {
        evaluate_parallel(
            &self.pool,
            population,
            &self.distances,
            self.config.infeasible_penalty,
        )
    }

    /// Seeded routes first, then fresh unique routes up to the target size.
    fn initial_population<R: Rng + ?Sized>(
        &self,
        archive: &mut HashSet<Route>,
        stream_seed: u64,
        rng: &mut R,
    ) -> Result<Vec<Route>> {
        let size = self.config.population_size;
        let mut population = Vec::with_capacity(size);
        for route in &self.initial_routes {
            if population.len() == size {
                break;
            }
            if archive.insert(route.clone()) {
                population.push(route.clone());
            }
        }
        if !population.is_empty() {
            tracing::debug!(seeded = population.len(), "initial routes injected");
        }

        // generation 0 never regenerates, so its slot of the stream is free
        let fresh = parallel_generate_unique(
            &self.pool,
            archive,
            size - population.len(),
            self.distances.size(),
            stream_seed,
            0,
            rng,
        )?;
        population.extend(fresh);
        Ok(population)
    }

    /// Scatters the population and gathers every worker's offspring.
    fn reproduce(
        &self,
        population: &[Route],
        scores: &[FitnessScore],
        seed: u64,
        generation: usize,
    ) -> Result<Vec<Route>> {
        let partitions: Vec<(&[Route], &[FitnessScore])> =
            partition(population.len(), self.pool.worker_count())
                .into_iter()
                .map(|range| (&population[range.clone()], &scores[range]))
                .collect();
        let config = &self.config;
        let num_nodes = self.distances.size();

        let gathered = self.pool.scatter_map(partitions, |worker_id, (routes, scores)| {
            let mut rng = create_rng(derive_seed(seed, generation as u64, worker_id as u64));
            breed_partition(routes, scores, config, num_nodes, &mut rng)
        })?;
        Ok(gathered.into_iter().flatten().collect())
    }
}

/// One worker's share of a generation: tournament selection over its
/// partition, then one offspring per consecutive parent pair.
///
/// An odd trailing parent is ignored.
fn breed_partition<R: Rng + ?Sized>(
    routes: &[Route],
    scores: &[FitnessScore],
    config: &GaConfig,
    num_nodes: usize,
    rng: &mut R,
) -> Result<Vec<Route>> {
    let parents = tournament_select(
        routes,
        scores,
        config.num_tournaments,
        config.tournament_size,
        rng,
    )?;
    parents
        .chunks_exact(2)
        .map(|pair| {
            let tail = order_crossover(pair[0].tail(), pair[1].tail(), num_nodes, rng)?;
            Ok(mutate(
                Route::from_tail(tail),
                config.mutation_rate,
                config.mutation_operator,
                rng,
            ))
        })
        .collect()
}

fn best_of(scores: &[FitnessScore]) -> Result<usize> {
    best_index(scores)
        .ok_or_else(|| GaError::InvalidParameter("cannot rank an empty population".into()))
}

// ============================================================================
// Tests
// ============================================================================
