//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the generational loop.

use super::operators::MutationOperator;
use super::population::permutation_count;
use super::stagnation::RegenerationPolicy;
use crate::error::{GaError, Result};

/// Configuration for the routing GA.
///
/// # Defaults
///
/// ```
/// use u_genroute::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 10_000);
/// assert_eq!(config.num_generations, 200);
/// assert_eq!(config.worker_count, 6);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_genroute::ga::{GaConfig, RegenerationPolicy};
///
/// let config = GaConfig::default()
///     .with_population_size(500)
///     .with_num_tournaments(40)
///     .with_tournament_size(20)
///     .with_regeneration_policy(RegenerationPolicy::Elitist)
///     .with_seed(7);
/// assert!(config.validate(12).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of routes kept in the population.
    ///
    /// Must not exceed the number of distinct routes, `(num_nodes - 1)!`.
    pub population_size: usize,

    /// Tournaments run by each worker per generation.
    ///
    /// Winners are paired, so each worker yields `num_tournaments / 2`
    /// offspring.
    pub num_tournaments: usize,

    /// Individuals sampled (without replacement) per tournament.
    pub tournament_size: usize,

    /// Probability of mutating an offspring (0.0–1.0).
    pub mutation_rate: f64,

    /// Perturbation applied when an offspring mutates.
    pub mutation_operator: MutationOperator,

    /// Number of generations to run.
    pub num_generations: usize,

    /// Cost assigned to a route that uses an infeasible edge.
    ///
    /// The route's fitness becomes `-infeasible_penalty`.
    pub infeasible_penalty: f64,

    /// Consecutive non-improving generations before regeneration.
    ///
    /// Set to 0 to disable regeneration.
    pub stagnation_limit: usize,

    /// How the population is rebuilt when stagnation fires.
    pub regeneration_policy: RegenerationPolicy,

    /// Number of workers the population is partitioned across.
    pub worker_count: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` draws a random seed, which is logged at run start.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 10_000,
            num_tournaments: 500,
            tournament_size: 1_000,
            mutation_rate: 0.2,
            mutation_operator: MutationOperator::default(),
            num_generations: 200,
            infeasible_penalty: 1e6,
            stagnation_limit: 5,
            regeneration_policy: RegenerationPolicy::default(),
            worker_count: 6,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of tournaments per worker.
    pub fn with_num_tournaments(mut self, n: usize) -> Self {
        self.num_tournaments = n;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation operator.
    pub fn with_mutation_operator(mut self, op: MutationOperator) -> Self {
        self.mutation_operator = op;
        self
    }

    /// Sets the number of generations.
    pub fn with_num_generations(mut self, n: usize) -> Self {
        self.num_generations = n;
        self
    }

    /// Sets the penalty for infeasible routes.
    pub fn with_infeasible_penalty(mut self, penalty: f64) -> Self {
        self.infeasible_penalty = penalty;
        self
    }

    /// Sets the stagnation limit (0 to disable).
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the regeneration policy.
    pub fn with_regeneration_policy(mut self, policy: RegenerationPolicy) -> Self {
        self.regeneration_policy = policy;
        self
    }

    /// Sets the number of workers.
    pub fn with_worker_count(mut self, n: usize) -> Self {
        self.worker_count = n;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for quick runs. Validates from 7 nodes.
    ///
    /// - Population: 200, Generations: 100
    /// - 20 tournaments of size 10 per worker, 2 workers
    /// - Stagnation limit: 10
    pub fn fast() -> Self {
        Self {
            population_size: 200,
            num_tournaments: 20,
            tournament_size: 10,
            num_generations: 100,
            stagnation_limit: 10,
            worker_count: 2,
            ..Self::default()
        }
    }

    /// Offspring produced per generation across all workers.
    pub fn offspring_per_generation(&self) -> usize {
        self.worker_count * (self.num_tournaments / 2)
    }

    /// Validates the configuration against a graph of `num_nodes` nodes.
    ///
    /// # Errors
    ///
    /// [`GaError::InvalidParameter`] describing the first violated rule.
    pub fn validate(&self, num_nodes: usize) -> Result<()> {
        let invalid = |msg: String| Err(GaError::InvalidParameter(msg));

        if num_nodes < 3 {
            return invalid(format!("num_nodes must be at least 3, got {num_nodes}"));
        }
        if self.population_size < 2 {
            return invalid("population_size must be at least 2".into());
        }
        let space = permutation_count(num_nodes);
        if self.population_size > space {
            return invalid(format!(
                "population_size {} exceeds the {space} distinct routes over {num_nodes} nodes",
                self.population_size
            ));
        }
        if self.worker_count == 0 || self.worker_count > self.population_size {
            return invalid(format!(
                "worker_count must be in 1..={}, got {}",
                self.population_size, self.worker_count
            ));
        }
        let smallest_partition = self.population_size / self.worker_count;
        if self.tournament_size == 0 || self.tournament_size > smallest_partition {
            return invalid(format!(
                "tournament_size must be in 1..={smallest_partition} (smallest worker partition), got {}",
                self.tournament_size
            ));
        }
        if self.num_tournaments < 2 {
            return invalid("num_tournaments must be at least 2 to form a parent pair".into());
        }
        if self.offspring_per_generation() >= self.population_size {
            return invalid(format!(
                "{} offspring per generation must be fewer than population_size {}",
                self.offspring_per_generation(),
                self.population_size
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return invalid(format!(
                "mutation_rate must be in [0, 1], got {}",
                self.mutation_rate
            ));
        }
        if !self.infeasible_penalty.is_finite() || self.infeasible_penalty <= 0.0 {
            return invalid(format!(
                "infeasible_penalty must be finite and positive, got {}",
                self.infeasible_penalty
            ));
        }
        if self.num_generations == 0 {
            return invalid("num_generations must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GaConfig {
        GaConfig::default()
            .with_population_size(6)
            .with_num_tournaments(2)
            .with_tournament_size(2)
            .with_worker_count(2)
            .with_num_generations(3)
    }

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.population_size, 10_000);
        assert_eq!(config.num_tournaments, 500);
        assert_eq!(config.tournament_size, 1_000);
        assert!((config.mutation_rate - 0.2).abs() < 1e-10);
        assert_eq!(config.mutation_operator, MutationOperator::Swap);
        assert_eq!(config.num_generations, 200);
        assert!((config.infeasible_penalty - 1e6).abs() < 1e-6);
        assert_eq!(config.stagnation_limit, 5);
        assert_eq!(config.regeneration_policy, RegenerationPolicy::FullReset);
        assert_eq!(config.worker_count, 6);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_default_valid_for_large_graph() {
        // 6 workers * 250 offspring = 1500 < 10_000; partition 1666 >= 1000
        assert!(GaConfig::default().validate(20).is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(300)
            .with_num_tournaments(10)
            .with_tournament_size(5)
            .with_mutation_rate(0.05)
            .with_mutation_operator(MutationOperator::Invert)
            .with_num_generations(40)
            .with_infeasible_penalty(500.0)
            .with_stagnation_limit(0)
            .with_regeneration_policy(RegenerationPolicy::Elitist)
            .with_worker_count(3)
            .with_seed(42);

        assert_eq!(config.population_size, 300);
        assert_eq!(config.num_tournaments, 10);
        assert_eq!(config.tournament_size, 5);
        assert!((config.mutation_rate - 0.05).abs() < 1e-10);
        assert_eq!(config.mutation_operator, MutationOperator::Invert);
        assert_eq!(config.num_generations, 40);
        assert!((config.infeasible_penalty - 500.0).abs() < 1e-10);
        assert_eq!(config.stagnation_limit, 0);
        assert_eq!(config.regeneration_policy, RegenerationPolicy::Elitist);
        assert_eq!(config.worker_count, 3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.offspring_per_generation(), 15);
    }

    #[test]
    fn test_clamp_mutation_rate() {
        assert!((GaConfig::default().with_mutation_rate(2.0).mutation_rate - 1.0).abs() < 1e-10);
        assert!(GaConfig::default().with_mutation_rate(-1.0).mutation_rate.abs() < 1e-10);
    }

    #[test]
    fn test_validate_small_ok() {
        assert!(small().validate(5).is_ok());
    }

    #[test]
    fn test_validate_too_few_nodes() {
        assert!(small().validate(2).is_err());
    }

    #[test]
    fn test_validate_population_too_small() {
        assert!(small().with_population_size(1).validate(5).is_err());
    }

    #[test]
    fn test_validate_population_exceeds_permutations() {
        // 4 nodes => 3! = 6 routes
        assert!(small().validate(4).is_ok());
        let err = small().with_population_size(7).validate(4).unwrap_err();
        assert!(matches!(err, GaError::InvalidParameter(_)));
    }

    #[test]
    fn test_validate_worker_count() {
        assert!(small().with_worker_count(0).validate(5).is_err());
        assert!(small().with_worker_count(7).validate(5).is_err());
    }

    #[test]
    fn test_validate_tournament_exceeds_partition() {
        // 6 / 2 workers = partitions of 3
        assert!(small().with_tournament_size(3).validate(5).is_ok());
        assert!(small().with_tournament_size(4).validate(5).is_err());
        assert!(small().with_tournament_size(0).validate(5).is_err());
    }

    #[test]
    fn test_validate_tournament_count() {
        assert!(small().with_num_tournaments(1).validate(5).is_err());
    }

    #[test]
    fn test_validate_offspring_must_leave_survivors() {
        // 2 workers * 3 offspring = 6, not fewer than 6
        assert!(small().with_num_tournaments(6).validate(5).is_err());
        assert!(small().with_num_tournaments(5).validate(5).is_ok());
    }

    #[test]
    fn test_validate_penalty() {
        assert!(small().with_infeasible_penalty(0.0).validate(5).is_err());
        assert!(small().with_infeasible_penalty(f64::INFINITY).validate(5).is_err());
        assert!(small().with_infeasible_penalty(f64::NAN).validate(5).is_err());
    }

    #[test]
    fn test_validate_mutation_rate_direct_field() {
        let mut config = small();
        config.mutation_rate = 1.5;
        assert!(config.validate(5).is_err());
        config.mutation_rate = f64::NAN;
        assert!(config.validate(5).is_err());
    }

    #[test]
    fn test_validate_zero_generations() {
        assert!(small().with_num_generations(0).validate(5).is_err());
    }

    #[test]
    fn test_preset_fast() {
        let config = GaConfig::fast();
        assert_eq!(config.population_size, 200);
        assert_eq!(config.num_generations, 100);
        assert!(config.validate(7).is_ok());
        assert!(config.validate(6).is_err());
    }

    #[test]
    fn test_preset_chainable() {
        let config = GaConfig::fast().with_population_size(150).with_seed(42);
        assert_eq!(config.population_size, 150);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.num_generations, 100);
    }
}
