//! Per-generation reporting.
//!
//! The runner emits one [`GenerationReport`] per generation and the final
//! [`GaResult`](super::GaResult) at run end to a [`RunObserver`].
//! [`TracingObserver`] forwards both to `tracing`.

use super::runner::GaResult;
use super::types::{distance_of, FitnessScore, Route};

/// Snapshot of one generation, taken after evaluation and the
/// regenerate/reproduce step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationReport {
    /// Zero-based generation index.
    pub generation: usize,

    /// Best fitness of the population evaluated this generation.
    pub current_best_fitness: FitnessScore,

    /// Best fitness seen since the run started.
    pub best_fitness_so_far: FitnessScore,

    /// Stagnation counter after this generation's observation.
    pub stagnation_counter: usize,

    /// Whether this generation regenerated instead of reproducing.
    pub regenerated: bool,

    /// The route scoring `current_best_fitness`.
    pub best_route: Route,

    /// Population size after replacement and repair.
    pub population_size: usize,
}

impl GenerationReport {
    /// Total distance of this generation's best route.
    pub fn current_best_distance(&self) -> f64 {
        distance_of(self.current_best_fitness)
    }
}

/// Receives progress from a running [`GaRunner`](super::GaRunner).
///
/// Both hooks default to doing nothing.
pub trait RunObserver {
    /// Called once per generation.
    fn on_generation(&mut self, _report: &GenerationReport) {}

    /// Called once after the final evaluation.
    fn on_complete(&mut self, _result: &GaResult) {}
}

impl RunObserver for () {}

/// Logs progress through `tracing` at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn on_generation(&mut self, report: &GenerationReport) {
        tracing::info!(
            generation = report.generation,
            current_best_fitness = report.current_best_fitness,
            best_fitness_so_far = report.best_fitness_so_far,
            stagnation = report.stagnation_counter,
            regenerated = report.regenerated,
            "generation complete"
        );
    }

    fn on_complete(&mut self, result: &GaResult) {
        tracing::info!(
            best_route = ?result.best_route.nodes(),
            total_distance = result.total_distance,
            elapsed_ms = result.elapsed.as_millis() as u64,
            generations = result.generations,
            regenerations = result.regenerations,
            "run complete"
        );
    }
}

/// Collects every report in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingObserver {
    pub reports: Vec<GenerationReport>,
    pub completed: bool,
}

impl RunObserver for CollectingObserver {
    fn on_generation(&mut self, report: &GenerationReport) {
        self.reports.push(report.clone());
    }

    fn on_complete(&mut self, _result: &GaResult) {
        self.completed = true;
    }
}
