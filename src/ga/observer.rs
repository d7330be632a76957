//! Per-generation progress observation.
//!
//! The engine calls [`Observer::on_generation`] once per evaluated generation,
//! after ranking and before the termination test. Observers only watch: the
//! engine never reads anything back from them.

use log::info;

use crate::ga::evolution::GenerationStats;
use crate::ga::genome::Genome;

/// Snapshot of one evaluated generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationReport<'a> {
    /// Zero-based generation index.
    pub generation: usize,
    /// Population sorted best-first.
    pub population: &'a [Genome],
    /// Fitness values aligned with `population`.
    pub fitness: &'a [u64],
    /// Summary statistics for this generation.
    pub stats: &'a GenerationStats,
}

impl GenerationReport<'_> {
    /// The best genome of this generation.
    #[must_use]
    pub fn best(&self) -> Option<&Genome> {
        self.population.first()
    }

    /// Fitness of the best genome (0 for an empty population).
    #[must_use]
    pub fn best_fitness(&self) -> u64 {
        self.fitness.first().copied().unwrap_or(0)
    }
}

/// Receives a report at every generation boundary.
pub trait Observer {
    /// Called once per evaluated generation.
    fn on_generation(&mut self, report: &GenerationReport<'_>);
}

impl<F> Observer for F
where
    F: FnMut(&GenerationReport<'_>),
{
    fn on_generation(&mut self, report: &GenerationReport<'_>) {
        self(report);
    }
}

impl Observer for () {
    fn on_generation(&mut self, _report: &GenerationReport<'_>) {}
}

impl<A: Observer, B: Observer> Observer for (A, B) {
    fn on_generation(&mut self, report: &GenerationReport<'_>) {
        self.0.on_generation(report);
        self.1.on_generation(report);
    }
}

/// Records the best fitness of every generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FitnessHistory {
    best: Vec<u64>,
}

impl FitnessHistory {
    /// Empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Best fitness per generation, in generation order.
    #[must_use]
    pub fn best(&self) -> &[u64] {
        &self.best
    }

    /// Consume the history, returning the series.
    #[must_use]
    pub fn into_inner(self) -> Vec<u64> {
        self.best
    }
}

impl Observer for FitnessHistory {
    fn on_generation(&mut self, report: &GenerationReport<'_>) {
        self.best.push(report.best_fitness());
    }
}

/// Logs the best fitness of every generation at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_generation(&mut self, report: &GenerationReport<'_>) {
        info!(
            "Generation {}: Best Fitness = {}",
            report.generation,
            report.best_fitness()
        );
    }
}
