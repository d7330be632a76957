//! Main evolution loop.
//!
//! The engine is a small state machine driven one generation at a time:
//!
//! ```text
//! new ──► Evaluating ──► Terminal
//!             ▲    │
//!             │    ▼
//!          Reproducing
//! ```
//!
//! `Evaluating` scores and ranks the population, reports it to the observer
//! and runs the termination test. `Reproducing` builds the next generation
//! from the elite plus mutated offspring of tournament-selected parents.
//! Termination is only checked at generation boundaries.

use log::{debug, info, trace};
use rayon::prelude::*;
use serde::Serialize;

use crate::ga::config::{ConfigError, EvolutionConfig};
use crate::ga::crossover::uniform_crossover;
use crate::ga::diversity::diversity;
use crate::ga::fitness::{FitnessFunction, evaluate_population, rank};
use crate::ga::genome::{Genome, generate_population};
use crate::ga::mutation::mutate;
use crate::ga::observer::{GenerationReport, Observer};
use crate::ga::rng::{GaRng, Streams};
use crate::ga::selection::{SelectionStats, select_pair};

/// Statistics for a single evaluated generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GenerationStats {
    /// Generation number.
    pub generation: usize,
    /// Best fitness in this generation.
    pub best_fitness: u64,
    /// Mean fitness.
    pub mean_fitness: f64,
    /// Worst fitness.
    pub worst_fitness: u64,
    /// Fitness standard deviation.
    pub fitness_std: f64,
    /// Distinct-genome ratio.
    pub diversity: f64,
}

impl GenerationStats {
    fn compute(generation: usize, population: &[Genome], fitness: &[u64]) -> Self {
        let stats = SelectionStats::from_fitness(fitness);
        Self {
            generation,
            best_fitness: stats.best_fitness,
            mean_fitness: stats.mean_fitness,
            worst_fitness: stats.worst_fitness,
            fitness_std: stats.fitness_std,
            diversity: diversity(population),
        }
    }
}

/// Where the engine is in its generation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The current population has not been scored yet.
    Evaluating,
    /// The current population is ranked; the next generation is pending.
    Reproducing,
    /// The run has stopped; the current population is final and ranked.
    Terminal,
}

/// Result of a finished run.
///
/// There is no "solved" flag: compare [`Outcome::best_fitness`]
/// with the fitness limit to tell an early stop from budget exhaustion.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// Final population, sorted best-first.
    pub population: Vec<Genome>,
    /// Fitness values aligned with `population`.
    pub fitness: Vec<u64>,
    /// Index of the generation at which the loop stopped.
    pub generation: usize,
    /// Per-generation statistics, one entry per evaluated generation.
    pub history: Vec<GenerationStats>,
    /// Master seed of the run.
    pub seed: u64,
}

impl Outcome {
    /// The best genome of the final generation.
    #[must_use]
    pub fn best(&self) -> Option<&Genome> {
        self.population.first()
    }

    /// Fitness of the best genome.
    #[must_use]
    pub fn best_fitness(&self) -> u64 {
        self.fitness.first().copied().unwrap_or(0)
    }

    /// Best fitness of every generation, in order.
    #[must_use]
    pub fn best_series(&self) -> Vec<u64> {
        self.history.iter().map(|s| s.best_fitness).collect()
    }
}

/// A single evolution run over a fitness function.
pub struct Evolution<'f, F: FitnessFunction + ?Sized> {
    config: EvolutionConfig,
    fitness_fn: &'f F,
    fitness_limit: u64,
    streams: Streams,
    population: Vec<Genome>,
    fitness: Vec<u64>,
    generation: usize,
    phase: Phase,
    history: Vec<GenerationStats>,
}

impl<F: FitnessFunction + ?Sized> std::fmt::Debug for Evolution<'_, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evolution")
            .field("config", &self.config)
            .field("fitness_limit", &self.fitness_limit)
            .field("seed", &self.streams.seed())
            .field("generation", &self.generation)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl<'f, F: FitnessFunction + ?Sized> Evolution<'f, F> {
    /// Validate the configuration and draw the initial population.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is out of range.
    pub fn new(
        config: EvolutionConfig,
        fitness_fn: &'f F,
        genome_length: usize,
        fitness_limit: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let streams = config.seed.map_or_else(Streams::from_entropy, Streams::new);
        let population =
            generate_population(config.population_size, genome_length, &mut streams.master());

        debug!(
            "initialized population of {} genomes (length {genome_length}, seed {})",
            population.len(),
            streams.seed()
        );

        Ok(Self {
            config,
            fitness_fn,
            fitness_limit,
            streams,
            population,
            fitness: Vec::new(),
            generation: 0,
            phase: Phase::Evaluating,
            history: Vec::new(),
        })
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Early-stop target.
    #[must_use]
    pub fn fitness_limit(&self) -> u64 {
        self.fitness_limit
    }

    /// Master seed of the run.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.streams.seed()
    }

    /// Current generation index.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the run has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Terminal
    }

    /// Current population. Ranked best-first unless the phase is `Evaluating`.
    #[must_use]
    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    /// Fitness of the last evaluated generation, aligned with `population`.
    ///
    /// Empty while the phase is `Evaluating`.
    #[must_use]
    pub fn fitness(&self) -> &[u64] {
        &self.fitness
    }

    /// Best genome of the last evaluated generation.
    #[must_use]
    pub fn best(&self) -> Option<&Genome> {
        if self.fitness.is_empty() {
            None
        } else {
            self.population.first()
        }
    }

    /// Best fitness of the last evaluated generation.
    #[must_use]
    pub fn best_fitness(&self) -> u64 {
        self.fitness.first().copied().unwrap_or(0)
    }

    /// Statistics of every evaluated generation.
    #[must_use]
    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Advance by one generation.
    ///
    /// Builds the next generation if the previous one was ranked, then scores,
    /// ranks and reports the current one. Returns `true` once the run has
    /// stopped; further calls do nothing.
    pub fn step<O: Observer + ?Sized>(&mut self, observer: &mut O) -> bool {
        match self.phase {
            Phase::Terminal => return true,
            Phase::Reproducing => self.reproduce(),
            Phase::Evaluating => {}
        }
        self.evaluate(observer)
    }

    /// Step until the run stops and return the outcome.
    pub fn run<O: Observer + ?Sized>(mut self, observer: &mut O) -> Outcome {
        while !self.step(observer) {}
        self.into_outcome()
    }

    /// Consume the engine, returning the current population and history.
    #[must_use]
    pub fn into_outcome(self) -> Outcome {
        Outcome {
            population: self.population,
            fitness: self.fitness,
            generation: self.generation,
            history: self.history,
            seed: self.streams.seed(),
        }
    }

    fn evaluate<O: Observer + ?Sized>(&mut self, observer: &mut O) -> bool {
        let scores = evaluate_population(&self.population, self.fitness_fn, self.config.parallel);
        let (ranked, scores) = rank(std::mem::take(&mut self.population), scores);
        self.population = ranked;
        self.fitness = scores;

        let stats = GenerationStats::compute(self.generation, &self.population, &self.fitness);
        debug!(
            "Gen {:>5}: best={} mean={:.2} std={:.2} diversity={:.2}",
            stats.generation,
            stats.best_fitness,
            stats.mean_fitness,
            stats.fitness_std,
            stats.diversity
        );
        self.history.push(stats);

        observer.on_generation(&GenerationReport {
            generation: self.generation,
            population: &self.population,
            fitness: &self.fitness,
            stats: &stats,
        });

        let best = self.best_fitness();
        let reached = best >= self.fitness_limit;
        if reached || self.generation + 1 >= self.config.generation_limit {
            self.phase = Phase::Terminal;
            info!(
                "evolution stopped at generation {} with best fitness {best} (limit {}{})",
                self.generation,
                self.fitness_limit,
                if reached { ", reached" } else { "" }
            );
            true
        } else {
            self.phase = Phase::Reproducing;
            false
        }
    }

    fn reproduce(&mut self) {
        let size = self.config.population_size;
        let elite = self.config.elite_count.min(size).min(self.population.len());
        let pairs = (size - elite).div_ceil(2);

        let breeder = Breeder {
            population: &self.population,
            fitness: &self.fitness,
            streams: self.streams,
            generation: self.generation,
            generation_limit: self.config.generation_limit,
            tournament_size: self.config.tournament_size,
            mutation_probability: self.config.mutation_probability,
        };

        let offspring: Vec<(Genome, Genome)> = if self.config.parallel {
            (0..pairs).into_par_iter().map(|slot| breeder.breed(slot)).collect()
        } else {
            (0..pairs).map(|slot| breeder.breed(slot)).collect()
        };

        let mut next = Vec::with_capacity(size);
        next.extend_from_slice(&self.population[..elite]);
        for (a, b) in offspring {
            next.push(a);
            if next.len() < size {
                next.push(b);
            }
        }

        self.population = next;
        self.fitness.clear();
        self.generation += 1;
        self.phase = Phase::Evaluating;
    }
}

/// Read-only view of a ranked generation used to produce offspring.
struct Breeder<'a> {
    population: &'a [Genome],
    fitness: &'a [u64],
    streams: Streams,
    generation: usize,
    generation_limit: usize,
    tournament_size: usize,
    mutation_probability: f64,
}

impl Breeder<'_> {
    /// Select, cross and mutate one offspring pair on the slot's own stream.
    fn breed(&self, slot: usize) -> (Genome, Genome) {
        let mut rng = self.streams.slot(self.generation, slot);
        let (pa, pb) = select_pair(self.fitness, self.tournament_size, &mut rng);
        trace!("gen {} slot {slot}: parents {pa} x {pb}", self.generation);

        let (a, b) = uniform_crossover(&self.population[pa], &self.population[pb], &mut rng);
        let a = self.mutate_child(&a, &mut rng);
        let b = self.mutate_child(&b, &mut rng);
        (a, b)
    }

    fn mutate_child(&self, child: &Genome, rng: &mut GaRng) -> Genome {
        mutate(
            child,
            self.generation,
            self.generation_limit,
            self.mutation_probability,
            rng,
        )
    }
}

/// Run a full evolution with the given observer.
///
/// # Errors
///
/// Returns an error if the configuration is out of range.
pub fn run_evolution<F, O>(
    config: EvolutionConfig,
    fitness_fn: &F,
    genome_length: usize,
    fitness_limit: u64,
    observer: &mut O,
) -> Result<Outcome, ConfigError>
where
    F: FitnessFunction + ?Sized,
    O: Observer + ?Sized,
{
    Ok(Evolution::new(config, fitness_fn, genome_length, fitness_limit)?.run(observer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::ga::observer::FitnessHistory;

    fn seeded(seed: u64) -> EvolutionConfig {
        EvolutionConfig {
            seed: Some(seed),
            ..EvolutionConfig::default()
        }
    }

    #[test]
    fn test_evolution_config_default() {
        let config = EvolutionConfig::default();
        assert!(config.population_size > 0);
        assert!(config.generation_limit > 0);
    }

    #[test]
    fn test_run_is_reproducible() {
        let catalog = Catalog::example();
        let a = run_evolution(seeded(17), &catalog, catalog.len(), u64::MAX, &mut ()).unwrap();
        let b = run_evolution(seeded(17), &catalog, catalog.len(), u64::MAX, &mut ()).unwrap();

        assert_eq!(a.population, b.population);
        assert_eq!(a.best_series(), b.best_series());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let catalog = Catalog::example();
        let sequential = run_evolution(seeded(5), &catalog, catalog.len(), u64::MAX, &mut ()).unwrap();
        let parallel_config = EvolutionConfig {
            parallel: true,
            ..seeded(5)
        };
        let parallel = run_evolution(parallel_config, &catalog, catalog.len(), u64::MAX, &mut ()).unwrap();

        assert_eq!(sequential.population, parallel.population);
        assert_eq!(sequential.fitness, parallel.fitness);
    }

    #[test]
    fn test_budget_exhaustion_stops_at_last_generation() {
        let catalog = Catalog::example();
        let config = EvolutionConfig {
            generation_limit: 7,
            ..seeded(3)
        };
        // Unreachable target: the run must use the whole budget.
        let outcome = run_evolution(config, &catalog, catalog.len(), u64::MAX, &mut ()).unwrap();

        assert_eq!(outcome.generation, 6);
        assert_eq!(outcome.history.len(), 7);
        assert_eq!(outcome.population.len(), 20);
    }

    #[test]
    fn test_final_population_is_ranked() {
        let catalog = Catalog::example();
        let outcome = run_evolution(seeded(8), &catalog, catalog.len(), u64::MAX, &mut ()).unwrap();

        assert!(outcome.fitness.windows(2).all(|w| w[0] >= w[1]));
        let best = outcome.best().unwrap();
        assert_eq!(catalog.fitness(best), outcome.best_fitness());
    }

    #[test]
    fn test_observer_sees_every_generation() {
        let catalog = Catalog::example();
        let mut generations = Vec::new();
        let mut observer = (FitnessHistory::new(), |r: &GenerationReport<'_>| {
            generations.push(r.generation);
        });

        let outcome = run_evolution(seeded(21), &catalog, catalog.len(), 280, &mut observer).unwrap();
        let (history, _) = observer;

        let expected: Vec<usize> = (0..=outcome.generation).collect();
        assert_eq!(generations, expected);
        assert_eq!(history.best(), outcome.best_series().as_slice());
    }

    #[test]
    fn test_elitism_never_regresses() {
        let catalog = Catalog::example();
        let outcome = run_evolution(seeded(99), &catalog, catalog.len(), u64::MAX, &mut ()).unwrap();

        let series = outcome.best_series();
        assert!(series.windows(2).all(|w| w[1] >= w[0]), "{series:?}");
    }

    #[test]
    fn test_odd_population_size_is_kept() {
        let catalog = Catalog::example();
        let config = EvolutionConfig {
            population_size: 7,
            generation_limit: 5,
            ..seeded(4)
        };
        let mut sizes = Vec::new();
        let mut observer = |r: &GenerationReport<'_>| sizes.push(r.population.len());
        run_evolution(config, &catalog, catalog.len(), u64::MAX, &mut observer).unwrap();

        assert_eq!(sizes, vec![7; 5]);
    }

    #[test]
    fn test_single_genome_population() {
        let catalog = Catalog::example();
        let config = EvolutionConfig {
            population_size: 1,
            generation_limit: 4,
            ..seeded(2)
        };
        let mut engine = Evolution::new(config, &catalog, catalog.len(), u64::MAX).unwrap();
        let first = engine.population()[0].clone();

        let outcome = {
            while !engine.step(&mut ()) {}
            engine.into_outcome()
        };
        assert_eq!(outcome.population, vec![first]);
        assert_eq!(outcome.generation, 3);
    }

    #[test]
    fn test_phases() {
        let catalog = Catalog::example();
        let config = EvolutionConfig {
            generation_limit: 2,
            ..seeded(6)
        };
        let mut engine = Evolution::new(config, &catalog, catalog.len(), u64::MAX).unwrap();
        assert_eq!(engine.phase(), Phase::Evaluating);
        assert!(engine.best().is_none());

        assert!(!engine.step(&mut ()));
        assert_eq!(engine.phase(), Phase::Reproducing);
        assert_eq!(engine.generation(), 0);
        assert!(engine.best().is_some());

        assert!(engine.step(&mut ()));
        assert_eq!(engine.phase(), Phase::Terminal);
        assert_eq!(engine.generation(), 1);

        assert!(engine.step(&mut ()));
        assert_eq!(engine.generation(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let catalog = Catalog::example();
        let config = EvolutionConfig {
            population_size: 0,
            ..EvolutionConfig::default()
        };
        let result = Evolution::new(config, &catalog, catalog.len(), 0);
        assert!(matches!(result, Err(ConfigError::ZeroPopulation)));
    }
}
