//! Genetic-algorithm engine for fixed-length binary search spaces.
//!
//! The engine is problem-agnostic: it evolves bit-vector genomes against any
//! [`FitnessFunction`] and stops at a fitness target or a generation budget.
//! Every random draw comes from explicit, seedable streams, so a run is
//! reproducible from its seed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Evolution Loop              │
//! ├─────────────────────────────────────┤
//! │  Selection │ Crossover │ Mutation   │
//! ├─────────────────────────────────────┤
//! │   Fitness Evaluation │ Diversity    │
//! ├─────────────────────────────────────┤
//! │      Genome / Population            │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use knapsack_evo::Catalog;
//! use knapsack_evo::ga::{EvolutionConfig, FitnessHistory, run_evolution};
//!
//! let catalog = Catalog::example();
//! let config = EvolutionConfig { seed: Some(42), ..EvolutionConfig::default() };
//! let mut history = FitnessHistory::new();
//!
//! let outcome = run_evolution(config, &catalog, catalog.len(), catalog.fitness_limit(), &mut history)?;
//! assert!(outcome.best_fitness() <= catalog.fitness_limit());
//! assert_eq!(history.best().len(), outcome.generation + 1);
//! # Ok::<(), knapsack_evo::ga::ConfigError>(())
//! ```

mod config;
mod crossover;
mod diversity;
mod evolution;
mod fitness;
mod genome;
mod mutation;
mod observer;
mod rng;
mod selection;

pub use config::{ConfigError, EvolutionConfig};
pub use crossover::uniform_crossover;
pub use diversity::diversity;
pub use evolution::{Evolution, GenerationStats, Outcome, Phase, run_evolution};
pub use fitness::{FitnessFunction, evaluate_population, rank};
pub use genome::{Genome, Population, generate_genome, generate_population};
pub use mutation::{mutate, mutation_probability};
pub use observer::{FitnessHistory, GenerationReport, LogObserver, Observer};
pub use rng::{GaRng, Streams};
pub use selection::{SelectionStats, select_pair, tournament_select};
