// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Knapsack-evo: a seedable genetic-algorithm search for binary-encoded
//! combinatorial problems, instantiated for the 0/1 knapsack.
//!
//! The crate has two layers:
//! - [`ga`]: the problem-agnostic engine (genomes, tournament selection,
//!   uniform crossover, decaying mutation, elitism, termination)
//! - [`catalog`]: the knapsack item catalog, which supplies the fitness
//!   function and the greedy fitness limit
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI: solve │ watch │ batch        │
//! ├─────────────────────────────────────┤
//! │   Catalog (fitness, fitness limit)  │
//! ├─────────────────────────────────────┤
//! │   GA engine (ga::Evolution)         │
//! └─────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod error;
pub mod ga;

pub use catalog::{Catalog, CatalogError, Item, LimitStrategy, Packing};
pub use error::{Error, Result};
pub use ga::{EvolutionConfig, Genome, Outcome};
