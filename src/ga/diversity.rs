//! Population diversity.
//!
//! Read-only instrumentation; nothing in the search consults it.

// Ratio computation casts counts to f64
#![allow(clippy::cast_precision_loss)]

use std::collections::HashSet;

use crate::ga::genome::Genome;

/// Ratio of distinct genomes to population size, in `[0, 1]`.
///
/// An empty population has diversity 0.
#[must_use]
pub fn diversity(population: &[Genome]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let unique: HashSet<&Genome> = population.iter().collect();
    unique.len() as f64 / population.len() as f64
}
