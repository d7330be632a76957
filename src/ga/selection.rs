//! Selection operators.
//!
//! Parents are picked by tournament: a handful of individuals are drawn at
//! random and the fittest of them wins. Larger tournaments push harder
//! toward the current best. Elites need no selection step: the engine copies
//! the head of the ranked population.

// Selection uses intentional casts for statistics
#![allow(clippy::cast_precision_loss)]

use rand::Rng;
use rand::seq::index;

/// Tournament selection: draw `k` distinct individuals, return the fittest.
///
/// `k` is clamped to `1..=fitness.len()`. Ties go to the contender drawn
/// first, so the result depends only on the random stream.
///
/// # Panics
///
/// Panics if `fitness` is empty.
#[must_use]
pub fn tournament_select<R: Rng>(fitness: &[u64], k: usize, rng: &mut R) -> usize {
    let pop_size = fitness.len();
    assert!(pop_size > 0, "tournament over an empty population");

    let k = k.clamp(1, pop_size);
    let mut contenders = index::sample(rng, pop_size, k).into_iter();

    // k >= 1, so the first draw always exists.
    let mut best_idx = contenders.next().unwrap_or(0);
    for idx in contenders {
        if fitness[idx] > fitness[best_idx] {
            best_idx = idx;
        }
    }
    best_idx
}

/// Select a parent pair with two independent tournaments.
#[must_use]
pub fn select_pair<R: Rng>(fitness: &[u64], tournament_size: usize, rng: &mut R) -> (usize, usize) {
    let a = tournament_select(fitness, tournament_size, rng);
    let b = tournament_select(fitness, tournament_size, rng);
    (a, b)
}

/// Fitness moments of a population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionStats {
    /// Mean fitness of the population.
    pub mean_fitness: f64,
    /// Best fitness in the population.
    pub best_fitness: u64,
    /// Worst fitness in the population.
    pub worst_fitness: u64,
    /// Standard deviation of fitness.
    pub fitness_std: f64,
}

impl SelectionStats {
    /// Calculate statistics from fitness values.
    #[must_use]
    pub fn from_fitness(fitness: &[u64]) -> Self {
        if fitness.is_empty() {
            return Self {
                mean_fitness: 0.0,
                best_fitness: 0,
                worst_fitness: 0,
                fitness_std: 0.0,
            };
        }

        let n = fitness.len() as f64;
        let mean = fitness.iter().map(|&f| f as f64).sum::<f64>() / n;
        let best = fitness.iter().copied().max().unwrap_or(0);
        let worst = fitness.iter().copied().min().unwrap_or(0);

        let variance = fitness
            .iter()
            .map(|&f| (f as f64 - mean).powi(2))
            .sum::<f64>()
            / n;

        Self {
            mean_fitness: mean,
            best_fitness: best,
            worst_fitness: worst,
            fitness_std: variance.sqrt(),
        }
    }
}
