//! Item catalog for the 0/1 knapsack problem.
//!
//! The catalog owns the parallel `values`/`weights` sequences and the scalar
//! capacity. It is the only place where the two sequences are checked for
//! equal length, so every [`Catalog`] the engine sees is well formed.
//!
//! The catalog doubles as the knapsack [`FitnessFunction`]: a genome scores
//! the sum of its selected values when the selected weight fits, and exactly
//! zero otherwise.

// Ratio and bound arithmetic uses intentional casts
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ga::{ConfigError, Evolution, EvolutionConfig, FitnessFunction, Genome, Observer, Outcome};

/// Values of the built-in example instance.
pub const EXAMPLE_VALUES: [u64; 6] = [60, 100, 120, 20, 80, 40];

/// Weights of the built-in example instance.
pub const EXAMPLE_WEIGHTS: [u64; 6] = [10, 20, 30, 10, 5, 10];

/// Capacity of the built-in example instance.
pub const EXAMPLE_CAPACITY: u64 = 50;

/// Error building or loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// `values` and `weights` have different lengths.
    #[error("the number of values ({values}) and weights ({weights}) must be the same")]
    LengthMismatch {
        /// Number of values supplied.
        values: usize,
        /// Number of weights supplied.
        weights: usize,
    },
    /// The catalog file could not be read.
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    /// The catalog file is not valid JSON.
    #[error("failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which precomputed target the engine should stop at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStrategy {
    /// Greedy value/weight packing. Always attainable, so runs can stop early.
    #[default]
    Greedy,
    /// Fractional relaxation. A true upper bound that is often unattainable.
    Relaxed,
}

/// A single catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Zero-based position in the catalog (and gene index).
    pub index: usize,
    /// Item value.
    pub value: u64,
    /// Item weight.
    pub weight: u64,
}

/// Totals of the items a genome selects.
///
/// Sums are kept in `u128` so they never wrap or clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Packing {
    /// Sum of selected values.
    pub value: u128,
    /// Sum of selected weights.
    pub weight: u128,
    /// Whether the selected weight fits in the knapsack.
    pub feasible: bool,
}

#[derive(Deserialize)]
struct RawCatalog {
    values: Vec<u64>,
    weights: Vec<u64>,
    capacity: u64,
}

/// Parallel value/weight sequences plus a capacity bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog")]
pub struct Catalog {
    values: Vec<u64>,
    weights: Vec<u64>,
    capacity: u64,
}

impl TryFrom<RawCatalog> for Catalog {
    type Error = CatalogError;

    fn try_from(raw: RawCatalog) -> Result<Self, Self::Error> {
        Self::new(raw.values, raw.weights, raw.capacity)
    }
}

impl Catalog {
    /// Build a catalog, checking that every item has both a value and a weight.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::LengthMismatch`] if the sequences differ in length.
    pub fn new(values: Vec<u64>, weights: Vec<u64>, capacity: u64) -> Result<Self, CatalogError> {
        if values.len() != weights.len() {
            return Err(CatalogError::LengthMismatch {
                values: values.len(),
                weights: weights.len(),
            });
        }
        Ok(Self {
            values,
            weights,
            capacity,
        })
    }

    /// The six-item instance used when no catalog is supplied.
    #[must_use]
    pub fn example() -> Self {
        Self {
            values: EXAMPLE_VALUES.to_vec(),
            weights: EXAMPLE_WEIGHTS.to_vec(),
            capacity: EXAMPLE_CAPACITY,
        }
    }

    /// Parse a catalog from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the lengths differ.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Number of items (and genome length).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the catalog has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Item values.
    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Item weights.
    #[must_use]
    pub fn weights(&self) -> &[u64] {
        &self.weights
    }

    /// Knapsack capacity.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Iterate over the items in catalog order.
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        self.values
            .iter()
            .zip(&self.weights)
            .enumerate()
            .map(|(index, (&value, &weight))| Item {
                index,
                value,
                weight,
            })
    }

    /// Sum the values and weights a genome selects.
    ///
    /// Genes past the end of the catalog are ignored.
    #[must_use]
    pub fn pack(&self, genome: &Genome) -> Packing {
        let (value, weight) = self
            .items()
            .zip(genome.genes())
            .filter(|(_, selected)| **selected)
            .fold((0u128, 0u128), |(v, w), (item, _)| {
                (v + u128::from(item.value), w + u128::from(item.weight))
            });
        Packing {
            value,
            weight,
            feasible: weight <= u128::from(self.capacity),
        }
    }

    /// All-or-nothing knapsack fitness: total value if feasible, else zero.
    ///
    /// A feasible total above `u64::MAX` scores `u64::MAX`.
    #[must_use]
    pub fn fitness(&self, genome: &Genome) -> u64 {
        let packing = self.pack(genome);
        if packing.feasible {
            u64::try_from(packing.value).unwrap_or(u64::MAX)
        } else {
            0
        }
    }

    /// Item indices ordered by value/weight ratio, best first.
    ///
    /// The sort is stable so equal ratios keep catalog order. Zero-weight
    /// items rank first.
    fn ratio_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| {
            let ra = ratio(self.values[a], self.weights[a]);
            let rb = ratio(self.values[b], self.weights[b]);
            rb.partial_cmp(&ra).unwrap_or(Ordering::Equal)
        });
        order
    }

    /// Greedy packing by value/weight ratio, skipping items that do not fit.
    ///
    /// This is the fitness limit used as the early-stop target. The packing it
    /// describes is feasible, so a run can reach it.
    #[must_use]
    pub fn fitness_limit(&self) -> u64 {
        let mut total_value = 0u64;
        let mut total_weight = 0u64;
        for idx in self.ratio_order() {
            if let Some(next) = total_weight.checked_add(self.weights[idx])
                && next <= self.capacity
            {
                total_weight = next;
                total_value = total_value.saturating_add(self.values[idx]);
            }
        }
        total_value
    }

    /// Fractional-knapsack bound. No feasible genome scores above it.
    #[must_use]
    pub fn relaxed_bound(&self) -> u64 {
        let mut remaining = self.capacity;
        let mut bound = 0u64;
        for idx in self.ratio_order() {
            let (value, weight) = (self.values[idx], self.weights[idx]);
            if weight <= remaining {
                remaining -= weight;
                bound = bound.saturating_add(value);
            } else {
                // Partial item; u128 keeps value * remaining exact.
                let part = u128::from(value) * u128::from(remaining) / u128::from(weight);
                bound = bound.saturating_add(part as u64);
                break;
            }
        }
        bound
    }

    /// The target selected by `strategy`.
    #[must_use]
    pub fn limit(&self, strategy: LimitStrategy) -> u64 {
        match strategy {
            LimitStrategy::Greedy => self.fitness_limit(),
            LimitStrategy::Relaxed => self.relaxed_bound(),
        }
    }

    /// A steppable engine over this catalog, stopping at the `strategy` target.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is out of range.
    pub fn evolution(
        &self,
        config: EvolutionConfig,
        strategy: LimitStrategy,
    ) -> Result<Evolution<'_, Self>, ConfigError> {
        Evolution::new(config, self, self.len(), self.limit(strategy))
    }

    /// Run the engine to completion against this catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is out of range.
    pub fn solve<O: Observer + ?Sized>(
        &self,
        config: EvolutionConfig,
        strategy: LimitStrategy,
        observer: &mut O,
    ) -> crate::Result<Outcome> {
        Ok(self.evolution(config, strategy)?.run(observer))
    }
}

impl FitnessFunction for Catalog {
    fn fitness(&self, genome: &Genome) -> u64 {
        Catalog::fitness(self, genome)
    }
}

fn ratio(value: u64, weight: u64) -> f64 {
    if weight == 0 {
        f64::INFINITY
    } else {
        value as f64 / weight as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome(bits: &[u8]) -> Genome {
        bits.iter().map(|&b| b == 1).collect()
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Catalog::new(vec![1, 2, 3], vec![1, 2], 10).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::LengthMismatch {
                values: 3,
                weights: 2
            }
        ));
    }

    #[test]
    fn test_example_fitness_limit() {
        let catalog = Catalog::example();
        // Items 5, 1, 2, 6: weight 45, value 280.
        assert_eq!(catalog.fitness_limit(), 280);
    }

    #[test]
    fn test_example_relaxed_bound() {
        let catalog = Catalog::example();
        // 80 + 60 + 100 = 240 at weight 35, then half of the 120/30 item.
        assert_eq!(catalog.relaxed_bound(), 300);
        assert_eq!(catalog.limit(LimitStrategy::Relaxed), 300);
        assert_eq!(catalog.limit(LimitStrategy::Greedy), 280);
    }

    #[test]
    fn test_fitness_feasible_and_infeasible() {
        let catalog = Catalog::example();
        let feasible = genome(&[1, 1, 0, 0, 1, 1]);
        assert_eq!(catalog.fitness(&feasible), 280);

        let overweight = genome(&[1, 1, 1, 0, 0, 0]);
        let packing = catalog.pack(&overweight);
        assert_eq!(packing.weight, 60);
        assert!(!packing.feasible);
        assert_eq!(catalog.fitness(&overweight), 0);
    }

    #[test]
    fn test_zero_capacity_limit() {
        let catalog = Catalog::new(vec![10], vec![5], 0).unwrap();
        assert_eq!(catalog.fitness_limit(), 0);
        assert_eq!(catalog.relaxed_bound(), 0);
    }

    #[test]
    fn test_zero_weight_item_always_packed() {
        let catalog = Catalog::new(vec![7, 10], vec![0, 5], 0).unwrap();
        assert_eq!(catalog.fitness_limit(), 7);
        assert_eq!(catalog.fitness(&genome(&[1, 0])), 7);
    }

    #[test]
    fn test_limit_with_max_weights() {
        let catalog = Catalog::new(vec![100, 1], vec![u64::MAX, 1], u64::MAX).unwrap();
        // The light item goes first; the heavy one then no longer fits.
        assert_eq!(catalog.fitness_limit(), 1);

        let catalog = Catalog::new(vec![100, 1], vec![u64::MAX, 0], u64::MAX).unwrap();
        assert_eq!(catalog.fitness_limit(), 101);
    }

    #[test]
    fn test_weight_sum_past_u64_is_infeasible() {
        let catalog = Catalog::new(vec![7, 9], vec![u64::MAX, 1], u64::MAX).unwrap();

        let both = genome(&[1, 1]);
        let packing = catalog.pack(&both);
        assert_eq!(packing.weight, u128::from(u64::MAX) + 1);
        assert!(!packing.feasible);
        assert_eq!(catalog.fitness(&both), 0);

        assert_eq!(catalog.fitness(&genome(&[1, 0])), 7);
    }

    #[test]
    fn test_value_sum_is_exact() {
        let catalog = Catalog::new(vec![u64::MAX, 5], vec![1, 1], 2).unwrap();
        let both = genome(&[1, 1]);
        assert_eq!(catalog.pack(&both).value, u128::from(u64::MAX) + 5);
        assert_eq!(catalog.fitness(&both), u64::MAX);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new(Vec::new(), Vec::new(), 10).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.fitness_limit(), 0);
        assert_eq!(catalog.fitness(&Genome::default()), 0);
    }

    #[test]
    fn test_json_round_trip_validates() {
        let catalog = Catalog::from_json(r#"{"values":[1,2],"weights":[3,4],"capacity":5}"#).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.capacity(), 5);

        let err = Catalog::from_json(r#"{"values":[1,2],"weights":[3],"capacity":5}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
        assert!(err.to_string().contains("must be the same"));
    }

    #[test]
    fn test_solve_example_is_feasible() {
        let catalog = Catalog::example();
        let config = EvolutionConfig {
            seed: Some(2024),
            ..EvolutionConfig::default()
        };
        let outcome = catalog.solve(config, LimitStrategy::Greedy, &mut ()).unwrap();

        let best = outcome.best().unwrap();
        let packing = catalog.pack(best);
        assert!(packing.feasible);
        assert_eq!(packing.value, u128::from(outcome.best_fitness()));
        assert!(outcome.best_fitness() <= catalog.fitness_limit());
    }

    #[test]
    fn test_solve_rejects_bad_config() {
        let catalog = Catalog::example();
        let config = EvolutionConfig {
            tournament_size: 0,
            ..EvolutionConfig::default()
        };
        let err = catalog.solve(config, LimitStrategy::Greedy, &mut ()).unwrap_err();
        assert!(matches!(err, crate::Error::Config(ConfigError::ZeroTournament)));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, r#"{"values":[60,100],"weights":[10,20],"capacity":25}"#).unwrap();

        let catalog = Catalog::from_json_file(&path).unwrap();
        assert_eq!(catalog.values(), &[60, 100]);
        assert_eq!(catalog.fitness_limit(), 60);

        let missing = Catalog::from_json_file(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(CatalogError::Io(_))));
    }
}
