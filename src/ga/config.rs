//! Engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for one evolution run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Number of genomes per generation.
    pub population_size: usize,
    /// Generation budget; the last evaluated generation is `generation_limit - 1`.
    pub generation_limit: usize,
    /// Individuals competing in each tournament.
    pub tournament_size: usize,
    /// Per-gene flip probability at generation 0.
    pub mutation_probability: f64,
    /// Number of top genomes carried over unchanged.
    pub elite_count: usize,
    /// Master seed. `None` draws one from OS entropy.
    pub seed: Option<u64>,
    /// Evaluate and reproduce on the rayon thread pool.
    pub parallel: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generation_limit: 100,
            tournament_size: 3,
            mutation_probability: 0.1,
            elite_count: 2,
            seed: None,
            parallel: false,
        }
    }
}

/// Out-of-range engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Population size is zero.
    #[error("population size must be at least 1")]
    ZeroPopulation,
    /// Generation limit is zero.
    #[error("generation limit must be at least 1")]
    ZeroGenerations,
    /// Tournament size is zero.
    #[error("tournament size must be at least 1")]
    ZeroTournament,
    /// Mutation probability is not in `[0, 1]`.
    #[error("mutation probability must be within [0, 1], got {0}")]
    InvalidMutationProbability(f64),
}

impl EvolutionConfig {
    /// Check that every field is in range.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::ZeroPopulation);
        }
        if self.generation_limit == 0 {
            return Err(ConfigError::ZeroGenerations);
        }
        if self.tournament_size == 0 {
            return Err(ConfigError::ZeroTournament);
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(ConfigError::InvalidMutationProbability(
                self.mutation_probability,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EvolutionConfig::default();
        assert_eq!(config.population_size, 20);
        assert_eq!(config.generation_limit, 100);
        assert_eq!(config.tournament_size, 3);
        assert_eq!(config.elite_count, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let base = EvolutionConfig::default();

        let zero_pop = EvolutionConfig { population_size: 0, ..base };
        assert_eq!(zero_pop.validate(), Err(ConfigError::ZeroPopulation));

        let zero_gen = EvolutionConfig { generation_limit: 0, ..base };
        assert_eq!(zero_gen.validate(), Err(ConfigError::ZeroGenerations));

        let zero_tournament = EvolutionConfig { tournament_size: 0, ..base };
        assert_eq!(zero_tournament.validate(), Err(ConfigError::ZeroTournament));

        let bad_prob = EvolutionConfig { mutation_probability: 1.5, ..base };
        assert!(matches!(
            bad_prob.validate(),
            Err(ConfigError::InvalidMutationProbability(_))
        ));

        let nan_prob = EvolutionConfig { mutation_probability: f64::NAN, ..base };
        assert!(nan_prob.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EvolutionConfig =
            serde_json::from_str(r#"{"population_size": 50, "seed": 7}"#).unwrap();
        assert_eq!(config.population_size, 50);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.generation_limit, 100);
        assert!(!config.parallel);
    }
}
