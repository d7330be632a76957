//! CLI command implementations for knapsack-evo.

pub(crate) mod batch;
pub(crate) mod solve;
pub(crate) mod watch;

mod output;

use clap::{Args, ValueEnum};
use knapsack_evo::ga::{ConfigError, EvolutionConfig};
use knapsack_evo::{Catalog, CatalogError, LimitStrategy};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Output format for the `solve` and `batch` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// Early-stop target passed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LimitArg {
    /// Greedy value/weight packing (attainable).
    Greedy,
    /// Fractional relaxation (true upper bound).
    Relaxed,
}

impl From<LimitArg> for LimitStrategy {
    fn from(arg: LimitArg) -> Self {
        match arg {
            LimitArg::Greedy => Self::Greedy,
            LimitArg::Relaxed => Self::Relaxed,
        }
    }
}

/// Where the item catalog comes from.
///
/// With no flags the built-in six-item example is used.
#[derive(Args, Debug)]
pub(crate) struct CatalogArgs {
    /// JSON catalog file: {"values": [..], "weights": [..], "capacity": N}
    #[arg(long, conflicts_with_all = ["values", "weights", "capacity"])]
    catalog: Option<PathBuf>,

    /// Item values (comma-separated)
    #[arg(long, value_delimiter = ',')]
    values: Vec<u64>,

    /// Item weights (comma-separated)
    #[arg(long, value_delimiter = ',')]
    weights: Vec<u64>,

    /// Knapsack capacity
    #[arg(long)]
    capacity: Option<u64>,
}

impl CatalogArgs {
    /// Build the catalog described by the flags.
    pub(crate) fn load(&self) -> Result<Catalog, CliError> {
        if let Some(path) = &self.catalog {
            return Catalog::from_json_file(path)
                .map_err(|e| CliError::new(format!("Failed to load {}: {e}", path.display())));
        }

        let inline = !self.values.is_empty() || !self.weights.is_empty() || self.capacity.is_some();
        if !inline {
            return Ok(Catalog::example());
        }

        let capacity = self
            .capacity
            .ok_or_else(|| CliError::new("--capacity is required with --values/--weights"))?;
        Ok(Catalog::new(self.values.clone(), self.weights.clone(), capacity)?)
    }
}

/// Engine settings; flags override the optional JSON config file.
#[derive(Args, Debug)]
pub(crate) struct EngineArgs {
    /// JSON engine configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Population size (default: 20)
    #[arg(short, long)]
    population: Option<usize>,

    /// Generation limit (default: 100)
    #[arg(short, long)]
    generations: Option<usize>,

    /// Tournament size (default: 3)
    #[arg(short, long)]
    tournament: Option<usize>,

    /// Base mutation probability (default: 0.1)
    #[arg(short, long)]
    mutation: Option<f64>,

    /// Genomes carried over unchanged (default: 2)
    #[arg(long)]
    elite: Option<usize>,

    /// Random seed (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Evaluate and reproduce on all cores
    #[arg(long)]
    parallel: bool,

    /// Early-stop target
    #[arg(long, default_value = "greedy")]
    limit: LimitArg,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl EngineArgs {
    /// Merge the config file and flags into a validated configuration.
    pub(crate) fn resolve(&self) -> Result<(EvolutionConfig, LimitStrategy), CliError> {
        let mut config = match &self.config {
            Some(path) => {
                let json = fs::read_to_string(path).map_err(|e| {
                    CliError::new(format!("Failed to read {}: {e}", path.display()))
                })?;
                serde_json::from_str(&json).map_err(|e| {
                    CliError::new(format!("Failed to parse {}: {e}", path.display()))
                })?
            }
            None => EvolutionConfig::default(),
        };

        if let Some(p) = self.population {
            config.population_size = p;
        }
        if let Some(g) = self.generations {
            config.generation_limit = g;
        }
        if let Some(t) = self.tournament {
            config.tournament_size = t;
        }
        if let Some(m) = self.mutation {
            config.mutation_probability = m;
        }
        if let Some(e) = self.elite {
            config.elite_count = e;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.parallel {
            config.parallel = true;
        }

        config.validate()?;
        Ok((config, self.limit.into()))
    }

    /// Whether to dump the configuration instead of running.
    pub(crate) fn print_config(&self) -> bool {
        self.print_config
    }
}

/// Print the effective configuration as pretty JSON.
pub(crate) fn print_config(config: &EvolutionConfig) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Seed to use when none was given, so that every run can be reproduced.
pub(crate) fn pick_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(42)
    })
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(format!("invalid configuration: {e}"))
    }
}

impl From<knapsack_evo::Error> for CliError {
    fn from(e: knapsack_evo::Error) -> Self {
        Self::new(e.to_string())
    }
}
