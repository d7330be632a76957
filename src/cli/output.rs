//! Output formatting utilities for CLI.

// Rates, averages and bar heights cast between counts and f64
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use knapsack_evo::ga::GenerationStats;
use knapsack_evo::{Catalog, Outcome};
use serde::Serialize;
use std::fmt::Write as _;

const SPARK_BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// JSON-serializable item row.
#[derive(Debug, Clone, Copy, Serialize)]
pub(super) struct JsonItem {
    /// Item number (1-based).
    pub(super) item: usize,
    /// Item value.
    pub(super) value: u64,
    /// Item weight.
    pub(super) weight: u64,
    /// Whether the best genome packs this item.
    pub(super) included: bool,
}

/// JSON-serializable result of one run.
#[derive(Debug, Serialize)]
pub(super) struct JsonSolveResult {
    /// Master seed of the run.
    pub(super) seed: u64,
    /// Index of the last evaluated generation.
    pub(super) generation: usize,
    /// Early-stop target.
    pub(super) fitness_limit: u64,
    /// Whether the target was reached.
    pub(super) limit_reached: bool,
    /// Best genome as a bit string.
    pub(super) best: String,
    /// Fitness of the best genome.
    pub(super) fitness: u64,
    /// Total weight of the best genome's packing.
    pub(super) weight: u128,
    /// Knapsack capacity.
    pub(super) capacity: u64,
    /// Per-item breakdown of the best genome.
    pub(super) items: Vec<JsonItem>,
    /// Per-generation statistics.
    pub(super) history: Vec<GenerationStats>,
}

impl JsonSolveResult {
    /// Create from a finished run.
    pub(super) fn from_outcome(outcome: &Outcome, catalog: &Catalog, fitness_limit: u64) -> Self {
        let best = outcome.best().cloned().unwrap_or_default();
        let packing = catalog.pack(&best);
        let items = catalog
            .items()
            .map(|item| JsonItem {
                item: item.index + 1,
                value: item.value,
                weight: item.weight,
                included: best.gene(item.index).unwrap_or(false),
            })
            .collect();

        Self {
            seed: outcome.seed,
            generation: outcome.generation,
            fitness_limit,
            limit_reached: outcome.best_fitness() >= fitness_limit,
            best: best.to_string(),
            fitness: outcome.best_fitness(),
            weight: packing.weight,
            capacity: catalog.capacity(),
            items,
            history: outcome.history.clone(),
        }
    }
}

/// Render a series as a one-line bar chart.
pub(super) fn sparkline(series: &[u64]) -> String {
    let Some(&max) = series.iter().max() else {
        return String::new();
    };
    let min = series.iter().copied().min().unwrap_or(max);
    let span = max - min;
    series
        .iter()
        .map(|&v| {
            if span == 0 {
                SPARK_BARS[SPARK_BARS.len() - 1]
            } else {
                let idx = ((v - min) as f64 / span as f64 * (SPARK_BARS.len() - 1) as f64).round();
                SPARK_BARS[idx as usize]
            }
        })
        .collect()
}

/// Format a run result as human-readable text.
pub(super) fn format_solve_text(result: &JsonSolveResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Evolution Result (seed: {})", result.seed);
    let _ = writeln!(output, "========================================");
    let _ = writeln!(output, "  Best Solution: {}", result.best);
    let _ = writeln!(output, "  Total Value:   {}", result.fitness);
    let _ = writeln!(output, "  Total Weight:  {} / {}", result.weight, result.capacity);
    let _ = writeln!(
        output,
        "  Generations:   {} (limit {} {})\n",
        result.generation + 1,
        result.fitness_limit,
        if result.limit_reached { "reached" } else { "not reached" }
    );

    let _ = writeln!(output, "  Item  Value  Weight  Packed");
    for item in &result.items {
        let _ = writeln!(
            output,
            "  {:>4}  {:>5}  {:>6}  {}",
            item.item,
            item.value,
            item.weight,
            if item.included { "yes" } else { "-" }
        );
    }

    let best: Vec<u64> = result.history.iter().map(|s| s.best_fitness).collect();
    if !best.is_empty() {
        let _ = writeln!(output, "\n  Best fitness: {}", sparkline(&best));
    }

    output
}

/// Format a run's per-generation history as CSV.
pub(super) fn format_solve_csv(result: &JsonSolveResult) -> String {
    let mut output = String::from("generation,best_fitness,mean_fitness,worst_fitness,fitness_std,diversity\n");
    for s in &result.history {
        let _ = writeln!(
            output,
            "{},{},{:.2},{},{:.2},{:.4}",
            s.generation, s.best_fitness, s.mean_fitness, s.worst_fitness, s.fitness_std, s.diversity
        );
    }
    output
}

/// Aggregated statistics over many runs.
#[derive(Debug, Default, Clone)]
pub(super) struct BatchStats {
    /// Total runs completed.
    pub(super) runs: u64,
    /// Runs whose best fitness reached the limit.
    pub(super) reached: u64,
    /// Sum of last generation indices.
    total_generations: u64,
    /// Fewest generations used by any run.
    min_generation: Option<usize>,
    /// Most generations used by any run.
    max_generation: Option<usize>,
    /// Best fitness seen in any run, with its seed and genome.
    best: Option<(u64, u64, String)>,
}

impl BatchStats {
    /// Empty stats.
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Add one finished run.
    pub(super) fn add_outcome(&mut self, outcome: &Outcome, fitness_limit: u64) {
        self.runs += 1;
        if outcome.best_fitness() >= fitness_limit {
            self.reached += 1;
        }
        self.total_generations += outcome.generation as u64;
        self.min_generation = Some(self.min_generation.map_or(outcome.generation, |g| g.min(outcome.generation)));
        self.max_generation = Some(self.max_generation.map_or(outcome.generation, |g| g.max(outcome.generation)));

        let fitness = outcome.best_fitness();
        if self.best.as_ref().is_none_or(|(f, _, _)| fitness > *f)
            && let Some(genome) = outcome.best()
        {
            self.best = Some((fitness, outcome.seed, genome.to_string()));
        }
    }

    /// Merge stats from another worker.
    pub(super) fn merge(&mut self, other: &Self) {
        self.runs += other.runs;
        self.reached += other.reached;
        self.total_generations += other.total_generations;
        self.min_generation = match (self.min_generation, other.min_generation) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max_generation = match (self.max_generation, other.max_generation) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        if let Some(theirs) = &other.best
            && self.best.as_ref().is_none_or(|ours| theirs.0 > ours.0)
        {
            self.best = Some(theirs.clone());
        }
    }

    /// Fraction of runs that reached the limit.
    pub(super) fn success_rate(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.reached as f64 / self.runs as f64
    }

    /// Mean last generation index.
    pub(super) fn avg_generation(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.total_generations as f64 / self.runs as f64
    }
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult {
    /// Total runs.
    runs: u64,
    /// Runs that reached the limit.
    reached: u64,
    /// Success rate (0.0-1.0).
    success_rate: f64,
    /// Early-stop target.
    fitness_limit: u64,
    /// Mean last generation index.
    avg_generation: f64,
    /// Fewest generations.
    min_generation: Option<usize>,
    /// Most generations.
    max_generation: Option<usize>,
    /// Best fitness found.
    best_fitness: Option<u64>,
    /// Seed of the run that found it.
    best_seed: Option<u64>,
    /// Best genome found.
    best_genome: Option<String>,
}

impl JsonBatchResult {
    /// Create from aggregated stats.
    pub(super) fn from_stats(stats: &BatchStats, fitness_limit: u64) -> Self {
        Self {
            runs: stats.runs,
            reached: stats.reached,
            success_rate: stats.success_rate(),
            fitness_limit,
            avg_generation: stats.avg_generation(),
            min_generation: stats.min_generation,
            max_generation: stats.max_generation,
            best_fitness: stats.best.as_ref().map(|b| b.0),
            best_seed: stats.best.as_ref().map(|b| b.1),
            best_genome: stats.best.as_ref().map(|b| b.2.clone()),
        }
    }
}

/// Format batch stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats, fitness_limit: u64) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Batch Results ({} runs)", stats.runs);
    let _ = writeln!(output, "========================================\n");
    let _ = writeln!(
        output,
        "  Reached limit {}: {:.1}% ({} runs)",
        fitness_limit,
        stats.success_rate() * 100.0,
        stats.reached
    );
    let _ = writeln!(
        output,
        "  Generations: avg {:.1}, min {}, max {}",
        stats.avg_generation(),
        stats.min_generation.unwrap_or(0),
        stats.max_generation.unwrap_or(0)
    );
    if let Some((fitness, seed, genome)) = &stats.best {
        let _ = writeln!(output, "  Best: {genome} = {fitness} (seed {seed})");
    }

    output
}

/// Format batch stats as CSV.
pub(super) fn format_batch_csv(stats: &BatchStats, fitness_limit: u64) -> String {
    let mut output = String::from("runs,reached,success_rate,fitness_limit,avg_generation,min_generation,max_generation,best_fitness\n");
    let _ = writeln!(
        output,
        "{},{},{:.4},{},{:.2},{},{},{}",
        stats.runs,
        stats.reached,
        stats.success_rate(),
        fitness_limit,
        stats.avg_generation(),
        stats.min_generation.unwrap_or(0),
        stats.max_generation.unwrap_or(0),
        stats.best.as_ref().map_or(0, |b| b.0)
    );
    output
}
