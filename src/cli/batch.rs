//! Batch command implementation.

// Run counts are reported as f64 rates
#![allow(clippy::cast_precision_loss)]

use super::output::{BatchStats, JsonBatchResult, format_batch_csv, format_batch_text};
use super::{CatalogArgs, CliError, EngineArgs, OutputFormat, pick_seed, print_config};
use indicatif::{ProgressBar, ProgressStyle};
use knapsack_evo::ga::EvolutionConfig;
use log::warn;
use rayon::prelude::*;
use std::time::Instant;

/// Execute the batch command.
///
/// Run `i` uses seed `base + i`, so any run can be replayed with `solve --seed`.
///
/// # Errors
///
/// Returns an error if the catalog or configuration is invalid.
pub(crate) fn execute(
    catalog_args: &CatalogArgs,
    engine_args: &EngineArgs,
    runs: u64,
    threads: Option<usize>,
    format: OutputFormat,
    progress: bool,
) -> Result<(), CliError> {
    let catalog = catalog_args.load()?;
    let (config, strategy) = engine_args.resolve()?;
    let base_seed = pick_seed(config.seed);

    if engine_args.print_config() {
        return print_config(&EvolutionConfig { seed: Some(base_seed), ..config });
    }

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let fitness_limit = catalog.limit(strategy);

    let pb = if progress {
        let pb = ProgressBar::new(runs);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} runs ({per_sec})")
                .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Runs are already spread across the pool, so each engine stays sequential
    let stats = (0..runs)
        .into_par_iter()
        .fold(BatchStats::new, |mut local, i| {
            let run_config = EvolutionConfig {
                seed: Some(base_seed.wrapping_add(i)),
                parallel: false,
                ..config
            };
            match catalog.solve(run_config, strategy, &mut ()) {
                Ok(outcome) => local.add_outcome(&outcome, fitness_limit),
                Err(e) => warn!("run {i} failed: {e}"),
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local
        })
        .reduce(BatchStats::new, |mut a, b| {
            a.merge(&b);
            a
        });

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let runs_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.runs as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats, fitness_limit));
            println!();
            println!("Base seed: {base_seed}");
            println!("Duration: {:.2}s ({:.0} runs/sec)", duration.as_secs_f64(), runs_per_sec);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonBatchResult::from_stats(&stats, fitness_limit))
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Csv => {
            print!("{}", format_batch_csv(&stats, fitness_limit));
        }
    }

    Ok(())
}
