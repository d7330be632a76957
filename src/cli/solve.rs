//! Solve command implementation.

use super::output::{JsonSolveResult, format_solve_csv, format_solve_text};
use super::{CatalogArgs, CliError, EngineArgs, OutputFormat, pick_seed, print_config};
use indicatif::{ProgressBar, ProgressStyle};
use knapsack_evo::ga::{GenerationReport, LogObserver};
use std::time::Instant;

/// Execute the solve command.
///
/// # Errors
///
/// Returns an error if the catalog or configuration is invalid.
pub(crate) fn execute(
    catalog_args: &CatalogArgs,
    engine_args: &EngineArgs,
    format: OutputFormat,
    progress: bool,
) -> Result<(), CliError> {
    let catalog = catalog_args.load()?;
    let (mut config, strategy) = engine_args.resolve()?;
    config.seed = Some(pick_seed(config.seed));

    if engine_args.print_config() {
        return print_config(&config);
    }

    let fitness_limit = catalog.limit(strategy);

    let pb = if progress {
        let pb = ProgressBar::new(config.generation_limit as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} generations {msg}")
                .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let mut observer = (LogObserver, |report: &GenerationReport<'_>| {
        if let Some(pb) = &pb {
            pb.set_position(report.generation as u64 + 1);
            pb.set_message(format!("best {}/{fitness_limit}", report.best_fitness()));
        }
    });
    let outcome = catalog.solve(config, strategy, &mut observer)?;
    let duration = start.elapsed();

    if let Some(pb) = pb {
        pb.finish_with_message(format!("best {}/{fitness_limit}", outcome.best_fitness()));
    }

    let result = JsonSolveResult::from_outcome(&outcome, &catalog, fitness_limit);
    match format {
        OutputFormat::Text => {
            print!("{}", format_solve_text(&result));
            println!("\nDuration: {:.3}s", duration.as_secs_f64());
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Csv => {
            print!("{}", format_solve_csv(&result));
        }
    }

    Ok(())
}
