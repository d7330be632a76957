//! knapsack-evo CLI - solve 0/1 knapsack instances with a genetic algorithm.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use std::process::ExitCode;

/// knapsack-evo - A genetic algorithm for the 0/1 knapsack problem
#[derive(Parser, Debug)]
#[command(name = "knapsack-evo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one evolution and report the best packing
    Solve {
        #[command(flatten)]
        catalog: cli::CatalogArgs,

        #[command(flatten)]
        engine: cli::EngineArgs,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Interactive TUI to watch an evolution generation by generation
    Watch {
        #[command(flatten)]
        catalog: cli::CatalogArgs,

        #[command(flatten)]
        engine: cli::EngineArgs,

        /// Generation delay in milliseconds (default: 200)
        #[arg(long, default_value = "200")]
        speed: u64,
    },

    /// Run many seeded evolutions in parallel and aggregate the results
    Batch {
        #[command(flatten)]
        catalog: cli::CatalogArgs,

        #[command(flatten)]
        engine: cli::EngineArgs,

        /// Number of runs (default: 100)
        #[arg(short = 'n', long, default_value = "100")]
        runs: u64,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Show progress bar
        #[arg(long)]
        progress: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Solve {
            catalog,
            engine,
            format,
            progress,
        } => cli::solve::execute(&catalog, &engine, format, progress),

        Commands::Watch {
            catalog,
            engine,
            speed,
        } => cli::watch::execute(&catalog, &engine, speed),

        Commands::Batch {
            catalog,
            engine,
            runs,
            threads,
            format,
            progress,
        } => cli::batch::execute(&catalog, &engine, runs, threads, format, progress),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
