mod analysis;
mod config;
mod engine;
mod error;
mod geometry;
mod harvest;
mod manager;
mod model;
mod stats;
mod tide;

use crate::manager::Manager;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::{path::PathBuf, process::ExitCode};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Simulation directory holding config.toml and tide.csv
    #[arg(long, short = 'd', value_name = "DIR")]
    sim_dir: PathBuf,

    /// Also log every closure and harvest
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate the configured strategy and the full-catch reference
    Create,

    /// Summarize every run into analysis.toml
    Analyze,

    /// Remove all runs and the analysis file
    Clean,
}

impl Command {
    fn execute(self, mgr: &Manager) -> Result<()> {
        match self {
            Command::Create => mgr.create_run().context("failed to create run"),
            Command::Analyze => mgr.analyze_sim().context("failed to analyze sim"),
            Command::Clean => mgr.clean_sim().context("failed to clean sim"),
        }
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    log::debug!("{cli:#?}");

    let result = Manager::new(&cli.sim_dir)
        .with_context(|| format!("failed to open {:?}", cli.sim_dir))
        .and_then(|mgr| cli.command.execute(&mgr));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
