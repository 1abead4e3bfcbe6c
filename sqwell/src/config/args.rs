//! Command-line argument parsing for square-well Monte Carlo runs

use clap::Parser;

/// Square-well binary mixture Monte Carlo with YAML configuration
#[derive(Parser, Debug, Default)]
#[command(name = "sqwell")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    pub config_file: Option<String>,

    /// Override the random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the number of persisted sweeps
    #[arg(long)]
    pub total_steps: Option<usize>,

    /// Override the number of equilibration sweeps
    #[arg(long)]
    pub before_equilibrium: Option<usize>,

    /// Override the trajectory file path
    #[arg(short, long)]
    pub trajectory: Option<String>,

    /// Log file (default stdout)
    #[arg(short, long)]
    pub output: Option<String>,
}
