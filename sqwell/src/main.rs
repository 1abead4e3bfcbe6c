//! Square-well binary mixture Monte Carlo command-line interface

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use sqwell::config::Args;
use sqwell::io::setup_output;
use sqwell::{Simulation, SimulationConfig, TrajectoryWriter};
use tracing::info;

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_output(args.output.as_ref());

    let config = load_config(&args)?;
    info!("Configuration loaded:\n{:?}", config);

    let trajectory = config.output.trajectory.clone();
    let mut simulation = Simulation::new(config).wrap_err("Failed to set up the simulation")?;
    let mut writer = TrajectoryWriter::create(&trajectory)
        .wrap_err_with(|| format!("Unable to create trajectory file: {}", trajectory))?;

    let summary = simulation
        .run(&mut writer)
        .wrap_err_with(|| format!("Simulation aborted while writing {}", trajectory))?;
    writer.into_inner()?;

    info!(
        "Wrote {} frames to {} (energy per particle {:.6})",
        summary.frames_written, trajectory, summary.energy_per_particle
    );
    Ok(())
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let config = match &args.config_file {
        Some(path) => {
            info!("Reading configuration from: {}", path);
            SimulationConfig::from_file(path)
                .wrap_err_with(|| format!("Unable to load configuration file: {}", path))?
        }
        None => {
            info!("No configuration file given, using defaults");
            SimulationConfig::default()
        }
    };

    let config = config.with_overrides(args);
    config.validate()?;
    Ok(config)
}
