//! Equilibration + production driver tying the lattice, potential, engine and
//! trajectory together.

use crate::config::SimulationConfig;
use crate::energy::SquareWellPotential;
use crate::error::Result;
use crate::interaction::InteractionTable;
use crate::io::{Frame, TrajectoryWriter};
use crate::lattice::build_lattice;
use crate::metropolis::{MetropolisEngine, MoveStatistics};
use crate::particle::Species;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use tracing::{debug, info};

/// Figures reported at the end of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub sweeps: usize,
    pub frames_written: usize,
    pub energy_per_particle: f64,
    pub final_step_size: f64,
    pub stats: MoveStatistics,
}

pub struct Simulation {
    pub config: SimulationConfig,
    pub engine: MetropolisEngine<SquareWellPotential>,
    species: Vec<Species>,
}

impl Simulation {
    /// Build the lattice and interaction table and seed the engine.
    ///
    /// The same generator draws the species and then drives every trial move.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.run.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let lattice = build_lattice(&config.system, &mut rng);
        let table = InteractionTable::from_particles(config.potential.wells(), &lattice.particles);
        let species: Vec<Species> = lattice.particles.iter().map(|p| p.species).collect();
        let positions = lattice.particles.iter().map(|p| p.position).collect();

        let sim_box = lattice.sim_box;
        let step_size = sim_box.edge() * config.run.initial_step_fraction;
        info!(
            "Initialized {} particles in a periodic box of edge {:.6} (volume fraction {:.4})",
            species.len(),
            sim_box.edge(),
            lattice.volume_fraction()
        );
        info!("Initial trial step: {:.6}", step_size);

        let model = SquareWellPotential::new(table, sim_box);
        let engine = MetropolisEngine::new(
            positions,
            model,
            sim_box,
            step_size,
            config.run.temperature,
            rng,
        )?;

        Ok(Simulation {
            config,
            engine,
            species,
        })
    }

    pub fn frame(&self, step: usize) -> Frame<'_> {
        Frame {
            step,
            sim_box: self.engine.sim_box(),
            species: &self.species,
            positions: &self.engine.positions,
        }
    }

    /// Run `before_equilibrium` unsaved sweeps, then `total_steps` sweeps whose
    /// starting configuration is written before any of their moves.
    pub fn run<W: Write>(&mut self, writer: &mut TrajectoryWriter<W>) -> Result<RunSummary> {
        let before = self.config.run.before_equilibrium;
        let total = before + self.config.run.total_steps;
        let report_interval = self.config.run.report_interval;

        info!(
            "Running {} equilibration and {} production sweeps",
            before, self.config.run.total_steps
        );

        for t in 0..total {
            if t >= before {
                writer.write_frame(&self.frame(t))?;
            }

            let report = self.engine.sweep();
            debug!(
                "Sweep {}: energy per particle {:.6}",
                t + 1,
                self.engine.energy_per_particle()
            );

            if (t + 1) % report_interval == 0 {
                info!(
                    "Sweep {:>6}: accept ratio {:.3}, step {:.4}, energy per particle {:.6}",
                    t + 1,
                    report.accept_ratio,
                    report.step_size,
                    self.engine.energy_per_particle()
                );
            }
        }

        let energy_per_particle = self.engine.energy_per_particle();
        info!("Final energy per particle: {:.6}", energy_per_particle);
        self.engine.stats.log_summary();

        Ok(RunSummary {
            sweeps: total,
            frames_written: writer.frames_written(),
            energy_per_particle,
            final_step_size: self.engine.step_size(),
            stats: self.engine.stats.clone(),
        })
    }
}
