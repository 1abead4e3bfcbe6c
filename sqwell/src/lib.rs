//! Metropolis Monte Carlo for a binary mixture of hard spheres with
//! species-dependent square-well attraction in a periodic cubic box.

pub mod config;
pub mod energy;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod io;
pub mod lattice;
pub mod metropolis;
pub mod particle;
pub mod simulation;

pub use config::SimulationConfig;
pub use energy::{EnergyModel, SquareWellPotential};
pub use error::{Error, Result};
pub use geometry::{pbc_distance, SimulationBox};
pub use interaction::{InteractionTable, PairWells, SquareWell};
pub use io::{Frame, TrajectoryWriter};
pub use lattice::{build_lattice, Lattice};
pub use metropolis::{acceptance_probability, adjust_step_size, MetropolisEngine};
pub use particle::{Particle, Species};
pub use simulation::{RunSummary, Simulation};
