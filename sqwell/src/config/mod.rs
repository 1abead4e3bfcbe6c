//! Configuration for square-well Monte Carlo runs
//!
//! Every field falls back to the reference parameter set, so a YAML file only
//! has to name what it changes.

mod args;

pub use args::Args;

use crate::error::{Error, Result};
use crate::interaction::{PairWells, SquareWell};
use crate::particle::Species;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Lattice and species setup
    pub system: SystemConfig,
    /// Square-well parameters per species pair
    pub potential: PotentialConfig,
    /// Sweep counts and sampling controls
    pub run: RunConfig,
    /// Output files
    pub output: OutputConfig,
}

/// Lattice and species setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Number of unit cells per dimension; particle count is its cube
    pub unit_repeat: usize,
    /// Initial grid spacing before the volume-fraction rescale
    pub lattice_constant: f64,
    /// Target packing fraction
    pub volume_fraction: f64,
    /// Probability that a particle is species A
    pub ratio_ab: f64,
    pub diameter_a: f64,
    pub diameter_b: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            unit_repeat: 5,
            lattice_constant: 1.0,
            volume_fraction: 0.1,
            ratio_ab: 0.5,
            diameter_a: 1.0,
            diameter_b: 1.0,
        }
    }
}

impl SystemConfig {
    pub fn diameter(&self, species: Species) -> f64 {
        match species {
            Species::A => self.diameter_a,
            Species::B => self.diameter_b,
        }
    }

    pub fn particle_count(&self) -> usize {
        self.unit_repeat.pow(3)
    }
}

/// Square-well depths (energy units) and widths (length units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PotentialConfig {
    pub depth_aa: f64,
    pub depth_bb: f64,
    pub depth_ab: f64,
    pub width_aa: f64,
    pub width_bb: f64,
    pub width_ab: f64,
}

impl Default for PotentialConfig {
    fn default() -> Self {
        PotentialConfig {
            depth_aa: -5.0,
            depth_bb: -5.0,
            depth_ab: 5.0,
            width_aa: 0.1,
            width_bb: 0.1,
            width_ab: 0.5,
        }
    }
}

impl PotentialConfig {
    pub fn wells(&self) -> PairWells {
        PairWells {
            aa: SquareWell::new(self.depth_aa, self.width_aa),
            bb: SquareWell::new(self.depth_bb, self.width_bb),
            ab: SquareWell::new(self.depth_ab, self.width_ab),
        }
    }
}

/// Sweep counts and sampling controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Sweeps executed but not written to the trajectory
    pub before_equilibrium: usize,
    /// Sweeps written to the trajectory after equilibration
    pub total_steps: usize,
    /// Random seed; a fresh entropy seed is used when absent
    pub seed: Option<u64>,
    /// Reduced temperature kT dividing the energy change in the acceptance test
    pub temperature: f64,
    /// Initial trial step as a fraction of the box edge
    pub initial_step_fraction: f64,
    /// Sweeps between energy reports at info level
    pub report_interval: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            before_equilibrium: 0,
            total_steps: 500,
            seed: None,
            temperature: 1.0,
            initial_step_fraction: 0.1,
            report_interval: 50,
        }
    }
}

/// Output files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Trajectory written in the xyz-like text format
    pub trajectory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            trajectory: "positions_hard_sphere_attracted_binary.xyz".to_string(),
        }
    }
}

impl SimulationConfig {
    /// Load a YAML configuration file; callers validate after applying overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_yml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply command-line overrides on top of the file values
    pub fn with_overrides(mut self, args: &Args) -> Self {
        if let Some(seed) = args.seed {
            self.run.seed = Some(seed);
        }
        if let Some(steps) = args.total_steps {
            self.run.total_steps = steps;
        }
        if let Some(steps) = args.before_equilibrium {
            self.run.before_equilibrium = steps;
        }
        if let Some(path) = &args.trajectory {
            self.output.trajectory = path.clone();
        }
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        let system = &self.system;
        if system.unit_repeat == 0 {
            return Err(Error::invalid_config("unit_repeat must be at least 1"));
        }
        if !(system.lattice_constant > 0.0) {
            return Err(Error::invalid_config("lattice_constant must be positive"));
        }
        if !(system.volume_fraction > 0.0) {
            return Err(Error::invalid_config("volume_fraction must be positive"));
        }
        if !(0.0..=1.0).contains(&system.ratio_ab) {
            return Err(Error::invalid_config(format!(
                "ratio_ab must lie in [0, 1], got {}",
                system.ratio_ab
            )));
        }
        if !(system.diameter_a > 0.0) || !(system.diameter_b > 0.0) {
            return Err(Error::invalid_config("diameters must be positive"));
        }

        let potential = &self.potential;
        for (name, width) in [
            ("width_aa", potential.width_aa),
            ("width_bb", potential.width_bb),
            ("width_ab", potential.width_ab),
        ] {
            if !(width >= 0.0) {
                return Err(Error::invalid_config(format!(
                    "{name} must be non-negative, got {width}"
                )));
            }
        }
        for (name, depth) in [
            ("depth_aa", potential.depth_aa),
            ("depth_bb", potential.depth_bb),
            ("depth_ab", potential.depth_ab),
        ] {
            if !depth.is_finite() {
                return Err(Error::invalid_config(format!("{name} must be finite")));
            }
        }

        let run = &self.run;
        if !(run.temperature > 0.0) {
            return Err(Error::invalid_config("temperature must be positive"));
        }
        if !(run.initial_step_fraction > 0.0 && run.initial_step_fraction <= 1.0) {
            return Err(Error::invalid_config(
                "initial_step_fraction must lie in (0, 1]",
            ));
        }
        if run.report_interval == 0 {
            return Err(Error::invalid_config("report_interval must be positive"));
        }

        if self.output.trajectory.is_empty() {
            return Err(Error::invalid_config("trajectory path must not be empty"));
        }

        Ok(())
    }
}
