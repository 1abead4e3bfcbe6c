use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Species label of a particle in the binary mixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    A,
    B,
}

impl Species {
    pub fn label(&self) -> &'static str {
        match self {
            Species::A => "A",
            Species::B => "B",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A hard sphere of the mixture. The index in the particle list is its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub species: Species,
    pub diameter: f64,
    pub position: Vector3<f64>,
}

impl Particle {
    pub fn new(species: Species, diameter: f64, position: Vector3<f64>) -> Self {
        Particle {
            species,
            diameter,
            position,
        }
    }

    pub fn volume(&self) -> f64 {
        std::f64::consts::PI * self.diameter.powi(3) / 6.0
    }
}
