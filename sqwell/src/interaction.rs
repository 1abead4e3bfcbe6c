use crate::error::{Error, Result};
use crate::particle::{Particle, Species};
use serde::{Deserialize, Serialize};

/// Depth and width of one square well
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquareWell {
    /// Energy inside the well (negative attracts, positive repels)
    pub depth: f64,
    /// Range of the well beyond contact
    pub width: f64,
}

impl SquareWell {
    pub fn new(depth: f64, width: f64) -> Self {
        SquareWell { depth, width }
    }
}

/// The three species-pair wells of a binary mixture
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairWells {
    pub aa: SquareWell,
    pub bb: SquareWell,
    pub ab: SquareWell,
}

impl PairWells {
    pub fn get(&self, s1: Species, s2: Species) -> SquareWell {
        match (s1, s2) {
            (Species::A, Species::A) => self.aa,
            (Species::B, Species::B) => self.bb,
            _ => self.ab,
        }
    }
}

/// Per-particle lookup of square-well parameters.
///
/// Keeps the species and diameter of every particle next to the three wells, so a
/// pair query is two index loads and a match.
#[derive(Debug, Clone)]
pub struct InteractionTable {
    wells: PairWells,
    species: Vec<Species>,
    diameters: Vec<f64>,
}

impl InteractionTable {
    pub fn new(wells: PairWells, species: Vec<Species>, diameters: Vec<f64>) -> Result<Self> {
        if species.len() != diameters.len() {
            return Err(Error::LengthMismatch {
                what: "diameters",
                found: diameters.len(),
                expected: species.len(),
            });
        }
        Ok(InteractionTable {
            wells,
            species,
            diameters,
        })
    }

    pub fn from_particles(wells: PairWells, particles: &[Particle]) -> Self {
        InteractionTable {
            wells,
            species: particles.iter().map(|p| p.species).collect(),
            diameters: particles.iter().map(|p| p.diameter).collect(),
        }
    }

    /// Square well acting between particles `i` and `j` (`i != j`)
    #[inline]
    pub fn well(&self, i: usize, j: usize) -> SquareWell {
        self.wells.get(self.species[i], self.species[j])
    }

    /// Hard-core contact distance, the mean of the two diameters
    #[inline]
    pub fn contact(&self, i: usize, j: usize) -> f64 {
        0.5 * (self.diameters[i] + self.diameters[j])
    }

    /// Outer radius of the well between `i` and `j`
    #[inline]
    pub fn interaction_range(&self, i: usize, j: usize) -> f64 {
        self.well(i, j).width + self.contact(i, j)
    }
}
