use crate::geometry::SimulationBox;
use crate::interaction::InteractionTable;
use nalgebra::Vector3;

/// Energy and hard-core queries the Metropolis engine needs from a pair model
pub trait EnergyModel {
    /// Energy of particle `i` placed at `pos` against every other particle
    fn particle_energy_at(&self, i: usize, pos: &Vector3<f64>, positions: &[Vector3<f64>]) -> f64;

    /// Total energy, each unordered pair counted once
    fn total_energy(&self, positions: &[Vector3<f64>]) -> f64;

    /// Whether particle `i` placed at `trial` touches or penetrates any other core
    fn is_overlapping(&self, trial: &Vector3<f64>, i: usize, positions: &[Vector3<f64>]) -> bool;

    fn particle_energy(&self, i: usize, positions: &[Vector3<f64>]) -> f64 {
        self.particle_energy_at(i, &positions[i], positions)
    }
}

/// Hard spheres with a species-dependent square well in a periodic box
#[derive(Debug, Clone)]
pub struct SquareWellPotential {
    pub table: InteractionTable,
    pub sim_box: SimulationBox,
}

impl SquareWellPotential {
    pub fn new(table: InteractionTable, sim_box: SimulationBox) -> Self {
        SquareWellPotential { table, sim_box }
    }

    /// Both ends of the well are inclusive: a pair sitting exactly at the outer
    /// radius interacts.
    pub fn pair_is_interacting(&self, i: usize, j: usize, positions: &[Vector3<f64>]) -> bool {
        self.within_range(i, j, &positions[i], &positions[j])
    }

    #[inline]
    fn within_range(&self, i: usize, j: usize, pi: &Vector3<f64>, pj: &Vector3<f64>) -> bool {
        self.sim_box.distance(pi, pj) <= self.table.interaction_range(i, j)
    }
}

impl EnergyModel for SquareWellPotential {
    fn particle_energy_at(&self, i: usize, pos: &Vector3<f64>, positions: &[Vector3<f64>]) -> f64 {
        positions
            .iter()
            .enumerate()
            .filter(|&(j, pj)| j != i && self.within_range(i, j, pos, pj))
            .map(|(j, _)| self.table.well(i, j).depth)
            .sum()
    }

    fn total_energy(&self, positions: &[Vector3<f64>]) -> f64 {
        let n = positions.len();
        let mut energy = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                if self.pair_is_interacting(i, j, positions) {
                    energy += self.table.well(i, j).depth;
                }
            }
        }
        energy
    }

    fn is_overlapping(&self, trial: &Vector3<f64>, i: usize, positions: &[Vector3<f64>]) -> bool {
        positions
            .iter()
            .enumerate()
            .any(|(j, pj)| j != i && self.sim_box.distance(trial, pj) <= self.table.contact(i, j))
    }
}
