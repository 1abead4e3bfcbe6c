use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Periodic simulation box. Edges are fixed once the lattice has been rescaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationBox {
    pub lengths: Vector3<f64>,
}

impl SimulationBox {
    pub fn new(lengths: Vector3<f64>) -> Self {
        SimulationBox { lengths }
    }

    pub fn cubic(edge: f64) -> Self {
        SimulationBox::new(Vector3::new(edge, edge, edge))
    }

    /// Edge length of the cubic box (the shortest edge for a non-cubic one)
    pub fn edge(&self) -> f64 {
        self.lengths.min()
    }

    pub fn volume(&self) -> f64 {
        self.lengths.x * self.lengths.y * self.lengths.z
    }

    /// Minimum-image distance between two positions folded into the box
    pub fn distance(&self, p1: &Vector3<f64>, p2: &Vector3<f64>) -> f64 {
        pbc_distance(p1, p2, &self.lengths)
    }

    /// Fold a position that lies at most one edge outside the box back into [0, L)
    pub fn wrap(&self, mut pos: Vector3<f64>) -> Vector3<f64> {
        for k in 0..3 {
            pos[k] = wrap_coordinate(pos[k], self.lengths[k]);
        }
        pos
    }

    /// Scale the box edges uniformly
    pub fn scaled(&self, factor: f64) -> Self {
        SimulationBox::new(self.lengths * factor)
    }
}

/// Minimum-image distance for positions already folded into `[0, L)` on every axis.
///
/// For unfolded inputs the per-axis separation may exceed `L`, and the result is
/// then no longer the nearest-image distance.
pub fn pbc_distance(p1: &Vector3<f64>, p2: &Vector3<f64>, box_lengths: &Vector3<f64>) -> f64 {
    let mut r2 = 0.0;
    for k in 0..3 {
        let l = box_lengths[k];
        let mut d = (p2[k] - p1[k]).abs();
        if d > 0.5 * l {
            d = l - d;
        }
        r2 += d * d;
    }
    r2.sqrt()
}

/// Single periodic fold of one coordinate.
pub fn wrap_coordinate(x: f64, l: f64) -> f64 {
    let folded = if x < 0.0 {
        x + l
    } else if x >= l {
        x - l
    } else {
        x
    };
    // x + l can round up to exactly l for tiny negative x
    if folded >= l {
        0.0
    } else {
        folded
    }
}
