//! Simple-cubic starting configuration for the binary mixture.

use crate::config::SystemConfig;
use crate::geometry::SimulationBox;
use crate::particle::{Particle, Species};
use itertools::iproduct;
use nalgebra::Vector3;
use rand::Rng;
use tracing::{debug, warn};

/// Initial configuration produced by [`build_lattice`]
#[derive(Debug, Clone)]
pub struct Lattice {
    pub sim_box: SimulationBox,
    pub particles: Vec<Particle>,
}

impl Lattice {
    pub fn volume_fraction(&self) -> f64 {
        self.particles.iter().map(Particle::volume).sum::<f64>() / self.sim_box.volume()
    }
}

/// Build `unit_repeat^3` particles on a simple-cubic grid and rescale the box to
/// the target volume fraction.
///
/// Species are drawn independently per particle, A with probability `ratio_ab`.
/// Non-overlap after the rescale is the caller's responsibility; a warning is
/// logged when the rescaled spacing is below the largest diameter.
pub fn build_lattice<R: Rng + ?Sized>(system: &SystemConfig, rng: &mut R) -> Lattice {
    let n_side = system.unit_repeat;
    let a = system.lattice_constant;
    let n_particles = n_side * n_side * n_side;

    let species: Vec<Species> = (0..n_particles)
        .map(|_| {
            if rng.gen::<f64>() <= system.ratio_ab {
                Species::A
            } else {
                Species::B
            }
        })
        .collect();

    let mut particles: Vec<Particle> = iproduct!(0..n_side, 0..n_side, 0..n_side)
        .zip(&species)
        .map(|((i, j, k), &s)| {
            let pos = Vector3::new(i as f64, j as f64, k as f64) * a;
            Particle::new(s, system.diameter(s), pos)
        })
        .collect();

    let initial_box = SimulationBox::cubic(n_side as f64 * a);
    let occupied: f64 = particles.iter().map(Particle::volume).sum();
    let initial_fraction = occupied / initial_box.volume();
    let rescale = (initial_fraction / system.volume_fraction).cbrt();

    for p in &mut particles {
        p.position *= rescale;
    }
    let sim_box = initial_box.scaled(rescale);

    let n_a = species.iter().filter(|&&s| s == Species::A).count();
    debug!(
        "Lattice: {} particles ({} A, {} B), initial volume fraction {:.4}, rescale {:.4}",
        n_particles,
        n_a,
        n_particles - n_a,
        initial_fraction,
        rescale
    );

    let spacing = a * rescale;
    let max_contact = system.diameter_a.max(system.diameter_b);
    if n_side > 1 && spacing < max_contact {
        warn!(
            "Rescaled lattice spacing {:.4} is below the largest diameter {:.4}; the initial configuration overlaps",
            spacing, max_contact
        );
    }

    Lattice {
        sim_box,
        particles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn system(unit_repeat: usize, ratio_ab: f64) -> SystemConfig {
        SystemConfig {
            unit_repeat,
            ratio_ab,
            ..SystemConfig::default()
        }
    }

    #[test]
    fn test_lattice_size_and_volume_fraction() {
        let mut rng = StdRng::seed_from_u64(1);
        let lattice = build_lattice(&system(4, 0.5), &mut rng);

        assert_eq!(lattice.particles.len(), 64);
        assert_relative_eq!(lattice.volume_fraction(), 0.1, epsilon = 1e-10);
    }

    #[test]
    fn test_positions_inside_rescaled_box() {
        let mut rng = StdRng::seed_from_u64(2);
        let lattice = build_lattice(&system(3, 0.5), &mut rng);
        let edge = lattice.sim_box.edge();

        for p in &lattice.particles {
            for k in 0..3 {
                assert!(p.position[k] >= 0.0 && p.position[k] < edge);
            }
        }
        // grid spacing follows the box
        assert_relative_eq!(
            lattice.particles[1].position.z,
            edge / 3.0,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_species_ratio_extremes() {
        let mut rng = StdRng::seed_from_u64(3);
        let all_a = build_lattice(&system(3, 1.0), &mut rng);
        assert!(all_a.particles.iter().all(|p| p.species == Species::A));

        let all_b = build_lattice(&system(3, 0.0), &mut rng);
        assert!(all_b.particles.iter().all(|p| p.species == Species::B));
    }

    #[test]
    fn test_species_ratio_in_expectation() {
        let mut rng = StdRng::seed_from_u64(4);
        let lattice = build_lattice(&system(10, 0.3), &mut rng);
        let n_a = lattice
            .particles
            .iter()
            .filter(|p| p.species == Species::A)
            .count();
        let fraction = n_a as f64 / 1000.0;
        assert!((fraction - 0.3).abs() < 0.06);
    }

    #[test]
    fn test_diameters_follow_species() {
        let mut rng = StdRng::seed_from_u64(5);
        let cfg = SystemConfig {
            diameter_a: 1.0,
            diameter_b: 0.5,
            ..system(3, 0.5)
        };
        let lattice = build_lattice(&cfg, &mut rng);
        for p in &lattice.particles {
            match p.species {
                Species::A => assert_eq!(p.diameter, 1.0),
                Species::B => assert_eq!(p.diameter, 0.5),
            }
        }
    }
}
