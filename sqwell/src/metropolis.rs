//! Single-particle Metropolis moves with an adaptive trial step.

use crate::energy::EnergyModel;
use crate::error::{Error, Result};
use crate::geometry::SimulationBox;
use nalgebra::Vector3;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Uniform;
use tracing::{debug, info};

/// Acceptance ratio above which the trial step grows
pub const TARGET_ACCEPT_HIGH: f64 = 0.5;
/// Acceptance ratio below which the trial step shrinks
pub const TARGET_ACCEPT_LOW: f64 = 0.45;
const STEP_GROWTH: f64 = 1.1;
const STEP_SHRINK: f64 = 0.9;
/// The trial step never drops below `box_edge / STEP_FLOOR_DIVISOR`
pub const STEP_FLOOR_DIVISOR: f64 = 50.0;

/// Metropolis acceptance probability `min(1, exp(-ΔE / kT))`.
///
/// Downhill and neutral moves return exactly 1 without evaluating the exponential.
/// Uphill moves are clamped into (0, 1].
pub fn acceptance_probability(delta_e: f64, temperature: f64) -> f64 {
    if delta_e <= 0.0 {
        return 1.0;
    }
    (-delta_e / temperature).exp().clamp(f64::MIN_POSITIVE, 1.0)
}

/// New trial step for the acceptance ratio of the sweep that just finished.
///
/// The result is floored at `box_edge / 50` and capped at `box_edge`, which keeps a
/// single periodic fold sufficient for every proposal.
pub fn adjust_step_size(old_step: f64, accept_ratio: f64, box_edge: f64) -> f64 {
    let new_step = if accept_ratio > TARGET_ACCEPT_HIGH {
        old_step * STEP_GROWTH
    } else if accept_ratio < TARGET_ACCEPT_LOW {
        old_step * STEP_SHRINK
    } else {
        old_step
    };
    new_step.max(box_edge / STEP_FLOOR_DIVISOR).min(box_edge)
}

/// Result of one trial displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    Accepted,
    /// Rejected by the hard core before any energy evaluation
    Overlap,
    /// Rejected by the Metropolis test
    EnergyRejected,
}

/// Counters accumulated over the whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveStatistics {
    pub attempts: u64,
    pub accepted: u64,
    pub overlap_rejections: u64,
    pub energy_rejections: u64,
    pub sweeps: u64,
}

impl MoveStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempts as f64
        }
    }

    fn record(&mut self, outcome: TrialOutcome) {
        self.attempts += 1;
        match outcome {
            TrialOutcome::Accepted => self.accepted += 1,
            TrialOutcome::Overlap => self.overlap_rejections += 1,
            TrialOutcome::EnergyRejected => self.energy_rejections += 1,
        }
    }

    pub fn log_summary(&self) {
        info!("=== Monte Carlo statistics ===");
        info!("Sweeps:             {}", self.sweeps);
        info!(
            "Trial moves:        {} / {} ({:.2}% accepted)",
            self.accepted,
            self.attempts,
            100.0 * self.acceptance_rate()
        );
        info!("Overlap rejections: {}", self.overlap_rejections);
        info!("Energy rejections:  {}", self.energy_rejections);
    }
}

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepReport {
    pub accepted: usize,
    pub accept_ratio: f64,
    /// Trial step to be used by the next sweep
    pub step_size: f64,
}

/// Metropolis Monte Carlo over a fixed set of particles.
///
/// Trials inside a sweep are applied one after another, so every trial sees the
/// moves accepted earlier in the same sweep.
#[derive(Debug)]
pub struct MetropolisEngine<P: EnergyModel> {
    pub positions: Vec<Vector3<f64>>,
    pub(crate) model: P,
    sim_box: SimulationBox,
    step_size: f64,
    temperature: f64,
    rng: StdRng,
    perturbation: Uniform<f64>,
    pub stats: MoveStatistics,
}

impl<P: EnergyModel> MetropolisEngine<P> {
    pub fn new(
        positions: Vec<Vector3<f64>>,
        model: P,
        sim_box: SimulationBox,
        step_size: f64,
        temperature: f64,
        rng: StdRng,
    ) -> Result<Self> {
        if positions.is_empty() {
            return Err(Error::invalid_config(
                "Monte Carlo needs at least one particle",
            ));
        }
        if !(temperature > 0.0) {
            return Err(Error::invalid_config("temperature must be positive"));
        }
        let edge = sim_box.edge();
        Ok(MetropolisEngine {
            positions,
            model,
            sim_box,
            step_size: step_size.max(edge / STEP_FLOOR_DIVISOR).min(edge),
            temperature,
            rng,
            perturbation: Uniform::new(-1.0, 1.0),
            stats: MoveStatistics::new(),
        })
    }

    pub fn model(&self) -> &P {
        &self.model
    }

    pub fn sim_box(&self) -> &SimulationBox {
        &self.sim_box
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn n_particles(&self) -> usize {
        self.positions.len()
    }

    /// Attempt to displace one randomly chosen particle
    pub fn trial_move(&mut self) -> TrialOutcome {
        let idx = self.rng.gen_range(0..self.positions.len());
        let old_pos = self.positions[idx];

        let displacement = Vector3::new(
            self.perturbation.sample(&mut self.rng),
            self.perturbation.sample(&mut self.rng),
            self.perturbation.sample(&mut self.rng),
        ) * self.step_size;
        let trial = self.sim_box.wrap(old_pos + displacement);

        let outcome = if self.model.is_overlapping(&trial, idx, &self.positions) {
            TrialOutcome::Overlap
        } else {
            let old_energy = self.model.particle_energy_at(idx, &old_pos, &self.positions);
            let new_energy = self.model.particle_energy_at(idx, &trial, &self.positions);
            let delta_e = new_energy - old_energy;

            // drawn for every move that clears the hard core
            let u: f64 = self.rng.gen();
            if u < acceptance_probability(delta_e, self.temperature) {
                self.positions[idx] = trial;
                TrialOutcome::Accepted
            } else {
                TrialOutcome::EnergyRejected
            }
        };

        self.stats.record(outcome);
        outcome
    }

    /// One sweep of `n_particles` trials followed by a step-size update
    pub fn sweep(&mut self) -> SweepReport {
        let n = self.positions.len();
        let accepted = (0..n)
            .filter(|_| self.trial_move() == TrialOutcome::Accepted)
            .count();

        let accept_ratio = accepted as f64 / n as f64;
        self.step_size = adjust_step_size(self.step_size, accept_ratio, self.sim_box.edge());
        self.stats.sweeps += 1;

        debug!(
            "Sweep {}: accept ratio {:.3}, next step {:.4}",
            self.stats.sweeps, accept_ratio, self.step_size
        );

        SweepReport {
            accepted,
            accept_ratio,
            step_size: self.step_size,
        }
    }

    pub fn total_energy(&self) -> f64 {
        self.model.total_energy(&self.positions)
    }

    pub fn energy_per_particle(&self) -> f64 {
        self.total_energy() / self.positions.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::SquareWellPotential;
    use crate::interaction::{InteractionTable, PairWells, SquareWell};
    use crate::particle::Species;
    use approx::assert_relative_eq;
    use std::cell::RefCell;

    fn lattice_engine(
        n_side: usize,
        spacing: f64,
        wells: PairWells,
        seed: u64,
    ) -> MetropolisEngine<SquareWellPotential> {
        let mut positions = Vec::new();
        let mut species = Vec::new();
        for i in 0..n_side {
            for j in 0..n_side {
                for k in 0..n_side {
                    positions.push(Vector3::new(i as f64, j as f64, k as f64) * spacing);
                    species.push(if (i + j + k) % 2 == 0 { Species::A } else { Species::B });
                }
            }
        }
        let diameters = vec![1.0; positions.len()];
        let sim_box = SimulationBox::cubic(n_side as f64 * spacing);
        let table = InteractionTable::new(wells, species, diameters).unwrap();
        let model = SquareWellPotential::new(table, sim_box);
        let step = sim_box.edge() / 10.0;
        MetropolisEngine::new(positions, model, sim_box, step, 1.0, StdRng::seed_from_u64(seed))
            .unwrap()
    }

    fn attractive_wells() -> PairWells {
        PairWells {
            aa: SquareWell::new(-5.0, 0.1),
            bb: SquareWell::new(-5.0, 0.1),
            ab: SquareWell::new(5.0, 0.5),
        }
    }

    fn hard_spheres() -> PairWells {
        let w = SquareWell::new(0.0, 0.0);
        PairWells { aa: w, bb: w, ab: w }
    }

    #[test]
    fn test_acceptance_probability() {
        assert_eq!(acceptance_probability(0.0, 1.0), 1.0);
        assert_eq!(acceptance_probability(-3.0, 1.0), 1.0);
        assert_eq!(acceptance_probability(-1e308, 1.0), 1.0);
        assert_relative_eq!(acceptance_probability(1.0, 1.0), (-1.0f64).exp());
        assert_relative_eq!(acceptance_probability(2.0, 2.0), (-1.0f64).exp());

        let tiny = acceptance_probability(1e308, 1.0);
        assert!(tiny > 0.0 && tiny <= 1.0);
    }

    #[test]
    fn test_adjust_step_size() {
        // floor is 10 / 50 = 0.2
        assert_relative_eq!(adjust_step_size(1.0, 0.6, 10.0), 1.1);
        assert_relative_eq!(adjust_step_size(1.0, 0.3, 10.0), 0.9);
        assert_eq!(adjust_step_size(1.0, 0.47, 10.0), 1.0);
        assert_eq!(adjust_step_size(1.0, 0.5, 10.0), 1.0);
        assert_eq!(adjust_step_size(1.0, 0.45, 10.0), 1.0);
    }

    #[test]
    fn test_adjust_step_size_applies_floor() {
        assert_relative_eq!(adjust_step_size(1.0, 0.6, 100.0), 2.0);
        assert_relative_eq!(adjust_step_size(2.1, 0.3, 100.0), 2.0);
    }

    #[test]
    fn test_step_size_floor_and_cap() {
        let edge = 10.0;
        let mut step = 0.5;
        for _ in 0..200 {
            step = adjust_step_size(step, 0.0, edge);
            assert!(step >= edge / 50.0);
        }
        assert_relative_eq!(step, edge / 50.0);

        for _ in 0..200 {
            let next = adjust_step_size(step, 1.0, edge);
            assert!(next >= step);
            step = next;
        }
        assert_eq!(step, edge);
    }

    #[test]
    fn test_sweep_counts_particle_trials() {
        let mut engine = lattice_engine(3, 2.0, attractive_wells(), 1);
        let report = engine.sweep();

        assert_eq!(engine.stats.attempts, 27);
        assert_eq!(engine.stats.sweeps, 1);
        assert_eq!(report.accepted as u64, engine.stats.accepted);
        assert_relative_eq!(report.accept_ratio, report.accepted as f64 / 27.0);
        assert_eq!(
            engine.stats.accepted + engine.stats.overlap_rejections + engine.stats.energy_rejections,
            27
        );
    }

    #[test]
    fn test_hard_core_never_violated() {
        let mut engine = lattice_engine(4, 1.3, attractive_wells(), 2);
        for _ in 0..30 {
            engine.sweep();
        }

        let model = engine.model();
        let n = engine.n_particles();
        for i in 0..n {
            for j in (i + 1)..n {
                let d = model.sim_box.distance(&engine.positions[i], &engine.positions[j]);
                assert!(d > model.table.contact(i, j));
            }
        }
    }

    #[test]
    fn test_positions_stay_in_box() {
        let mut engine = lattice_engine(3, 3.0, hard_spheres(), 3);
        for _ in 0..50 {
            engine.sweep();
        }
        let edge = engine.sim_box().edge();
        for p in &engine.positions {
            for k in 0..3 {
                assert!(p[k] >= 0.0 && p[k] < edge);
            }
        }
    }

    #[test]
    fn test_same_seed_reproduces_run() {
        let mut a = lattice_engine(3, 2.0, attractive_wells(), 99);
        let mut b = lattice_engine(3, 2.0, attractive_wells(), 99);

        for _ in 0..20 {
            let ra = a.sweep();
            let rb = b.sweep();
            assert_eq!(ra, rb);
        }
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn test_dilute_hard_spheres_grow_step() {
        // nearly every move is accepted, so the step grows to the cap
        let mut engine = lattice_engine(2, 10.0, hard_spheres(), 4);
        let mut previous = engine.step_size();
        for _ in 0..40 {
            let report = engine.sweep();
            if report.accept_ratio > TARGET_ACCEPT_HIGH {
                assert!(report.step_size >= previous);
            }
            previous = report.step_size;
        }
        assert!(engine.step_size() > 2.0);
        assert!(engine.step_size() <= engine.sim_box().edge());
    }

    #[test]
    fn test_hard_sphere_energy_stays_zero() {
        let mut engine = lattice_engine(3, 2.0, hard_spheres(), 5);
        for _ in 0..10 {
            engine.sweep();
            assert_eq!(engine.total_energy(), 0.0);
        }
    }

    /// Accepts every move and records the configuration each trial was tested against
    #[derive(Debug, Default)]
    struct RecordingModel {
        seen: RefCell<Vec<Vec<Vector3<f64>>>>,
    }

    impl EnergyModel for RecordingModel {
        fn particle_energy_at(&self, _: usize, _: &Vector3<f64>, _: &[Vector3<f64>]) -> f64 {
            0.0
        }

        fn total_energy(&self, _: &[Vector3<f64>]) -> f64 {
            0.0
        }

        fn is_overlapping(&self, _: &Vector3<f64>, _: usize, positions: &[Vector3<f64>]) -> bool {
            self.seen.borrow_mut().push(positions.to_vec());
            false
        }
    }

    #[test]
    fn test_trials_see_earlier_moves_of_the_sweep() {
        let positions = vec![
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(3.0, 3.0, 3.0),
            Vector3::new(5.0, 5.0, 5.0),
            Vector3::new(7.0, 7.0, 7.0),
        ];
        let sim_box = SimulationBox::cubic(10.0);
        let mut engine = MetropolisEngine::new(
            positions,
            RecordingModel::default(),
            sim_box,
            1.0,
            1.0,
            StdRng::seed_from_u64(17),
        )
        .unwrap();

        let report = engine.sweep();
        assert_eq!(report.accepted, 4);

        let seen = engine.model().seen.borrow();
        assert_eq!(seen.len(), 4);
        let moved = |a: &[Vector3<f64>], b: &[Vector3<f64>]| {
            a.iter().zip(b).filter(|(p, q)| p != q).count()
        };
        // each trial is tested against the result of the one before it
        for k in 1..seen.len() {
            assert_eq!(moved(&seen[k - 1], &seen[k]), 1);
        }
        assert_eq!(moved(&seen[3], &engine.positions), 1);
    }

    #[test]
    fn test_empty_system_is_rejected() {
        let table = InteractionTable::new(hard_spheres(), vec![], vec![]).unwrap();
        let sim_box = SimulationBox::cubic(1.0);
        let model = SquareWellPotential::new(table, sim_box);
        let engine =
            MetropolisEngine::new(vec![], model, sim_box, 0.1, 1.0, StdRng::seed_from_u64(0));
        assert!(engine.is_err());
    }
}
