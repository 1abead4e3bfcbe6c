//! Trajectories written by `sqwell` read back and analysed

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rdf::{compute_rdf, get_frames_from_xyz, Bins, PeriodicBox, XyzFrames};
use sqwell::{Frame, Simulation, SimulationBox, SimulationConfig, Species, TrajectoryWriter};
use tempfile::tempdir;

#[test]
fn test_written_frames_read_back_exactly() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("random.xyz");

    let mut rng = StdRng::seed_from_u64(11);
    let sim_box = SimulationBox::cubic(4.5);
    let positions: Vec<Vector3<f64>> = (0..10)
        .map(|_| Vector3::new(rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()) * 4.5)
        .collect();
    let species: Vec<Species> = (0..10)
        .map(|i| if i % 3 == 0 { Species::B } else { Species::A })
        .collect();

    let mut writer = TrajectoryWriter::create(&path).unwrap();
    for step in [3, 4] {
        let frame = Frame {
            step,
            sim_box: &sim_box,
            species: &species,
            positions: &positions,
        };
        writer.write_frame(&frame).unwrap();
    }
    writer.into_inner().unwrap();

    let frames = get_frames_from_xyz(&path, 3).unwrap();
    assert_eq!(frames.len(), 2);
    for (row, p) in frames[1].iter().zip(&positions) {
        assert_eq!(row, &vec![p.x, p.y, p.z]);
    }

    let first = XyzFrames::open(&path, 3).unwrap().next().unwrap().unwrap();
    assert_eq!(first.step, Some(3));
    assert_eq!(first.box_lengths, Some(vec![4.5, 4.5, 4.5]));
    assert_eq!(first.labels[0], "B");
    assert_eq!(first.labels[1], "A");
}

#[test]
fn test_hard_cores_leave_no_pairs_below_contact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("traj.xyz");

    let mut config = SimulationConfig::default();
    config.system.unit_repeat = 4;
    config.system.volume_fraction = 0.3;
    config.run.seed = Some(8);
    config.run.before_equilibrium = 10;
    config.run.total_steps = 5;

    let mut sim = Simulation::new(config).unwrap();
    let mut writer = TrajectoryWriter::create(&path).unwrap();
    sim.run(&mut writer).unwrap();
    writer.into_inner().unwrap();

    let contact = 1.0;
    let bins = Bins::Count(30);
    let mut n_frames = 0;
    for frame in XyzFrames::open(&path, 3).unwrap() {
        let frame = frame.unwrap();
        let sim_box = PeriodicBox::Lengths(frame.box_lengths.clone().unwrap());
        let (radii, g) = compute_rdf(&frame.positions, &sim_box, 3.0, &bins).unwrap();

        let dr = 3.0 / 30.0;
        for (r, value) in radii.iter().zip(&g) {
            if r + 0.5 * dr <= contact {
                assert_eq!(*value, 0.0, "pair found at r = {r}");
            }
        }
        assert!(g.iter().any(|&value| value > 0.0));
        n_frames += 1;
    }
    assert_eq!(n_frames, 5);
}
