//! Radial distribution function of periodic particle configurations, and a
//! reader for the xyz-like trajectories produced by `sqwell`.

pub mod error;
pub mod rdf;
pub mod xyz;

pub use error::{Error, Result};
pub use rdf::{compute_rdf, get_rdf, shell_volume, Bins, PeriodicBox};
pub use xyz::{get_frames_from_xyz, XyzFrame, XyzFrames};
