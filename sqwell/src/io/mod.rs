//! Trajectory output and logging setup

mod output;
mod trajectory;

pub use output::setup_output;
pub use trajectory::{Frame, TrajectoryWriter};
