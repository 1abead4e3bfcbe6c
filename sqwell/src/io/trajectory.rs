//! Append-only text trajectory in the xyz-like layout read by the `rdf` tool:
//!
//! ```text
//! <particle_count>
//! box is [<x>, <y>, <z>], at frame <t>
//! <label>\t<x>\t<y>\t<z>
//! ```

use crate::error::{Error, Result};
use crate::geometry::SimulationBox;
use crate::particle::Species;
use nalgebra::Vector3;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Snapshot of the configuration at one step, borrowed from the running system
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub step: usize,
    pub sim_box: &'a SimulationBox,
    pub species: &'a [Species],
    pub positions: &'a [Vector3<f64>],
}

pub struct TrajectoryWriter<W: Write> {
    writer: W,
    buffer: String,
    frames_written: usize,
}

impl TrajectoryWriter<BufWriter<File>> {
    /// Create (or truncate) the trajectory file at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(TrajectoryWriter::new(BufWriter::new(file)))
    }
}

impl<W: Write> TrajectoryWriter<W> {
    pub fn new(writer: W) -> Self {
        TrajectoryWriter {
            writer,
            buffer: String::new(),
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Format the whole frame in memory, then hand it to the writer in one
    /// `write_all` and flush.
    pub fn write_frame(&mut self, frame: &Frame<'_>) -> Result<()> {
        if frame.species.len() != frame.positions.len() {
            return Err(Error::LengthMismatch {
                what: "species labels",
                found: frame.species.len(),
                expected: frame.positions.len(),
            });
        }

        self.buffer.clear();
        let l = &frame.sim_box.lengths;
        // fmt::Write into a String cannot fail
        let _ = writeln!(self.buffer, "{}", frame.positions.len());
        let _ = writeln!(
            self.buffer,
            "box is [{}, {}, {}], at frame {}",
            l.x, l.y, l.z, frame.step
        );
        for (species, pos) in frame.species.iter().zip(frame.positions) {
            let _ = writeln!(
                self.buffer,
                "{}\t{}\t{}\t{}",
                species, pos.x, pos.y, pos.z
            );
        }

        self.writer.write_all(self.buffer.as_bytes())?;
        self.writer.flush()?;
        self.frames_written += 1;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
