//! Reader for xyz-like trajectories.
//!
//! Each frame is a particle-count line, one metadata line, and one record per
//! particle: a label followed by whitespace-separated coordinates. The metadata
//! line written by the Monte Carlo driver (`box is [x, y, z], at frame t`) is
//! interpreted when present; any other text is accepted and leaves box and step
//! unknown.

use crate::error::{Error, Result};
use nalgebra::DMatrix;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const MAX_RESERVED_RECORDS: usize = 1 << 16;

/// One frame read back from a trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct XyzFrame {
    pub step: Option<usize>,
    pub box_lengths: Option<Vec<f64>>,
    pub labels: Vec<String>,
    /// n × ncols coordinates, one row per particle
    pub positions: DMatrix<f64>,
}

impl XyzFrame {
    pub fn n_particles(&self) -> usize {
        self.positions.nrows()
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.positions
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

/// Lazy frame iterator over any buffered reader.
///
/// A frame with a malformed record is reported as an error after its remaining
/// declared lines have been consumed, so the caller may skip it and continue. A
/// malformed header or a truncated file ends the iteration.
pub struct XyzFrames<R: BufRead> {
    reader: R,
    ncols: usize,
    line_no: usize,
    line: String,
    done: bool,
}

impl XyzFrames<BufReader<File>> {
    /// Open a trajectory file; call again to restart from the first frame
    pub fn open<P: AsRef<Path>>(path: P, ncols: usize) -> Result<Self> {
        let file = File::open(path)?;
        Ok(XyzFrames::new(BufReader::new(file), ncols))
    }
}

impl<R: BufRead> XyzFrames<R> {
    pub fn new(reader: R, ncols: usize) -> Self {
        XyzFrames {
            reader,
            ncols,
            line_no: 0,
            line: String::new(),
            done: false,
        }
    }

    /// Next line without its terminator, or `None` at end of input
    fn next_line(&mut self) -> Result<Option<&str>> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(self.line.trim_end_matches(['\n', '\r'])))
    }

    /// Outer error: the stream cannot continue. Inner error: this frame is bad
    /// but the reader already sits at the next header.
    fn read_frame(&mut self) -> Result<Option<Result<XyzFrame>>> {
        let n_particles = loop {
            let line_no = self.line_no + 1;
            match self.next_line()? {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => {
                    let header = line.trim();
                    break header.parse::<usize>().map_err(|_| {
                        Error::parse(line_no, format!("expected a particle count, found '{header}'"))
                    })?;
                }
            }
        };

        let last = self.line_no;
        let (box_lengths, step) = match self.next_line()? {
            Some(meta) => parse_metadata(meta),
            None => return Err(Error::parse(last, "frame ends before its metadata line")),
        };

        let ncols = self.ncols;
        // the header is untrusted until its records have been read
        let reserve = n_particles.min(MAX_RESERVED_RECORDS);
        let mut labels = Vec::with_capacity(reserve);
        let mut coords = Vec::with_capacity(reserve.saturating_mul(ncols));
        let mut first_error = None;

        for read in 0..n_particles {
            let last = self.line_no;
            let line = match self.next_line()? {
                Some(line) => line,
                None => {
                    return Err(Error::parse(
                        last,
                        format!("frame declares {n_particles} particles but only {read} records follow"),
                    ))
                }
            };
            if first_error.is_some() {
                continue;
            }
            match parse_record(line, ncols) {
                Ok((label, values)) => {
                    labels.push(label);
                    coords.extend(values);
                }
                Err(details) => first_error = Some(Error::parse(last + 1, details)),
            }
        }

        if let Some(err) = first_error {
            return Ok(Some(Err(err)));
        }

        Ok(Some(Ok(XyzFrame {
            step,
            box_lengths,
            labels,
            positions: DMatrix::from_row_slice(n_particles, ncols, &coords),
        })))
    }
}

impl<R: BufRead> Iterator for XyzFrames<R> {
    type Item = Result<XyzFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_frame() {
            Ok(Some(frame)) => Some(frame),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

fn parse_record(line: &str, ncols: usize) -> std::result::Result<(String, Vec<f64>), String> {
    let mut fields = line.split_whitespace();
    let label = fields
        .next()
        .ok_or_else(|| "record is empty".to_string())?
        .to_string();

    let values = fields
        .take(ncols)
        .map(|f| {
            f.parse::<f64>()
                .map_err(|_| format!("record has a non-numeric coordinate '{f}'"))
        })
        .collect::<std::result::Result<Vec<f64>, String>>()?;

    if values.len() < ncols {
        return Err(format!(
            "record has {} coordinates, expected {}",
            values.len(),
            ncols
        ));
    }
    Ok((label, values))
}

/// Box and step from a `box is [x, y, z], at frame t` line
pub fn parse_metadata(line: &str) -> (Option<Vec<f64>>, Option<usize>) {
    let box_lengths = match (line.find('['), line.find(']')) {
        (Some(open), Some(close)) if open < close => line[open + 1..close]
            .split(',')
            .map(|s| s.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .ok(),
        _ => None,
    };
    let step = line
        .rsplit_once("at frame")
        .and_then(|(_, t)| t.trim().parse::<usize>().ok());
    (box_lengths, step)
}

/// Load every frame of `path` as `[frame][particle][coordinate]`, aborting on
/// the first malformed frame.
pub fn get_frames_from_xyz<P: AsRef<Path>>(path: P, ncols: usize) -> Result<Vec<Vec<Vec<f64>>>> {
    XyzFrames::open(path, ncols)?
        .map(|frame| frame.map(|f| f.rows()))
        .collect()
}
