//! Radial distribution function with explicit periodic replicas.
//!
//! Every particle is compared against every particle of every replica of the
//! box whose offsets span `[-k, k]` cells per axis, with
//! `k = max(ceil(cutoff / L))`, so cutoffs longer than the box are handled.

use crate::error::{Error, Result};
use itertools::Itertools;
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Histogram bins: a count of equal-width bins on `[0, cutoff]`, or explicit
/// increasing edges
#[derive(Debug, Clone, PartialEq)]
pub enum Bins {
    Count(usize),
    Edges(Vec<f64>),
}

impl From<usize> for Bins {
    fn from(n: usize) -> Self {
        Bins::Count(n)
    }
}

impl From<Vec<f64>> for Bins {
    fn from(edges: Vec<f64>) -> Self {
        Bins::Edges(edges)
    }
}

impl From<&[f64]> for Bins {
    fn from(edges: &[f64]) -> Self {
        Bins::Edges(edges.to_vec())
    }
}

/// Periodic box: one edge for a hypercube, or one edge per dimension
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodicBox {
    Cubic(f64),
    Lengths(Vec<f64>),
}

impl From<f64> for PeriodicBox {
    fn from(edge: f64) -> Self {
        PeriodicBox::Cubic(edge)
    }
}

impl From<Vec<f64>> for PeriodicBox {
    fn from(lengths: Vec<f64>) -> Self {
        PeriodicBox::Lengths(lengths)
    }
}

impl From<&[f64]> for PeriodicBox {
    fn from(lengths: &[f64]) -> Self {
        PeriodicBox::Lengths(lengths.to_vec())
    }
}

impl PeriodicBox {
    /// Edge lengths for a `dim`-dimensional system
    pub fn lengths(&self, dim: usize) -> Result<Vec<f64>> {
        let lengths = match self {
            PeriodicBox::Cubic(edge) => vec![*edge; dim],
            PeriodicBox::Lengths(lengths) => lengths.clone(),
        };
        if lengths.len() != dim {
            return Err(Error::DimensionMismatch {
                box_dim: lengths.len(),
                dim,
            });
        }
        if let Some(bad) = lengths.iter().find(|&&l| !(l > 0.0) || !l.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "box lengths must be positive, got {bad}"
            )));
        }
        Ok(lengths)
    }
}

impl Bins {
    pub fn edges(&self, cutoff: f64) -> Result<Vec<f64>> {
        let edges: Vec<f64> = match self {
            Bins::Count(0) => {
                return Err(Error::InvalidParameter("at least one bin is required".into()))
            }
            Bins::Count(n) => (0..=*n).map(|i| cutoff * i as f64 / *n as f64).collect(),
            Bins::Edges(edges) => edges.clone(),
        };
        if edges.len() < 2 {
            return Err(Error::InvalidParameter(
                "bin edges need at least two values".into(),
            ));
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::InvalidParameter(
                "bin edges must be finite and strictly increasing".into(),
            ));
        }
        Ok(edges)
    }
}

/// Volume of a spherical shell of radius `r` and thickness `dr` in `dim` dimensions
pub fn shell_volume(dim: usize, r: f64, dr: f64) -> Result<f64> {
    match dim {
        1 => Ok(2.0 * dr),
        2 => Ok(2.0 * PI * r * dr),
        3 => Ok(4.0 * PI * r * r * dr),
        _ => Err(Error::UnsupportedDimension(dim)),
    }
}

/// Number of replica cells needed on each side so every pair within `cutoff` is seen
pub fn replica_levels(cutoff: f64, box_lengths: &[f64]) -> i64 {
    box_lengths
        .iter()
        .map(|&l| (cutoff / l).ceil() as i64)
        .max()
        .unwrap_or(0)
}

/// Every integer offset vector in `[-levels, levels]^dim`
pub fn replica_offsets(levels: i64, dim: usize) -> Vec<Vec<i64>> {
    (0..dim)
        .map(|_| -levels..=levels)
        .multi_cartesian_product()
        .collect()
}

/// Histogram bin of `d`; the last bin is closed on the right
fn bin_index(edges: &[f64], d: f64) -> Option<usize> {
    let last = edges[edges.len() - 1];
    if !(d >= edges[0] && d <= last) {
        return None;
    }
    if d == last {
        return Some(edges.len() - 2);
    }
    Some(edges.partition_point(|&e| e <= d) - 1)
}

/// Pair-distance histogram over all replicas.
///
/// Self pairs are dropped only in the zero-offset replica; a particle's own
/// periodic images count like any other neighbour.
pub fn replica_histogram(
    positions: &DMatrix<f64>,
    box_lengths: &[f64],
    edges: &[f64],
    levels: i64,
) -> Vec<u64> {
    let (n, dim) = positions.shape();
    let n_bins = edges.len() - 1;

    replica_offsets(levels, dim)
        .par_iter()
        .map(|offset| {
            let is_self = offset.iter().all(|&o| o == 0);
            let shift: Vec<f64> = offset
                .iter()
                .zip(box_lengths)
                .map(|(&o, &l)| o as f64 * l)
                .collect();

            let mut counts = vec![0u64; n_bins];
            for i in 0..n {
                for j in 0..n {
                    if is_self && i == j {
                        continue;
                    }
                    let r2: f64 = (0..dim)
                        .map(|k| {
                            let d = positions[(j, k)] + shift[k] - positions[(i, k)];
                            d * d
                        })
                        .sum();
                    if let Some(b) = bin_index(edges, r2.sqrt()) {
                        counts[b] += 1;
                    }
                }
            }
            counts
        })
        .reduce(
            || vec![0u64; n_bins],
            |mut acc, counts| {
                for (a, c) in acc.iter_mut().zip(counts) {
                    *a += c;
                }
                acc
            },
        )
}

/// g(r) of an `n × dim` configuration in a periodic box.
///
/// Returns the bin centres and g at each centre. Each bin is normalized by the
/// ideal-gas count `n × shell_volume(r, dr) × n / V` with its own width `dr`.
pub fn compute_rdf(
    positions: &DMatrix<f64>,
    sim_box: &PeriodicBox,
    cutoff: f64,
    bins: &Bins,
) -> Result<(Vec<f64>, Vec<f64>)> {
    let (n, dim) = positions.shape();
    let box_lengths = sim_box.lengths(dim)?;
    if dim == 0 || dim > 3 {
        return Err(Error::UnsupportedDimension(dim));
    }
    if n == 0 {
        return Err(Error::InvalidParameter("no particles given".into()));
    }
    if !(cutoff > 0.0) || !cutoff.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "cutoff must be positive, got {cutoff}"
        )));
    }
    let edges = bins.edges(cutoff)?;

    let volume: f64 = box_lengths.iter().product();
    let density = n as f64 / volume;
    let levels = replica_levels(cutoff, &box_lengths);
    let hist = replica_histogram(positions, &box_lengths, &edges, levels);

    let mut radii = Vec::with_capacity(hist.len());
    let mut rdf = Vec::with_capacity(hist.len());
    for (b, &count) in hist.iter().enumerate() {
        let r = 0.5 * (edges[b] + edges[b + 1]);
        let dr = edges[b + 1] - edges[b];
        let v_shell = shell_volume(dim, r, dr)?;
        radii.push(r);
        rdf.push(count as f64 / (n as f64 * v_shell * density));
    }
    Ok((radii, rdf))
}

/// Convenience entry point accepting a scalar or per-axis box and a bin count
/// or explicit edges
pub fn get_rdf(
    positions: &DMatrix<f64>,
    sim_box: impl Into<PeriodicBox>,
    cutoff: f64,
    bins: impl Into<Bins>,
) -> Result<(Vec<f64>, Vec<f64>)> {
    compute_rdf(positions, &sim_box.into(), cutoff, &bins.into())
}
