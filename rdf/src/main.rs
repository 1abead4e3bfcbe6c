use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use nalgebra::DMatrix;
use rdf::{compute_rdf, Bins, PeriodicBox, XyzFrames};
use sqwell::io::setup_output;
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::{info, warn};

/// Radial distribution function averaged over the frames of one or more
/// trajectories
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Trajectory files in the format written by `sqwell`
    #[arg(required = true)]
    trajectories: Vec<String>,

    /// Largest distance histogrammed
    #[arg(long)]
    cutoff: f64,

    /// Number of equal-width bins on [0, cutoff]
    #[arg(long, default_value_t = 50)]
    bins: usize,

    /// Cubic box edge, used instead of the box recorded in each frame
    #[arg(long)]
    box_edge: Option<f64>,

    /// Number of coordinate columns read per record
    #[arg(long, default_value_t = 3)]
    ncols: usize,

    /// Skip frames with malformed records instead of stopping
    #[arg(long)]
    skip_malformed: bool,

    /// Output table; printed to stdout when omitted
    #[arg(short, long)]
    output: Option<String>,

    /// Log file; logs go to stdout when omitted
    #[arg(long)]
    log: Option<String>,
}

fn frame_box(recorded: Option<Vec<f64>>, edge: Option<f64>) -> Option<PeriodicBox> {
    match edge {
        Some(edge) => Some(PeriodicBox::Cubic(edge)),
        None => recorded.map(PeriodicBox::Lengths),
    }
}

fn accumulate(
    path: &str,
    args: &Args,
    bins: &Bins,
    radii: &mut Vec<f64>,
    sum: &mut Vec<f64>,
) -> Result<usize> {
    let mut frames_used = 0;
    let frames = XyzFrames::open(path, args.ncols)
        .wrap_err_with(|| format!("Failed to open trajectory {path}"))?;

    for frame in frames {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err @ rdf::Error::Parse { .. }) if args.skip_malformed => {
                warn!("Skipping frame in {}: {}", path, err);
                continue;
            }
            Err(err) => return Err(err).wrap_err_with(|| format!("Failed to read {path}")),
        };

        let Some(sim_box) = frame_box(frame.box_lengths.clone(), args.box_edge) else {
            return Err(eyre!(
                "frame {:?} of {} records no box; pass --box-edge",
                frame.step,
                path
            ));
        };

        let positions: &DMatrix<f64> = &frame.positions;
        let (r, g) = compute_rdf(positions, &sim_box, args.cutoff, bins)
            .wrap_err_with(|| format!("RDF failed for frame {:?} of {}", frame.step, path))?;

        if sum.is_empty() {
            *radii = r;
            *sum = g;
        } else {
            for (acc, value) in sum.iter_mut().zip(g) {
                *acc += value;
            }
        }
        frames_used += 1;
    }
    Ok(frames_used)
}

fn write_table<W: Write>(out: &mut W, radii: &[f64], rdf: &[f64]) -> std::io::Result<()> {
    writeln!(out, "# r\tg(r)")?;
    for (r, g) in radii.iter().zip(rdf) {
        writeln!(out, "{:.6}\t{:.6}", r, g)?;
    }
    out.flush()
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    setup_output(args.log.as_ref());

    let bins = Bins::Count(args.bins);
    let mut radii = Vec::new();
    let mut sum = Vec::new();
    let mut frames_used = 0;

    for path in &args.trajectories {
        let used = accumulate(path, &args, &bins, &mut radii, &mut sum)?;
        info!("Read {} frames from {}", used, path);
        frames_used += used;
    }

    if frames_used == 0 {
        return Err(eyre!("no usable frames in the given trajectories"));
    }
    let rdf: Vec<f64> = sum.iter().map(|g| g / frames_used as f64).collect();
    info!("Averaged g(r) over {} frames", frames_used);

    match &args.output {
        Some(path) => {
            let file = File::create(path).wrap_err_with(|| format!("Failed to create {path}"))?;
            write_table(&mut BufWriter::new(file), &radii, &rdf)?;
            info!("g(r) written to {}", path);
        }
        None => write_table(&mut std::io::stdout().lock(), &radii, &rdf)?,
    }
    Ok(())
}
