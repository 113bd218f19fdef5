use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use masb_ball::shrink_ball_sides;
use masb_common::{NormalParams, ShrinkParams};
use masb_kdtree::KdTree;
use masb_normal::estimate_normals;

/// Approximates the medial axis transform of an oriented point cloud with
/// a shrinking-ball algorithm, estimating normals via PCA when the input
/// directory has no `normals.npy`.
///
/// This binary is a thin wrapper: argument parsing, directory handling
/// and timing/logging live here; all the geometry lives in `masb-ball`,
/// `masb-normal` and `masb-kdtree`.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Directory containing `coords.npy` (and optionally `normals.npy`).
    input: PathBuf,

    /// Directory to write results to. Defaults to `input`.
    output: Option<PathBuf>,

    /// Number of nearest neighbours to use for PCA normal estimation.
    #[arg(short = 'k', long = "kneighbours", default_value_t = 10)]
    k: usize,

    /// Don't reorder kd-tree points: slower computation but lower memory use.
    #[arg(short = 'N', long = "no-kdtree-reorder")]
    no_kdtree_reorder: bool,

    /// Upper bound on ball radius; also the "infinite ball" sentinel.
    #[arg(long, default_value_t = 100.0)]
    initial_radius: f32,

    /// Separation-angle cutoff protecting sharp features, in degrees.
    #[arg(long, default_value_t = 20.0)]
    denoise_preserve: f32,

    /// Tangent-configuration cutoff early in the iteration, in degrees.
    #[arg(long, default_value_t = 74.0)]
    denoise_planar: f32,

    /// Emit NaN coordinates for centers whose ball never converged.
    #[arg(long)]
    nan_for_initr: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let output = args.output.clone().unwrap_or_else(|| args.input.clone());
    std::fs::create_dir_all(&output).with_context(|| format!("creating output directory {output:?}"))?;

    let coords_path = args.input.join("coords.npy");
    let points = masb_io::read_points(&coords_path).with_context(|| format!("reading {coords_path:?}"))?;
    info!("loaded {} points from {:?}", points.len(), args.input);

    let normal_params = NormalParams::new(args.k, !args.no_kdtree_reorder)?;
    let index = KdTree::build(&points, normal_params.kd_tree_reorder);

    let normals_path = args.input.join("normals.npy");
    let normals = if normals_path.exists() {
        masb_io::read_normals(&normals_path).with_context(|| format!("reading {normals_path:?}"))?
    } else {
        warn!("no normals.npy in {:?}; estimating via PCA (unoriented)", args.input);
        let normals = estimate_normals(&points, &index, normal_params.k);
        let out_path = output.join("normals.npy");
        masb_io::write_normals(&out_path, &normals).with_context(|| format!("writing {out_path:?}"))?;
        normals
    };

    let params = ShrinkParams::new(
        args.initial_radius,
        args.denoise_preserve.to_radians(),
        args.denoise_planar.to_radians(),
        args.nan_for_initr,
    )?;

    let start = Instant::now();
    let (result, stats) = shrink_ball_sides(&points, &normals, &index, &params)?;
    info!("shrinking ball: {} nearest-neighbor queries in {:?} (wall {:?})", stats.queries, stats.elapsed, start.elapsed());

    masb_io::write_medial_result(&output, &result, &params)
        .with_context(|| format!("writing medial axis outputs to {output:?}"))?;

    Ok(())
}
