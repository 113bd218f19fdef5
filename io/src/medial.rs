use std::path::Path;

use masb_ball::MedialResult;
use masb_common::{PointCloud, ShrinkParams};
use nalgebra::Point3;

use crate::{error::Result, metadata::write_metadata, npy};

/// Writes a `MedialResult` to `ma_coords_{in,out}.npy`, `ma_qidx_{in,out}.npy`
/// and the `compute_ma` metadata sidecar, all inside `dir` (spec §6).
///
/// A center is degenerate exactly when its `qidx` is the source point's
/// own index — the sentinel `masb-ball`'s iteration already uses for
/// every `r == initial_radius` outcome (spec §3, §9). When
/// `params.nan_for_initr`, those centers are written as NaN triples
/// instead of `p - n * initial_radius`; this substitution is the only
/// place the degeneracy is translated into a user-visible value (spec §9).
pub fn write_medial_result(dir: &Path, result: &MedialResult, params: &ShrinkParams) -> Result<()> {
    write_side(&dir.join("ma_coords_in.npy"), &dir.join("ma_qidx_in.npy"), &result.inside, &result.qidx_inside, params)?;
    write_side(&dir.join("ma_coords_out.npy"), &dir.join("ma_qidx_out.npy"), &result.outside, &result.qidx_outside, params)?;
    write_metadata(&dir.join("compute_ma"), params)
}

fn write_side(
    coords_path: &Path,
    qidx_path: &Path,
    centers: &masb_common::PointCloud<Point3<f32>>,
    qidx: &[u32],
    params: &ShrinkParams,
) -> Result<()> {
    let mut degenerate = 0usize;
    let out: PointCloud<Point3<f32>> = centers
        .iter()
        .zip(qidx.iter())
        .enumerate()
        .map(|(i, (c, &q))| {
            let is_degenerate = q as usize == i;
            if is_degenerate {
                degenerate += 1;
            }
            if is_degenerate && params.nan_for_initr {
                Point3::new(f32::NAN, f32::NAN, f32::NAN)
            } else {
                *c
            }
        })
        .collect();

    if degenerate > 0 {
        log::warn!("{degenerate} of {} centers in {:?} never converged (r == initial_radius)", out.len(), coords_path);
    }

    npy::write_points(coords_path, &out)?;
    npy::write_qidx(qidx_path, qidx)
}

#[cfg(test)]
mod tests {
    use masb_common::PointCloud;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn degenerate_centers_become_nan_when_requested() {
        let dir = tempdir().unwrap();
        let inside: PointCloud<Point3<f32>> =
            [Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)].into_iter().collect();
        let outside = inside.clone();
        let result = MedialResult {
            inside,
            outside,
            qidx_inside: vec![5, 1],
            qidx_outside: vec![5, 1],
        };
        let params = ShrinkParams::new(10.0, 0.0, 0.0, true).unwrap();

        write_medial_result(dir.path(), &result, &params).unwrap();

        let coords = npy::read_points(&dir.path().join("ma_coords_in.npy")).unwrap();
        assert!(!coords[0].x.is_nan());
        assert!(coords[1].x.is_nan());
    }
}
