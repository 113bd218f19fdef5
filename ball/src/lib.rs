mod iteration;

use std::time::{Duration, Instant};

use masb_common::{search::SpatialIndex, Error, NormalField, PointCloud, Result, ShrinkParams};
use nalgebra::Point3;
use rayon::prelude::*;

/// Output of the shrinking-ball stage (spec §3 `MedialResult`).
///
/// `qidx_inside[i]`/`qidx_outside[i]` is the feature point `q` the
/// converged ball on that side is tangent to, or `i` itself when the
/// side never converged (the degenerate/infinite-ball sentinel).
pub struct MedialResult {
    pub inside: PointCloud<Point3<f32>>,
    pub outside: PointCloud<Point3<f32>>,
    pub qidx_inside: Vec<u32>,
    pub qidx_outside: Vec<u32>,
}

/// Per-call observability, folded from per-worker accumulators after the
/// parallel region (spec §9: never a shared mutable global counter).
#[derive(Debug, Clone, Copy, Default)]
pub struct BallStats {
    pub queries: u64,
    pub elapsed: Duration,
}

/// Runs the shrinking-ball iteration (spec §4.3) for every point, on
/// both sides of the surface, in parallel (spec §5).
///
/// Each rayon worker reuses a single scratch neighbor buffer across all
/// of its `nearest` calls via `map_init` (spec §9).
pub fn shrink_ball_sides<S>(
    points: &PointCloud<Point3<f32>>,
    normals: &NormalField,
    index: &S,
    params: &ShrinkParams,
) -> Result<(MedialResult, BallStats)>
where
    S: SpatialIndex + Sync,
{
    if points.len() != normals.len() {
        return Err(Error::LengthMismatch { points: points.len(), normals: normals.len() });
    }

    let start = Instant::now();

    let per_point: Vec<(Point3<f32>, u32, Point3<f32>, u32, u64)> = points
        .par_iter()
        .zip(normals.par_iter())
        .enumerate()
        .map_init(Vec::new, |scratch, (i, (p, n))| {
            let outside = iteration::shrink_side(*p, *n, i, points, index, params, scratch);
            let inside = iteration::shrink_side(*p, -n, i, points, index, params, scratch);
            (inside.center, inside.qidx, outside.center, outside.qidx, inside.queries + outside.queries)
        })
        .collect();

    let mut inside = PointCloud::new();
    let mut outside = PointCloud::new();
    let mut qidx_inside = Vec::with_capacity(per_point.len());
    let mut qidx_outside = Vec::with_capacity(per_point.len());
    let mut queries = 0u64;

    for (c_in, q_in, c_out, q_out, n_queries) in per_point {
        inside.push(c_in);
        qidx_inside.push(q_in);
        outside.push(c_out);
        qidx_outside.push(q_out);
        queries += n_queries;
    }

    let stats = BallStats { queries, elapsed: start.elapsed() };
    Ok((MedialResult { inside, outside, qidx_inside, qidx_outside }, stats))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use masb_common::PointCloud;
    use masb_kdtree::KdTree;
    use nalgebra::Vector3;

    use super::*;

    #[test]
    fn two_points_on_x_axis_are_degenerate_on_both_sides() {
        let points: PointCloud<Point3<f32>> =
            [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)].into_iter().collect();
        let normals: NormalField = [Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 1.0, 0.0)].into_iter().collect();
        let index = KdTree::build(&points, false);
        let params = ShrinkParams::new(10.0, 0.0, 0.0, false).unwrap();

        let (result, _) = shrink_ball_sides(&points, &normals, &index, &params).unwrap();

        assert_eq!(result.qidx_outside[0], 0);
        assert_relative_eq!((result.outside[0] - points[0]).norm(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn unit_sphere_inside_centers_converge_near_origin() {
        let n_points = 500;
        let mut points = PointCloud::new();
        let mut normals: NormalField = PointCloud::new();
        let golden_angle = std::f32::consts::PI * (3.0 - 5f32.sqrt());
        for i in 0..n_points {
            let t = i as f32 / (n_points - 1) as f32;
            let z = 1.0 - 2.0 * t;
            let radius = (1.0 - z * z).max(0.0).sqrt();
            let theta = golden_angle * i as f32;
            let p = Point3::new(radius * theta.cos(), radius * theta.sin(), z);
            normals.push(p.coords);
            points.push(p);
        }

        let index = KdTree::build(&points, true);
        let params = ShrinkParams::new(10.0, 20f32.to_radians(), 74f32.to_radians(), false).unwrap();
        let (result, _) = shrink_ball_sides(&points, &normals, &index, &params).unwrap();

        for c in result.inside.iter() {
            assert!(c.coords.norm() < 0.2, "inside center too far from origin: {c:?}");
        }
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let points: PointCloud<Point3<f32>> = PointCloud::new();
        let normals: NormalField = PointCloud::new();
        let index = KdTree::build(&points, false);
        let params = ShrinkParams::default();
        let (result, stats) = shrink_ball_sides(&points, &normals, &index, &params).unwrap();
        assert!(result.inside.is_empty());
        assert!(result.outside.is_empty());
        assert_eq!(stats.queries, 0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let points: PointCloud<Point3<f32>> = std::iter::once(Point3::origin()).collect();
        let normals: NormalField = PointCloud::new();
        let index = KdTree::build(&points, false);
        let params = ShrinkParams::default();
        let err = shrink_ball_sides(&points, &normals, &index, &params).unwrap_err();
        assert_eq!(err, Error::LengthMismatch { points: 1, normals: 0 });
    }
}
