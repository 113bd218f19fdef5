use masb_common::{search::SpatialIndex, PointCloud, ShrinkParams};
use nalgebra::{Point3, Vector3};

/// Result of shrinking a ball from one source point towards one side
/// (spec §4.3 "Output per side").
pub(crate) struct ShrinkOutcome {
    pub center: Point3<f32>,
    pub qidx: u32,
    pub queries: u64,
}

/// Runs the shrinking-ball fixed-point iteration for a single source
/// point `p` along a single side's normal `n` (either the point's own
/// normal for the outside ball, or its negation for the inside ball).
///
/// `self_idx` is `p`'s own index in `points`, used as the degenerate
/// sentinel for `qidx` per spec §3/§9. Mirrors masbcpp's `compute_lfs`
/// per-point loop directly: the `r < 0` branch resets `r` and falls
/// through into the same step rather than restarting the query, exactly
/// as the original does.
pub(crate) fn shrink_side<S: SpatialIndex>(
    p: Point3<f32>,
    n: Vector3<f32>,
    self_idx: usize,
    points: &PointCloud<Point3<f32>>,
    index: &S,
    params: &ShrinkParams,
    scratch: &mut Vec<(usize, f32)>,
) -> ShrinkOutcome {
    let mut j: u32 = 0;
    let mut r_prev: f32 = 0.0;
    let mut c = p;
    let mut prev_qidx = self_idx as u32;
    let mut queries: u64 = 0;

    loop {
        index.nearest(&c, 2, true, scratch);
        queries += 1;

        let (idx0, _) = scratch[0];
        let mut q = points[idx0];
        let mut qidx = idx0 as u32;

        if q == p {
            if r_prev == params.initial_radius {
                return ShrinkOutcome { center: p - n * params.initial_radius, qidx: self_idx as u32, queries };
            }
            if let Some(&(idx1, _)) = scratch.get(1) {
                q = points[idx1];
                qidx = idx1 as u32;
            }
        }

        let diff = p - q;
        let denom = n.dot(&diff);
        let mut r = if denom == 0.0 { params.initial_radius } else { diff.norm_squared() / (2.0 * denom) };

        if r < 0.0 {
            r = params.initial_radius;
        } else if r > params.initial_radius {
            return ShrinkOutcome { center: p - n * params.initial_radius, qidx: self_idx as u32, queries };
        }

        let c_next = p - n * r;

        if params.denoise_preserve != 0.0 || params.denoise_planar != 0.0 {
            let separation_angle = angle(p - c_next, q - c_next);
            if j > 0 && separation_angle < params.denoise_preserve && r > (q - p).norm() {
                return ShrinkOutcome { center: p - n * r_prev, qidx: prev_qidx, queries };
            }

            let tangential_angle = angle(q - p, -n);
            if j < 2 && tangential_angle > params.denoise_planar {
                return ShrinkOutcome { center: p - n * params.initial_radius, qidx: self_idx as u32, queries };
            }
        }

        if (r - r_prev).abs() < ShrinkParams::CONVERGENCE_DELTA {
            return ShrinkOutcome { center: c_next, qidx, queries };
        }
        if j > ShrinkParams::ITERATION_LIMIT {
            return ShrinkOutcome { center: c_next, qidx, queries };
        }

        prev_qidx = qidx;
        r_prev = r;
        c = c_next;
        j += 1;
    }
}

/// Angle between two vectors via `acos` of their clamped cosine (spec
/// §4.3 "Numeric notes"). Zero-length inputs are defined as maximally
/// separated (π) rather than propagating NaN.
fn angle(u: Vector3<f32>, v: Vector3<f32>) -> f32 {
    let (nu, nv) = (u.norm(), v.norm());
    if nu == 0.0 || nv == 0.0 {
        return std::f32::consts::PI;
    }
    (u.dot(&v) / (nu * nv)).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn angle_of_parallel_vectors_is_zero() {
        assert_relative_eq!(angle(Vector3::new(1.0, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0)), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn angle_of_opposite_vectors_is_pi() {
        assert_relative_eq!(
            angle(Vector3::new(1.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0)),
            std::f32::consts::PI,
            epsilon = 1e-6
        );
    }

    #[test]
    fn angle_with_zero_length_vector_is_pi() {
        assert_relative_eq!(angle(Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0)), std::f32::consts::PI, epsilon = 1e-6);
    }
}
