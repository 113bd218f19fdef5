use masb_common::{search::SpatialIndex, NormalField, PointCloud};
use nalgebra::{Matrix3, Point3, Vector3};
use rayon::prelude::*;

/// PCA normal estimation (spec §4.2).
///
/// For each point, queries its `k + 1` nearest neighbors (the point
/// itself is always rank 0), builds their covariance matrix, and keeps
/// the eigenvector of the smallest eigenvalue as the estimated normal.
/// Orientation is left unresolved — see §4.2's edge cases.
///
/// Runs as a data-parallel loop over points (spec §5), each rayon worker
/// reusing a single scratch neighbor buffer across all of its queries
/// via `map_init` (spec §9).
pub fn estimate_normals<S>(points: &PointCloud<Point3<f32>>, index: &S, k: usize) -> NormalField
where
    S: SpatialIndex + Sync,
{
    let query_k = k + 1;

    let normals: Vec<Vector3<f32>> = points
        .par_iter()
        .map_init(Vec::new, |scratch, p| {
            index.nearest(p, query_k, false, scratch);
            principal_normal(points, scratch)
        })
        .collect();

    PointCloud::from_vec(normals)
}

fn principal_normal(points: &PointCloud<Point3<f32>>, neighbors: &[(usize, f32)]) -> Vector3<f32> {
    if neighbors.is_empty() {
        return Vector3::z();
    }

    let n = neighbors.len() as f32;
    let centroid = {
        let sum = neighbors.iter().fold(Vector3::zeros(), |acc, &(i, _)| acc + points[i].coords);
        Point3::from(sum / n)
    };

    let mut cov = Matrix3::zeros();
    for &(i, _) in neighbors {
        let d = points[i] - centroid;
        cov += d * d.transpose();
    }
    cov /= n;

    smallest_eigenvector(cov)
}

/// Picks the eigenvector of the smallest eigenvalue; ties are broken by
/// lowest eigenvalue-slot index, which is deterministic for a given
/// input (spec §4.2's "collinear/degenerate neighborhoods" edge case).
fn smallest_eigenvector(cov: Matrix3<f32>) -> Vector3<f32> {
    let eigen = cov.symmetric_eigen();

    let mut best = 0;
    for i in 1..3 {
        if eigen.eigenvalues[i] < eigen.eigenvalues[best] {
            best = i;
        }
    }

    let v = eigen.eigenvectors.column(best).into_owned();
    let norm = v.norm();
    if norm > f32::EPSILON {
        v / norm
    } else {
        Vector3::z()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use masb_kdtree::KdTree;

    use super::*;

    #[test]
    fn plane_normal_points_along_z() {
        let mut cloud = PointCloud::new();
        for x in -3..=3 {
            for y in -3..=3 {
                cloud.push(Point3::new(x as f32, y as f32, 0.0));
            }
        }
        let index = KdTree::build(&cloud, true);
        let normals = estimate_normals(&cloud, &index, 8);

        for n in normals.iter() {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-4);
            assert_relative_eq!(n.z.abs(), 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let cloud: PointCloud<Point3<f32>> = PointCloud::new();
        let index = KdTree::build(&cloud, false);
        let normals = estimate_normals(&cloud, &index, 10);
        assert!(normals.is_empty());
    }

    #[test]
    fn single_point_is_degenerate_but_unit_length() {
        let cloud: PointCloud<Point3<f32>> = std::iter::once(Point3::new(1.0, 2.0, 3.0)).collect();
        let index = KdTree::build(&cloud, false);
        let normals = estimate_normals(&cloud, &index, 10);
        assert_relative_eq!(normals[0].norm(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn collinear_points_yield_some_orthogonal_unit_vector() {
        let cloud: PointCloud<Point3<f32>> = (0..10).map(|i| Point3::new(i as f32, 0.0, 0.0)).collect();
        let index = KdTree::build(&cloud, false);
        let normals = estimate_normals(&cloud, &index, 5);
        for (p, n) in cloud.iter().zip(normals.iter()) {
            let _ = p;
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-4);
            assert_relative_eq!(n.x, 0.0, epsilon = 1e-4);
        }
    }
}
