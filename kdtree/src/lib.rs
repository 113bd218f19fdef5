mod node;
mod result;

use masb_common::{search::SpatialIndex, PointCloud};
use nalgebra::Point3;
use node::Node;
pub use result::KnnResultSet;

/// A static k-d tree over a [`PointCloud`], built once and shared
/// read-only across workers (spec §3 `SpatialIndex`, §5).
///
/// Index identity is preserved regardless of `rearrange`: `nearest`
/// always returns indices into the `PointCloud` it was built from, not
/// into whatever internal order the tree chose.
pub struct KdTree<'a> {
    coords: Coords<'a>,
    order: Vec<u32>,
    root: Node,
}

enum Coords<'a> {
    /// `rearrange = false`: indices into the caller's array, looked up
    /// through one level of indirection per comparison.
    Borrowed(&'a [Point3<f32>]),
    /// `rearrange = true`: points physically copied into traversal
    /// order, trading a one-time copy for cache-local queries.
    Owned(Vec<Point3<f32>>),
}

impl<'a> KdTree<'a> {
    /// Builds the tree in `O(n log n)`. See spec §4.1.
    pub fn build(points: &'a PointCloud<Point3<f32>>, rearrange: bool) -> Self {
        let mut order: Vec<u32> = (0..points.len() as u32).collect();

        let root = if points.is_empty() {
            Node::Leaf { start: 0, len: 0 }
        } else {
            node::build(&mut order, &points[..], 0)
        };

        let coords = if rearrange {
            Coords::Owned(order.iter().map(|&i| points[i as usize]).collect())
        } else {
            Coords::Borrowed(&points[..])
        };

        KdTree { coords, order, root }
    }

    fn coord_at(&self, slot: usize) -> Point3<f32> {
        match &self.coords {
            Coords::Borrowed(pts) => pts[self.order[slot] as usize],
            Coords::Owned(pts) => pts[slot],
        }
    }
}

impl<'a> SpatialIndex for KdTree<'a> {
    fn len(&self) -> usize {
        self.order.len()
    }

    fn nearest(&self, query: &Point3<f32>, k: usize, sorted: bool, out: &mut Vec<(usize, f32)>) {
        out.clear();
        if self.order.is_empty() || k == 0 {
            return;
        }

        let mut result = KnnResultSet::new(k.min(self.order.len()));
        node::search(&self.root, &self.order, &|slot| self.coord_at(slot), query, &mut result);

        if sorted {
            out.extend(result.into_sorted_vec());
        } else {
            out.extend(result.into_unsorted_vec());
        }
    }
}

#[cfg(test)]
mod tests {
    use masb_common::PointCloud;
    use nalgebra::Point3;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn brute_force(points: &[Point3<f32>], query: &Point3<f32>, k: usize) -> Vec<(usize, f32)> {
        let mut v: Vec<_> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, (p - query).norm_squared()))
            .collect();
        v.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        v.truncate(k);
        v
    }

    #[test]
    fn self_query_returns_zero_distance() {
        let cloud: PointCloud<Point3<f32>> = (0..200)
            .map(|i| Point3::new(i as f32, (i * 7 % 13) as f32, (i * 3 % 11) as f32))
            .collect();
        let tree = KdTree::build(&cloud, false);
        let mut out = Vec::new();
        for (i, p) in cloud.iter().enumerate() {
            tree.nearest(p, 1, true, &mut out);
            assert_eq!(out[0], (i, 0.0));
        }
    }

    #[test]
    fn matches_brute_force_knn() {
        let mut rng = StdRng::seed_from_u64(42);
        let cloud: PointCloud<Point3<f32>> = (0..300)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                )
            })
            .collect();
        let tree = KdTree::build(&cloud, true);

        let mut out = Vec::new();
        for q in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, -3.0, 2.0),
            Point3::new(-9.0, 9.0, -9.0),
        ] {
            tree.nearest(&q, 8, true, &mut out);
            let expected = brute_force(&cloud, &q, 8);
            let got_dists: Vec<f32> = out.iter().map(|&(_, d)| d).collect();
            let expected_dists: Vec<f32> = expected.iter().map(|&(_, d)| d).collect();
            for (a, b) in got_dists.iter().zip(expected_dists.iter()) {
                assert!((a - b).abs() < 1e-4, "{got_dists:?} vs {expected_dists:?}");
            }
        }
    }

    #[test]
    fn rearrange_does_not_change_results() {
        let cloud: PointCloud<Point3<f32>> = (0..50).map(|i| Point3::new(i as f32, 0.0, 0.0)).collect();
        let a = KdTree::build(&cloud, false);
        let b = KdTree::build(&cloud, true);

        let q = Point3::new(17.3, 0.0, 0.0);
        let (mut out_a, mut out_b) = (Vec::new(), Vec::new());
        a.nearest(&q, 5, true, &mut out_a);
        b.nearest(&q, 5, true, &mut out_b);
        assert_eq!(out_a, out_b);
    }

    #[test]
    fn empty_cloud_returns_nothing() {
        let cloud: PointCloud<Point3<f32>> = PointCloud::new();
        let tree = KdTree::build(&cloud, false);
        let mut out = Vec::new();
        tree.nearest(&Point3::origin(), 5, true, &mut out);
        assert!(out.is_empty());
    }
}
