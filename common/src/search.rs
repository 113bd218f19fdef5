use nalgebra::Point3;

/// The query side of the spatial index contract (spec §4.1).
///
/// Implemented by `masb-kdtree`'s `KdTree`. Kept as a trait (rather than
/// a concrete type import) so `masb-normal` and `masb-ball` depend only
/// on the query shape, not on the tree's construction details — mirrors
/// the teacher's `Searcher`/`Search` split between `pcc-common` and its
/// backend crates.
pub trait SpatialIndex {
    /// Number of points reachable through the index.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends up to `min(k, len())` nearest neighbors of `query` to
    /// `out`, as `(index, squared_distance)` pairs, reusing its capacity.
    /// `out` is cleared first. When `sorted`, results are in
    /// nondecreasing `squared_distance` order; ties are broken by lower
    /// index first regardless of `sorted`.
    fn nearest(&self, query: &Point3<f32>, k: usize, sorted: bool, out: &mut Vec<(usize, f32)>);
}
