use nalgebra::Point3;

use crate::result::KnnResultSet;

/// Points per leaf bucket (spec §4.1: "a small bucket, e.g. 12").
const BUCKET_SIZE: usize = 12;

pub(crate) enum Node {
    Leaf { start: u32, len: u32 },
    Branch { dim: u8, split: f32, left: Box<Node>, right: Box<Node> },
}

fn variance(order: &[u32], points: &[Point3<f32>], dim: usize) -> f32 {
    let n = order.len() as f32;
    let mean: f32 =
        order.iter().map(|&i| points[i as usize].coords[dim]).sum::<f32>() / n;
    order
        .iter()
        .map(|&i| {
            let d = points[i as usize].coords[dim] - mean;
            d * d
        })
        .sum::<f32>()
        / n
}

/// Builds a median-of-variance k-d tree over `order`, partitioning it in
/// place. `base` is the offset of `order` within the tree's final,
/// fully-partitioned index array, so leaves can record absolute ranges.
pub(crate) fn build(order: &mut [u32], points: &[Point3<f32>], base: usize) -> Node {
    if order.len() <= BUCKET_SIZE {
        return Node::Leaf { start: base as u32, len: order.len() as u32 };
    }

    let mut dim = 0usize;
    let mut best_var = -1.0f32;
    for d in 0..3 {
        let v = variance(order, points, d);
        if v > best_var {
            best_var = v;
            dim = d;
        }
    }

    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        points[a as usize].coords[dim]
            .partial_cmp(&points[b as usize].coords[dim])
            .unwrap()
    });
    let split = points[order[mid] as usize].coords[dim];

    let (left_order, right_order) = order.split_at_mut(mid);
    let left = Box::new(build(left_order, points, base));
    let right = Box::new(build(right_order, points, base + mid));

    Node::Branch { dim: dim as u8, split, left, right }
}

/// Bounded best-bin-first k-NN search, pruning subtrees whose splitting
/// hyperplane is already farther than the current worst candidate.
pub(crate) fn search<F: Fn(usize) -> Point3<f32>>(
    node: &Node,
    order: &[u32],
    coord_at: &F,
    query: &Point3<f32>,
    result: &mut KnnResultSet,
) {
    match node {
        Node::Leaf { start, len } => {
            for slot in (*start as usize)..(*start as usize + *len as usize) {
                let p = coord_at(slot);
                let d2 = (p - query).norm_squared();
                result.push(d2, order[slot] as usize);
            }
        }
        Node::Branch { dim, split, left, right } => {
            let diff = query.coords[*dim as usize] - *split;
            let (near, far) = if diff < 0.0 { (left, right) } else { (right, left) };

            search(near, order, coord_at, query, result);

            let plane_dist_sq = diff * diff;
            if !result.is_full() || plane_dist_sq < result.max_key().unwrap() {
                search(far, order, coord_at, query, result);
            }
        }
    }
}
