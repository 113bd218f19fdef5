use std::{cmp::Ordering, collections::BinaryHeap};

/// One candidate in a bounded nearest-neighbor search.
///
/// Ordered by squared distance first, then by index — so that among
/// equidistant candidates the one with the *larger* index sorts greater
/// and is evicted first when the result set is full. That leaves ties
/// broken by lower index, as spec §4.1 requires.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    dist: f32,
    idx: usize,
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist.total_cmp(&other.dist).then_with(|| self.idx.cmp(&other.idx))
    }
}

/// A fixed-capacity nearest-neighbor result set, backed by a max-heap so
/// the current worst candidate is always `O(1)` to inspect and evict.
pub struct KnnResultSet {
    heap: BinaryHeap<Entry>,
    capacity: usize,
}

impl KnnResultSet {
    pub fn new(capacity: usize) -> Self {
        KnnResultSet { heap: BinaryHeap::with_capacity(capacity), capacity }
    }

    pub fn clear(&mut self, capacity: usize) {
        self.heap.clear();
        self.capacity = capacity;
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Squared distance of the current worst candidate, if the set holds any.
    pub fn max_key(&self) -> Option<f32> {
        self.heap.peek().map(|e| e.dist)
    }

    pub fn push(&mut self, dist: f32, idx: usize) {
        if self.capacity == 0 {
            return;
        }
        let entry = Entry { dist, idx };
        if self.heap.len() < self.capacity {
            self.heap.push(entry);
        } else if let Some(top) = self.heap.peek() {
            if entry < *top {
                self.heap.pop();
                self.heap.push(entry);
            }
        }
    }

    /// Drains the set in ascending `(idx, dist)` order, ties broken by
    /// lower index (guaranteed by [`Entry`]'s `Ord` impl).
    pub fn into_sorted_vec(self) -> Vec<(usize, f32)> {
        self.heap.into_sorted_vec().into_iter().map(|e| (e.idx, e.dist)).collect()
    }

    pub fn into_unsorted_vec(self) -> Vec<(usize, f32)> {
        self.heap.into_vec().into_iter().map(|e| (e.idx, e.dist)).collect()
    }
}
