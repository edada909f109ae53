//! Neighbor ordering and top-K selection.

use std::cmp::Ordering;

/// Total order on `(id, distance)` results: distance first (IEEE total order,
/// so NaN sorts last), then id ascending.
#[inline]
pub fn neighbor_order(a: &(u32, f32), b: &(u32, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}

/// Keep the `k` smallest entries of `scored` under [`neighbor_order`], sorted.
///
/// Partial selection (`select_nth_unstable_by`, linear on average) narrows
/// the buffer to `k` entries before the sort, so only `k` elements are
/// sorted. Because the order is total, the outcome does not depend on the
/// initial arrangement of `scored`.
pub fn select_top_k(mut scored: Vec<(u32, f32)>, k: usize) -> Vec<(u32, f32)> {
    if k == 0 {
        return Vec::new();
    }
    if scored.len() > k {
        scored.select_nth_unstable_by(k - 1, neighbor_order);
        scored.truncate(k);
    }
    scored.sort_unstable_by(neighbor_order);
    scored
}

/// Max-heap entry: the worst kept candidate sits at the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) id: u32,
    pub(crate) distance: f32,
}

impl Candidate {
    #[inline]
    pub(crate) fn key(&self) -> (u32, f32) {
        (self.id, self.distance)
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Use total_cmp for IEEE 754 total ordering (NaN-safe)
        neighbor_order(&self.key(), &other.key())
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
