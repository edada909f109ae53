//! K-D Tree implementation.
//!
//! Space-partitioning tree using axis-aligned hyperplanes. Every node pins one
//! dataset point (the median along its split axis), so the tree has exactly
//! one node per point and depth `ceil(log2(n + 1))`.
//!
//! **Technical Name**: K-D Tree
//!
//! Algorithm:
//! - Split axis cycles with depth: `axis = depth % dimension`
//! - Median selection by partial ordering (`select_nth_unstable_by`), not a sort
//! - Search: depth-first, near side first, bounded max-heap of size k
//! - Far side is skipped when the squared distance to the splitting plane
//!   exceeds the worst kept distance; a NaN plane distance never prunes
//!
//! Search is exact: pruning only discards subtrees that provably contain no
//! closer point. The bound only holds for Euclidean geometry, so the tree
//! always ranks by scalar squared L2 whatever [`SearchConfig`](crate::SearchConfig)
//! other indexes use.
//!
//! **Relationships**:
//! - Best for low dimensions (d < 20); as d grows, fewer branches can be
//!   pruned and the cost approaches a linear scan
//! - [`LinearScanIndex`](crate::LinearScanIndex) returns the same results and
//!   is the better choice once most nodes are visited anyway
//!
//! # Ownership
//!
//! The dataset is held as `Arc<[Vector]>`: shared, immutable, and kept
//! alive by the index. Nodes live in a flat arena addressed by `u32`.
//!
//! # References
//!
//! - Bentley (1975): "Multidimensional binary search trees used for associative searching"
//! - Friedman, Bentley, Finkel (1977): "An algorithm for finding best matches in
//!   logarithmic expected time"

use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::ann::topk::Candidate;
use crate::error::{Result, RetrieveError};
use crate::simd;
use crate::vector::Vector;

/// Per-search traversal counters. Diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KDTreeStats {
    /// Nodes whose pivot was compared against the query.
    pub visited_nodes: usize,
    /// Far subtrees skipped by the plane-distance bound.
    ///
    /// Only existing subtrees are counted: a failed bound check at a node
    /// with no far child does not increment this.
    pub pruned_branches: usize,
}

/// K-D Tree index.
#[derive(Debug, Clone)]
pub struct KDTreeIndex {
    dimension: usize,
    dataset: Arc<[Vector]>,
    nodes: Vec<KDNode>,
    root: Option<u32>,
    depth: usize,
}

/// Arena node. Children index into `KDTreeIndex::nodes`.
#[derive(Debug, Clone, Copy)]
struct KDNode {
    /// Dataset id of the median point.
    pivot: u32,
    axis: usize,
    split: f32,
    left: Option<u32>,
    right: Option<u32>,
}

impl KDTreeIndex {
    /// Create an empty (unbuilt) K-D Tree.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(RetrieveError::InvalidParameter(
                "dimension must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            dimension,
            dataset: Arc::from(Vec::<Vector>::new()),
            nodes: Vec::new(),
            root: None,
            depth: 0,
        })
    }

    /// Create and build in one step.
    pub fn from_dataset(dimension: usize, dataset: impl Into<Arc<[Vector]>>) -> Result<Self> {
        let mut index = Self::new(dimension)?;
        index.build(dataset)?;
        Ok(index)
    }

    /// Build the tree over `dataset`. Point ids are dataset positions.
    ///
    /// Every vector is checked against the index dimension first; on error
    /// the previous tree (if any) is kept. Building again replaces the tree.
    pub fn build(&mut self, dataset: impl Into<Arc<[Vector]>>) -> Result<()> {
        let dataset = dataset.into();
        for v in dataset.iter() {
            RetrieveError::check_dimension(self.dimension, v.dim())?;
        }
        if dataset.len() > u32::MAX as usize {
            return Err(RetrieveError::CapacityExceeded {
                limit: u32::MAX as usize,
            });
        }

        let mut ids: Vec<u32> = (0..dataset.len() as u32).collect();
        let mut nodes = Vec::with_capacity(dataset.len());
        let mut depth = 0;
        let root = Self::build_recursive(
            &dataset,
            self.dimension,
            &mut ids,
            0,
            &mut nodes,
            &mut depth,
        );

        tracing::debug!(
            points = dataset.len(),
            dimension = self.dimension,
            depth,
            "built kd-tree"
        );

        self.dataset = dataset;
        self.nodes = nodes;
        self.root = root;
        self.depth = depth;
        Ok(())
    }

    /// Build subtree over `ids`, returning its arena index.
    ///
    /// `ids` is reordered in place: after median selection the left half
    /// holds values `<=` the split and the right half values `>=` it.
    fn build_recursive(
        dataset: &[Vector],
        dimension: usize,
        ids: &mut [u32],
        level: usize,
        nodes: &mut Vec<KDNode>,
        max_depth: &mut usize,
    ) -> Option<u32> {
        if ids.is_empty() {
            return None;
        }
        *max_depth = (*max_depth).max(level + 1);

        let axis = level % dimension;
        let mid = ids.len() / 2;
        ids.select_nth_unstable_by(mid, |&a, &b| {
            dataset[a as usize][axis].total_cmp(&dataset[b as usize][axis])
        });

        let pivot = ids[mid];
        let slot = nodes.len() as u32;
        nodes.push(KDNode {
            pivot,
            axis,
            split: dataset[pivot as usize][axis],
            left: None,
            right: None,
        });

        let (left_ids, rest) = ids.split_at_mut(mid);
        let right_ids = &mut rest[1..];
        let left =
            Self::build_recursive(dataset, dimension, left_ids, level + 1, nodes, max_depth);
        let right =
            Self::build_recursive(dataset, dimension, right_ids, level + 1, nodes, max_depth);

        let node = &mut nodes[slot as usize];
        node.left = left;
        node.right = right;
        Some(slot)
    }

    /// Search for k nearest neighbors.
    ///
    /// Returns `min(k, len())` `(id, squared_distance)` pairs, ascending, ties by id.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        self.search_with_stats(query, k).map(|(results, _)| results)
    }

    /// [`search`](Self::search) that also reports traversal counters.
    pub fn search_with_stats(
        &self,
        query: &[f32],
        k: usize,
    ) -> Result<(Vec<(u32, f32)>, KDTreeStats)> {
        RetrieveError::check_dimension(self.dimension, query.len())?;

        let mut stats = KDTreeStats::default();
        let root = match self.root {
            Some(root) if k > 0 => root,
            _ => return Ok((Vec::new(), stats)),
        };

        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k.min(self.len()) + 1);
        self.search_recursive(root, query, k, &mut heap, &mut stats);

        // into_sorted_vec is ascending: the reverse of pop order.
        let results: Vec<(u32, f32)> = heap
            .into_sorted_vec()
            .iter()
            .map(Candidate::key)
            .collect();

        tracing::trace!(
            k,
            returned = results.len(),
            visited = stats.visited_nodes,
            pruned = stats.pruned_branches,
            "kd-tree search"
        );
        Ok((results, stats))
    }

    fn search_recursive(
        &self,
        slot: u32,
        query: &[f32],
        k: usize,
        heap: &mut BinaryHeap<Candidate>,
        stats: &mut KDTreeStats,
    ) {
        let node = self.nodes[slot as usize];
        stats.visited_nodes += 1;

        let candidate = Candidate {
            id: node.pivot,
            distance: simd::l2_squared_scalar(&self.dataset[node.pivot as usize], query),
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|worst| candidate < *worst) {
            heap.pop();
            heap.push(candidate);
        }

        let diff = query[node.axis] - node.split;
        let (near, far) = if diff <= 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(near) = near {
            self.search_recursive(near, query, k, heap, stats);
        }

        if let Some(far) = far {
            let worst = if heap.len() < k {
                f32::INFINITY
            } else {
                heap.peek().map_or(f32::INFINITY, |c| c.distance)
            };
            // Skip only when the bound provably holds. Equal distances stay
            // reachable for the id tie-break, and a NaN plane distance (NaN
            // query component or NaN split) never prunes.
            let provably_farther = diff * diff > worst;
            if provably_farther {
                stats.pruned_branches += 1;
            } else {
                self.search_recursive(far, query, k, heap, stats);
            }
        }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of levels (0 when empty).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The indexed dataset; ids are positions in this slice.
    pub fn dataset(&self) -> &Arc<[Vector]> {
        &self.dataset
    }

    /// Approximate size: node arena plus the shared dataset.
    pub fn size_bytes(&self) -> usize {
        self.nodes.len() * std::mem::size_of::<KDNode>()
            + self.dataset.len() * self.dimension * std::mem::size_of::<f32>()
    }
}
