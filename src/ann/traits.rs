//! Unified trait for the exact indexes.

use crate::error::Result;

/// Common search surface of every index in the crate.
///
/// Population differs per index (incremental `add` vs one-shot `build`), so
/// only the read side is shared.
pub trait VectorIndex {
    /// `min(k, len())` nearest neighbors as `(id, squared_distance)`, ascending.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>>;

    /// Run [`VectorIndex::search`] for each query, preserving query order.
    fn batch_search(&self, queries: &[&[f32]], k: usize) -> Result<Vec<Vec<(u32, f32)>>> {
        queries.iter().map(|q| self.search(q, k)).collect()
    }

    /// Get index size in bytes (approximate).
    fn size_bytes(&self) -> usize;

    /// Get index statistics.
    fn stats(&self) -> IndexStats {
        IndexStats {
            num_vectors: self.num_vectors(),
            dimension: self.dimension(),
            size_bytes: self.size_bytes(),
            algorithm: self.algorithm().to_string(),
        }
    }

    /// Short algorithm name, e.g. `"KD-Tree"`.
    fn algorithm(&self) -> &'static str;

    /// Get vector dimension.
    fn dimension(&self) -> usize;

    /// Get number of vectors.
    fn num_vectors(&self) -> usize;
}

/// Statistics about an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub num_vectors: usize,
    pub dimension: usize,
    pub size_bytes: usize,
    pub algorithm: String,
}

impl VectorIndex for crate::flat::LinearScanIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        self.search(query, k)
    }

    fn size_bytes(&self) -> usize {
        self.size_bytes()
    }

    fn algorithm(&self) -> &'static str {
        "Linear-Scan"
    }

    fn dimension(&self) -> usize {
        self.dimension()
    }

    fn num_vectors(&self) -> usize {
        self.len()
    }
}

#[cfg(feature = "kdtree")]
impl VectorIndex for crate::classic::trees::kdtree::KDTreeIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        self.search(query, k)
    }

    fn size_bytes(&self) -> usize {
        self.size_bytes()
    }

    fn algorithm(&self) -> &'static str {
        "KD-Tree"
    }

    fn dimension(&self) -> usize {
        self.dimension()
    }

    fn num_vectors(&self) -> usize {
        self.len()
    }
}
