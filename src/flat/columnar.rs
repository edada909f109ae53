//! Column-major shadow store and the batched column kernel.
//!
//! Each dimension is one contiguous `Vec<f32>` across all stored vectors.
//! Scoring walks the columns in dimension order and updates a tile of
//! accumulators, one per stored vector, so the inner loop runs over
//! consecutive vectors and vectorizes across them.
//!
//! Each accumulator receives its squared differences in dimension order,
//! exactly like [`l2_squared_scalar`](crate::simd::l2_squared_scalar), so
//! column scores are bit-identical to the scalar row kernel.

/// Accumulators updated per column pass. Keeps the tile in L1.
const TILE: usize = 256;

#[derive(Debug, Clone)]
pub(crate) struct ColumnStore {
    columns: Vec<Vec<f32>>,
}

impl ColumnStore {
    pub(crate) fn new(dimension: usize) -> Self {
        Self {
            columns: vec![Vec::new(); dimension],
        }
    }

    /// Append one vector. Length is checked by the owning index.
    pub(crate) fn push(&mut self, vector: &[f32]) {
        debug_assert_eq!(vector.len(), self.columns.len());
        for (column, &x) in self.columns.iter_mut().zip(vector) {
            column.push(x);
        }
    }

    /// Column `d`: component `d` of every stored vector, in id order.
    pub(crate) fn column(&self, d: usize) -> &[f32] {
        &self.columns[d]
    }

    pub(crate) fn size_bytes(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.len() * std::mem::size_of::<f32>())
            .sum()
    }

    /// Squared L2 from `query` to vectors `start..start + out.len()`.
    pub(crate) fn score_range(&self, query: &[f32], start: usize, out: &mut [f32]) {
        for (t, tile) in out.chunks_mut(TILE).enumerate() {
            let base = start + t * TILE;
            tile.fill(0.0);
            for (d, &q) in query.iter().enumerate() {
                let values = &self.column(d)[base..base + tile.len()];
                for (acc, &x) in tile.iter_mut().zip(values) {
                    let d = x - q;
                    *acc += d * d;
                }
            }
        }
    }
}
