//! Exhaustive (linear-scan) index.
//!
//! Every query is scored against every stored vector, then the K smallest
//! are selected. This is the exact baseline: its results are the brute-force
//! ground truth by construction.
//!
//! # Execution
//!
//! With [`ExecPolicy::Parallel`] the distance buffer (one slot per stored
//! vector, slot `i` for id `i`) is split into one contiguous chunk per
//! worker. Workers only ever write their own chunk, and the parallel call
//! returns once all of them are done, before top-K selection starts. Each
//! slot is computed by the same kernel either way, so sequential and
//! parallel searches return identical results.
//!
//! # Layout
//!
//! [`Layout::ColumnMajor`] keeps an extra per-dimension copy of the data and
//! scores through the batched column kernel (see `columnar`), which is
//! bit-identical to [`DistanceKernel::ScalarL2`](crate::DistanceKernel).
//!
//! ```rust
//! use kdscan::{LinearScanIndex, SearchConfig};
//!
//! # fn main() -> Result<(), kdscan::RetrieveError> {
//! let mut index = LinearScanIndex::new(2, SearchConfig::default())?;
//! index.add(&[0.0, 0.0])?;
//! index.add(&[1.0, 0.0])?;
//! index.add(&[5.0, 5.0])?;
//!
//! let results = index.search(&[0.9, 0.1], 2)?;
//! assert_eq!(results[0].0, 1);
//! assert_eq!(results[1].0, 0);
//! # Ok(())
//! # }
//! ```

mod columnar;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::ann::select_top_k;
use crate::config::{ExecPolicy, Layout, SearchConfig};
use crate::distance::DistanceFn;
use crate::error::{Result, RetrieveError};
use columnar::ColumnStore;

/// Linear-scan index over row-major storage.
///
/// Ids are insertion order, starting at 0. The index is append-only.
#[derive(Debug)]
pub struct LinearScanIndex {
    pub(crate) vectors: Vec<f32>,
    pub(crate) dimension: usize,
    pub(crate) num_vectors: usize,
    config: SearchConfig,
    /// Resolved from `config.distance` at construction.
    kernel: DistanceFn,
    /// Present iff `config.layout == ColumnMajor`.
    columns: Option<ColumnStore>,
    /// Dedicated workers when `config.num_threads` is set.
    pool: Option<ThreadPool>,
}

impl LinearScanIndex {
    /// Create an empty index.
    pub fn new(dimension: usize, config: SearchConfig) -> Result<Self> {
        if dimension == 0 {
            return Err(RetrieveError::InvalidParameter(
                "dimension must be greater than 0".to_string(),
            ));
        }
        config.validate()?;

        let pool = match (config.exec, config.num_threads) {
            (ExecPolicy::Parallel, Some(n)) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("kdscan-scan-{i}"))
                    .build()
                    .map_err(|e| RetrieveError::ThreadPool(e.to_string()))?,
            ),
            _ => None,
        };

        let columns = match config.layout {
            Layout::RowMajor => None,
            Layout::ColumnMajor => Some(ColumnStore::new(dimension)),
        };

        tracing::debug!(
            dimension,
            kernel = config.distance.name(),
            exec = ?config.exec,
            layout = ?config.layout,
            workers = pool.as_ref().map(ThreadPool::current_num_threads),
            "created linear scan index"
        );

        Ok(Self {
            vectors: Vec::new(),
            dimension,
            num_vectors: 0,
            config,
            kernel: config.distance.resolve(),
            columns,
            pool,
        })
    }

    /// Append a vector and return its id.
    ///
    /// On error the index is unchanged.
    pub fn add(&mut self, vector: &[f32]) -> Result<u32> {
        RetrieveError::check_dimension(self.dimension, vector.len())?;
        let id = u32::try_from(self.num_vectors)
            .ok()
            .filter(|&id| id != u32::MAX)
            .ok_or(RetrieveError::CapacityExceeded {
                limit: u32::MAX as usize,
            })?;

        self.vectors.extend_from_slice(vector);
        if let Some(columns) = self.columns.as_mut() {
            columns.push(vector);
        }
        self.num_vectors += 1;
        Ok(id)
    }

    /// `min(k, len())` nearest neighbors of `query` as `(id, squared_distance)`,
    /// ascending, ties by id.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u32, f32)>> {
        RetrieveError::check_dimension(self.dimension, query.len())?;
        if k == 0 || self.num_vectors == 0 {
            return Ok(Vec::new());
        }

        let scored: Vec<(u32, f32)> = self
            .score_all(query)
            .into_iter()
            .enumerate()
            .map(|(i, d)| (i as u32, d))
            .collect();
        let results = select_top_k(scored, k);

        tracing::trace!(
            k,
            scanned = self.num_vectors,
            returned = results.len(),
            "linear scan search"
        );
        Ok(results)
    }

    /// [`search`](Self::search) for each query; output order follows `queries`.
    pub fn batch_search<Q: AsRef<[f32]>>(
        &self,
        queries: &[Q],
        k: usize,
    ) -> Result<Vec<Vec<(u32, f32)>>> {
        queries.iter().map(|q| self.search(q.as_ref(), k)).collect()
    }

    /// Stored vector by id.
    pub fn get(&self, id: u32) -> Option<&[f32]> {
        let i = id as usize;
        (i < self.num_vectors).then(|| self.row(i))
    }

    pub fn len(&self) -> usize {
        self.num_vectors
    }

    pub fn is_empty(&self) -> bool {
        self.num_vectors == 0
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Approximate heap footprint of the stored data.
    pub fn size_bytes(&self) -> usize {
        self.vectors.len() * std::mem::size_of::<f32>()
            + self.columns.as_ref().map_or(0, ColumnStore::size_bytes)
    }

    /// One distance per stored vector, slot `i` for id `i`.
    fn score_all(&self, query: &[f32]) -> Vec<f32> {
        let n = self.num_vectors;
        let mut distances = vec![0.0f32; n];

        match self.config.exec {
            ExecPolicy::Sequential => self.score_range(query, 0, &mut distances),
            ExecPolicy::Parallel => match &self.pool {
                Some(pool) => pool.install(|| self.score_parallel(query, &mut distances)),
                None => self.score_parallel(query, &mut distances),
            },
        }

        distances
    }

    /// One contiguous chunk per worker of the current pool; returns after all chunks finish.
    fn score_parallel(&self, query: &[f32], distances: &mut [f32]) {
        let workers = rayon::current_num_threads().max(1);
        let chunk = distances.len().div_ceil(workers).max(1);
        distances
            .par_chunks_mut(chunk)
            .enumerate()
            .for_each(|(c, slots)| self.score_range(query, c * chunk, slots));
    }

    /// Score ids `start..start + out.len()` into `out`.
    fn score_range(&self, query: &[f32], start: usize, out: &mut [f32]) {
        match &self.columns {
            Some(columns) => columns.score_range(query, start, out),
            None => {
                let kernel = self.kernel;
                for (i, slot) in out.iter_mut().enumerate() {
                    *slot = kernel(self.row(start + i), query);
                }
            }
        }
    }

    #[inline]
    fn row(&self, i: usize) -> &[f32] {
        let start = i * self.dimension;
        &self.vectors[start..start + self.dimension]
    }
}
