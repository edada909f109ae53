//! Search configuration.

use crate::distance::DistanceKernel;
use crate::error::{Result, RetrieveError};

/// How per-query distance work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecPolicy {
    /// Calling thread only.
    #[default]
    Sequential,
    /// Fork-join over a rayon pool: contiguous disjoint ranges, joined before top-K selection.
    Parallel,
}

/// Storage layout of a [`LinearScanIndex`](crate::flat::LinearScanIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layout {
    /// Each vector contiguous.
    #[default]
    RowMajor,
    /// Additionally keep one contiguous column per dimension and score with
    /// the batched column kernel.
    ColumnMajor,
}

/// Immutable per-index configuration.
///
/// ```rust
/// use kdscan::{DistanceKernel, ExecPolicy, SearchConfig};
///
/// let cfg = SearchConfig::default()
///     .with_distance(DistanceKernel::SimdL2)
///     .with_exec(ExecPolicy::Parallel)
///     .with_num_threads(4);
/// assert_eq!(cfg.num_threads, Some(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Pairwise squared-L2 kernel (row-major layout only).
    pub distance: DistanceKernel,

    /// Sequential or fork-join parallel scoring.
    pub exec: ExecPolicy,

    /// Storage layout.
    pub layout: Layout,

    /// Size of a dedicated worker pool for [`ExecPolicy::Parallel`].
    /// `None` shares rayon's global pool.
    pub num_threads: Option<usize>,
}

impl SearchConfig {
    #[must_use]
    pub fn with_distance(mut self, distance: DistanceKernel) -> Self {
        self.distance = distance;
        self
    }

    #[must_use]
    pub fn with_exec(mut self, exec: ExecPolicy) -> Self {
        self.exec = exec;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Use a dedicated pool of `n` workers when running in parallel.
    #[must_use]
    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.num_threads == Some(0) {
            return Err(RetrieveError::InvalidParameter(
                "num_threads must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
