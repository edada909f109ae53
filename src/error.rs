//! Error types for kdscan.

use thiserror::Error;

/// Errors that can occur during indexing/search operations.
///
/// Degenerate-but-valid inputs (empty index, `k` larger than the index,
/// zero vectors under cosine distance) are not errors and never show up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrieveError {
    /// Operand dimension does not match the expected dimension.
    #[error("dimension mismatch: expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Identifier space exhausted (ids are `u32`).
    #[error("index capacity exceeded: at most {limit} vectors")]
    CapacityExceeded { limit: usize },

    /// Worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

impl RetrieveError {
    /// Returns `Err(DimensionMismatch)` unless `actual == expected`.
    #[inline]
    pub(crate) fn check_dimension(expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(RetrieveError::DimensionMismatch { expected, actual })
        }
    }
}

pub type Result<T> = std::result::Result<T, RetrieveError>;
