//! Distance metrics for dense vectors.
//!
//! Two things live here: the checked public distance functions, and
//! [`DistanceKernel`], the one place where "scalar or SIMD" is decided.
//!
//! ## Important nuance
//!
//! Squared L2 is returned without the square root. It is monotonic in the
//! true Euclidean distance, so ranking is unchanged, and every index in this
//! crate reports squared distances.
//!
//! [`cosine_distance`] is $1 - \cos(a,b)$ and computes norms itself; inputs
//! need not be normalized. If either norm is exactly zero it returns `1.0`.

use crate::error::{Result, RetrieveError};
use crate::simd;

/// Unchecked pairwise distance. Both slices must have the same length.
pub type DistanceFn = fn(&[f32], &[f32]) -> f32;

/// Squared-L2 kernel selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceKernel {
    /// One dimension at a time.
    #[default]
    ScalarL2,
    /// 8-lane FMA kernel, scalar tail.
    SimdL2,
}

impl DistanceKernel {
    /// Resolve to a function pointer.
    ///
    /// Indexes call this once at construction and keep the pointer, so the
    /// hot loop never branches on the kernel choice.
    #[must_use]
    pub fn resolve(self) -> DistanceFn {
        match self {
            DistanceKernel::ScalarL2 => simd::l2_squared_scalar,
            DistanceKernel::SimdL2 => simd::l2_squared_kernel(),
        }
    }

    /// Squared L2 distance with this kernel, for one-off comparisons.
    ///
    /// CPU feature detection is cached process-wide, so repeated calls do
    /// not re-detect; loops over many vectors should still hold on to
    /// [`resolve`](Self::resolve).
    pub fn distance(self, a: &[f32], b: &[f32]) -> Result<f32> {
        RetrieveError::check_dimension(a.len(), b.len())?;
        Ok(self.resolve()(a, b))
    }

    pub fn name(self) -> &'static str {
        match self {
            DistanceKernel::ScalarL2 => "scalar-l2",
            DistanceKernel::SimdL2 => "simd-l2",
        }
    }
}

/// Squared L2 (Euclidean) distance, scalar kernel.
#[inline]
pub fn squared_l2(a: &[f32], b: &[f32]) -> Result<f32> {
    RetrieveError::check_dimension(a.len(), b.len())?;
    Ok(simd::l2_squared_scalar(a, b))
}

/// Squared L2 (Euclidean) distance, lane kernel.
#[inline]
pub fn squared_l2_simd(a: &[f32], b: &[f32]) -> Result<f32> {
    RetrieveError::check_dimension(a.len(), b.len())?;
    Ok(simd::l2_squared(a, b))
}

/// Cosine distance $1 - \cos(a,b)$.
///
/// A zero vector on either side gives `1.0`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    RetrieveError::check_dimension(a.len(), b.len())?;

    let mut dot = 0.0f32;
    let mut na = 0.0f32;
    let mut nb = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }

    if na == 0.0 || nb == 0.0 {
        return Ok(1.0);
    }
    Ok(1.0 - dot / (na.sqrt() * nb.sqrt()))
}
