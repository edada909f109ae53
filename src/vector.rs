//! Dense fixed-dimension vectors.

use std::ops::Deref;

use crate::error::{Result, RetrieveError};
use crate::simd;

/// Owned dense `f32` vector.
///
/// The dimension is the length of the buffer, so `dim() == as_slice().len()`
/// holds by construction. Vectors deref to `[f32]`, which is what every
/// index and distance function accepts.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    /// Zero vector of the given dimension.
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; dim],
        }
    }

    /// Wrap `data`, requiring it to have exactly `dim` components.
    pub fn with_dim(dim: usize, data: Vec<f32>) -> Result<Self> {
        RetrieveError::check_dimension(dim, data.len())?;
        Ok(Self { data })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// L2 norm.
    #[inline]
    pub fn norm(&self) -> f32 {
        simd::norm(&self.data)
    }

    /// Scale to unit L2 norm. A zero vector is left unchanged.
    pub fn normalize(&mut self) {
        let n = self.norm();
        if n > 0.0 {
            for x in &mut self.data {
                *x /= n;
            }
        }
    }
}

impl Deref for Vector {
    type Target = [f32];

    #[inline]
    fn deref(&self) -> &[f32] {
        &self.data
    }
}

impl AsRef<[f32]> for Vector {
    #[inline]
    fn as_ref(&self) -> &[f32] {
        &self.data
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self { data }
    }
}

impl From<&[f32]> for Vector {
    fn from(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

impl<const N: usize> From<[f32; N]> for Vector {
    fn from(data: [f32; N]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }
}

impl FromIterator<f32> for Vector {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}
