//! Vector operations with SIMD acceleration.
//!
//! The squared-L2 kernel works in lanes of [`LANES`] floats with fused
//! multiply-add accumulation, reduces the lanes horizontally at the end, and
//! finishes the `len % LANES` tail with the scalar formula.
//!
//! Backends, picked at runtime:
//! - x86_64: AVX2 + FMA (`is_x86_feature_detected!`)
//! - aarch64: NEON, two 4-wide registers
//! - everything else: portable code with eight independent accumulators
//!
//! Because the summation order differs from a straight left-to-right loop,
//! results agree with [`l2_squared_scalar`] only up to rounding.
//!
//! ```rust
//! use kdscan::simd::{l2_squared, l2_squared_scalar};
//!
//! let a: Vec<f32> = (0..19).map(|i| i as f32).collect();
//! let b: Vec<f32> = (0..19).map(|i| (i as f32) * 0.5).collect();
//! let fast = l2_squared(&a, &b);
//! let slow = l2_squared_scalar(&a, &b);
//! assert!((fast - slow).abs() <= 1e-4 * slow);
//! ```

use std::sync::OnceLock;

/// Width of one SIMD lane group, in `f32`s.
pub const LANES: usize = 8;

/// Dot product of two vectors (portable implementation).
#[inline]
#[must_use]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm of a vector.
#[inline]
#[must_use]
pub fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Squared L2 distance, one dimension at a time in index order.
#[inline]
#[must_use]
pub fn l2_squared_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        let d = x - y;
        sum += d * d;
    }
    sum
}

/// Squared L2 distance using the fastest kernel available on this CPU.
#[inline]
#[must_use]
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    l2_squared_kernel()(a, b)
}

/// Select the lane kernel for the running CPU.
///
/// Feature detection runs on the first call in the process; later calls
/// read the cached choice.
#[must_use]
pub fn l2_squared_kernel() -> fn(&[f32], &[f32]) -> f32 {
    static KERNEL: OnceLock<fn(&[f32], &[f32]) -> f32> = OnceLock::new();
    *KERNEL.get_or_init(detect_l2_squared_kernel)
}

#[allow(unreachable_code)]
fn detect_l2_squared_kernel() -> fn(&[f32], &[f32]) -> f32 {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            return x86_64::l2_squared_avx2_dispatch;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        return aarch64::l2_squared_neon_dispatch;
    }

    l2_squared_portable
}

/// Portable lane kernel: eight running sums, one per lane.
#[must_use]
pub fn l2_squared_portable(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    let (a, b) = (&a[..n], &b[..n]);

    let mut acc = [0.0f32; LANES];
    let a_chunks = a.chunks_exact(LANES);
    let b_chunks = b.chunks_exact(LANES);
    let (a_tail, b_tail) = (a_chunks.remainder(), b_chunks.remainder());

    for (ca, cb) in a_chunks.zip(b_chunks) {
        for lane in 0..LANES {
            let d = ca[lane] - cb[lane];
            acc[lane] += d * d;
        }
    }

    acc.iter().sum::<f32>() + l2_squared_scalar(a_tail, b_tail)
}

#[cfg(target_arch = "x86_64")]
pub mod x86_64 {
    //! AVX2 + FMA kernels.

    use super::{l2_squared_scalar, LANES};

    /// Safe entry point; only handed out after AVX2 and FMA were detected.
    pub(super) fn l2_squared_avx2_dispatch(a: &[f32], b: &[f32]) -> f32 {
        // SAFETY: `l2_squared_kernel` returns this function only when both
        // `avx2` and `fma` are reported by the CPU.
        unsafe { l2_squared_avx2(a, b) }
    }

    /// Squared L2 over 8-wide `__m256` lanes with `vfmadd`.
    ///
    /// # Safety
    ///
    /// Requires AVX2 and FMA. Caller must verify via runtime detection.
    #[target_feature(enable = "avx2,fma")]
    pub unsafe fn l2_squared_avx2(a: &[f32], b: &[f32]) -> f32 {
        use std::arch::x86_64::{
            _mm256_fmadd_ps, _mm256_loadu_ps, _mm256_setzero_ps, _mm256_storeu_ps, _mm256_sub_ps,
        };

        let n = a.len().min(b.len());
        let mut sum = _mm256_setzero_ps();
        let mut i = 0;

        while i + LANES <= n {
            let va = _mm256_loadu_ps(a.as_ptr().add(i));
            let vb = _mm256_loadu_ps(b.as_ptr().add(i));
            let diff = _mm256_sub_ps(va, vb);
            sum = _mm256_fmadd_ps(diff, diff, sum);
            i += LANES;
        }

        let mut lanes = [0.0f32; LANES];
        _mm256_storeu_ps(lanes.as_mut_ptr(), sum);

        lanes.iter().sum::<f32>() + l2_squared_scalar(&a[i..n], &b[i..n])
    }
}

#[cfg(target_arch = "aarch64")]
pub mod aarch64 {
    //! NEON kernels.

    use super::{l2_squared_scalar, LANES};

    pub(super) fn l2_squared_neon_dispatch(a: &[f32], b: &[f32]) -> f32 {
        // SAFETY: NEON is always available on aarch64.
        unsafe { l2_squared_neon(a, b) }
    }

    /// Squared L2 over two `float32x4_t` accumulators (8 lanes total).
    ///
    /// # Safety
    ///
    /// NEON is always available on aarch64.
    #[target_feature(enable = "neon")]
    pub unsafe fn l2_squared_neon(a: &[f32], b: &[f32]) -> f32 {
        use std::arch::aarch64::{vaddq_f32, vaddvq_f32, vdupq_n_f32, vfmaq_f32, vld1q_f32, vsubq_f32};

        let n = a.len().min(b.len());
        let mut lo = vdupq_n_f32(0.0);
        let mut hi = vdupq_n_f32(0.0);
        let mut i = 0;

        while i + LANES <= n {
            let d0 = vsubq_f32(vld1q_f32(a.as_ptr().add(i)), vld1q_f32(b.as_ptr().add(i)));
            let d1 = vsubq_f32(
                vld1q_f32(a.as_ptr().add(i + 4)),
                vld1q_f32(b.as_ptr().add(i + 4)),
            );
            lo = vfmaq_f32(lo, d0, d0);
            hi = vfmaq_f32(hi, d1, d1);
            i += LANES;
        }

        vaddvq_f32(vaddq_f32(lo, hi)) + l2_squared_scalar(&a[i..n], &b[i..n])
    }
}
