//! kdscan: exact k-nearest-neighbor search over dense `f32` vectors.
//!
//! Provides two exact indexes and the distance layer underneath them:
//!
//! - `flat/`: [`LinearScanIndex`], brute force with sequential or fork-join
//!   parallel scoring and an optional column-major layout
//! - `classic/trees/`: [`KDTreeIndex`](classic::trees::KDTreeIndex), a
//!   median-split K-D tree with bounded best-first pruning search
//! - [`distance`] / [`simd`]: squared L2 and cosine distance, with scalar
//!   and 8-lane SIMD kernels selected through [`DistanceKernel`]
//!
//! Both indexes return `(id, squared_distance)` pairs in ascending order,
//! ties broken by ascending id, and never more than the index holds. Ids are
//! positions: insertion order for the linear scan, dataset order for the tree.
//!
//! ```rust
//! use kdscan::{LinearScanIndex, SearchConfig, Vector};
//! # #[cfg(feature = "kdtree")]
//! use kdscan::classic::trees::KDTreeIndex;
//!
//! # fn main() -> Result<(), kdscan::RetrieveError> {
//! let data: Vec<Vector> = vec![
//!     Vector::from([0.0, 0.0]),
//!     Vector::from([1.0, 0.0]),
//!     Vector::from([0.0, 1.0]),
//!     Vector::from([5.0, 5.0]),
//! ];
//!
//! let mut flat = LinearScanIndex::new(2, SearchConfig::default())?;
//! for v in &data {
//!     flat.add(v)?;
//! }
//! assert_eq!(flat.search(&[0.0, 0.0], 2)?, vec![(0, 0.0), (1, 1.0)]);
//!
//! # #[cfg(feature = "kdtree")]
//! # {
//! let tree = KDTreeIndex::from_dataset(2, data)?;
//! assert_eq!(tree.search(&[0.0, 0.0], 2)?, vec![(0, 0.0), (1, 1.0)]);
//! # }
//! # Ok(())
//! # }
//! ```
//!
//! # Critical Nuances
//!
//! ## When Exact Search Beats Approximate
//!
//! - Small datasets (< 10K vectors): Brute force is faster
//! - Very high recall requirements (> 99.9%): ANN overhead not worth it
//! - Low intrinsic dimensionality: KD-trees can be exact and fast
//!
//! ## Curse of Dimensionality
//!
//! A K-D tree prunes a subtree when the query is farther from the splitting
//! plane than from its current k-th neighbor. In high dimension nearly every
//! plane is closer than that, so the tree visits most nodes and costs about
//! as much as a linear scan. That is expected behavior, not a bug.

pub mod ann;
pub mod classic;
pub mod config;
pub mod distance;
pub mod error;
pub mod flat;
pub mod simd;
pub mod vector;

// Re-exports
pub use ann::{IndexStats, VectorIndex};
pub use config::{ExecPolicy, Layout, SearchConfig};
pub use distance::{cosine_distance, squared_l2, squared_l2_simd, DistanceFn, DistanceKernel};
pub use error::{Result, RetrieveError};
pub use flat::LinearScanIndex;
pub use vector::Vector;

#[cfg(feature = "kdtree")]
pub use classic::trees::{KDTreeIndex, KDTreeStats};
