//! Tree-based exact search.

#[cfg(feature = "kdtree")]
pub mod kdtree;

#[cfg(feature = "kdtree")]
pub use kdtree::{KDTreeIndex, KDTreeStats};
