//! Classic space-partitioning methods.
//!
//! Exact tree indexes that prune by geometry rather than by graph
//! navigation. They shine in low dimension and degrade toward a linear scan
//! as dimension grows.

#[cfg(feature = "kdtree")]
pub mod trees;
