//! Shared index vocabulary.
//!
//! - [`VectorIndex`]: the common search surface of every index in the crate
//! - [`topk`]: the neighbor ordering and top-K selection both indexes rank with
//!
//! Results are `(id, squared_distance)` pairs, ascending. Ties on distance are
//! broken by ascending id, so a given index state and query always produce the
//! same sequence.

pub mod topk;
pub mod traits;

pub use topk::{neighbor_order, select_top_k};
pub use traits::{IndexStats, VectorIndex};
