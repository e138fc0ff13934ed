//! Vector search for cadenza.
//!
//! Exact k-nearest-neighbor search under cosine distance over the feature
//! matrix. Every query compares against every row, so ties at the cut-off
//! are resolved exactly and deterministically (by catalog position).

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod distance;
pub mod error;
pub mod index;

pub use distance::cosine_distance;
pub use error::{IndexError, IndexResult};
pub use index::{Neighbor, SimilarityIndex};
