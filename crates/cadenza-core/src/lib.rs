//! Core domain model for cadenza.
//!
//! This crate defines the track record and the positional catalog, the
//! feature pipeline that turns a catalog into a weighted vector space, and
//! the SQLite store that persists the catalog between training and serving.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod error;
pub mod features;
pub mod model;
pub mod schema;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use features::{FeatureMatrix, FeaturePipeline, FeatureWeights};
pub use model::{Track, TrackId};
