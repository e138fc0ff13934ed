//! Recommendation engine for cadenza.
//!
//! Resolves a free-text title to a catalog track, pulls its nearest
//! neighbors from the similarity index, filters them on tempo, loudness,
//! title and artist rules, and ranks the survivors by a blended match score.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod engine;
pub mod error;
pub mod resolve;
pub mod result;

pub use config::RecommendConfig;
pub use engine::RecommendationEngine;
pub use error::{EngineError, EngineResult};
pub use resolve::{ExactMatcher, SubstringMatcher, TitleMatcher};
pub use result::{Candidate, InputSummary, Recommendation};
