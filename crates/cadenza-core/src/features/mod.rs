//! Feature pipeline: turns a catalog into a weighted vector space.
//!
//! Each track becomes one row of the [`FeatureMatrix`]. Audio descriptors are
//! standardized, popularity is min-max scaled, the explicit flag passes
//! through, and the genre is one-hot encoded. Every block is then multiplied
//! by its weight from [`FeatureWeights`].

pub mod encoder;
pub mod matrix;
pub mod pipeline;
pub mod scaler;
pub mod weights;

pub use encoder::OneHotEncoder;
pub use matrix::FeatureMatrix;
pub use pipeline::FeaturePipeline;
pub use scaler::{MinMaxScaler, StandardScaler};
pub use weights::FeatureWeights;
