//! Training-side plumbing for cadenza.
//!
//! Loads the catalog from CSV, runs the ingest → featurize → index stages as
//! a treadle workflow, and reads/writes the artifact directory that serving
//! loads from.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod artifacts;
pub mod config;
pub mod error;
pub mod featurize;
pub mod index;
pub mod ingest;
pub mod loader;
pub mod pipeline;
pub mod train;
pub mod work_item;

pub use artifacts::{ArtifactStore, Artifacts, Manifest, StampedPipeline};
pub use config::Config;
pub use error::{ArtifactError, ArtifactResult, LoadError, TrainError};
pub use featurize::FeaturizeStage;
pub use index::IndexStage;
pub use ingest::IngestStage;
pub use loader::{load_catalog, LoadReport, LoadedCatalog};
pub use pipeline::build_training_pipeline;
pub use train::{train, TrainingSummary};
pub use work_item::TrainingJob;
