//! Error types for loading, training, and artifact handling.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the catalog CSV.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The dataset file does not exist.
    #[error("dataset file not found at: {}", path.display())]
    NotFound { path: PathBuf },

    /// A required column is absent from the header.
    #[error("schema error: required column '{column}' is missing from the dataset (available columns: {})", available.join(", "))]
    Schema {
        column: String,
        available: Vec<String>,
    },

    /// The CSV could not be read or is malformed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The cleaned rows could not form a catalog.
    #[error("catalog error: {0}")]
    Catalog(#[from] cadenza_core::Error),
}

/// Errors raised while reading or writing the artifact directory.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// One or more artifact files are absent; training has not been run.
    #[error("required model artifacts are missing in {} ({}); run training first", dir.display(), files.join(", "))]
    Missing { dir: PathBuf, files: Vec<String> },

    /// An artifact exists but cannot be parsed or disagrees with the others.
    #[error("corrupt artifact {file}: {message}")]
    Corrupt { file: String, message: String },

    /// Filesystem failure while writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog store failure while writing artifacts.
    #[error("catalog store error: {0}")]
    Database(#[from] cadenza_core::Error),

    /// Serialization failure while writing artifacts.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ArtifactError {
    /// Returns `true` when the artifacts have simply not been produced yet.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }

    pub(crate) fn corrupt(file: &str, message: impl std::fmt::Display) -> Self {
        Self::Corrupt {
            file: file.to_string(),
            message: message.to_string(),
        }
    }
}

/// Errors that abort a training run.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Feature fitting failed (empty dataset, invalid weights).
    #[error("feature pipeline error: {0}")]
    Features(#[from] cadenza_core::Error),

    #[error("index error: {0}")]
    Index(#[from] cadenza_search::IndexError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Convenience alias for artifact results.
pub type ArtifactResult<T> = std::result::Result<T, ArtifactError>;
