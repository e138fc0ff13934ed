use cadenza_etl::ArtifactError;
use thiserror::Error;

/// Errors that prevent an engine from being constructed.
///
/// Query outcomes such as an unknown title are never errors; see
/// [`crate::Recommendation`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("catalog has {tracks} tracks but the index has {rows} rows")]
    CatalogMismatch { tracks: usize, rows: usize },

    #[error("pipeline produces {pipeline} columns but the index has {index}")]
    DimensionMismatch { pipeline: usize, index: usize },
}

impl EngineError {
    /// Returns `true` when training has not produced artifacts yet.
    pub fn is_missing_artifacts(&self) -> bool {
        matches!(self, Self::Artifact(e) if e.is_missing())
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
