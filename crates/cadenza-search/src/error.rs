use thiserror::Error;

/// Errors raised while building or querying a similarity index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The matrix has no rows.
    #[error("cannot build an index over an empty feature matrix")]
    EmptyMatrix,

    /// A stored row was requested by a position past the end of the matrix.
    #[error("position {position} out of range for index of {rows} rows")]
    PositionOutOfRange { position: usize, rows: usize },
}

/// Convenience alias for index results.
pub type IndexResult<T> = std::result::Result<T, IndexError>;
