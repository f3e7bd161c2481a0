use std::path::PathBuf;

/// Errors raised while loading a QBF instance. Loading is all-or-nothing.
#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    #[error("failed to read instance {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("instance is empty, expected the dimension as first token")]
    MissingDimension,
    #[error("invalid dimension {0:?}, expected a non-negative integer")]
    InvalidDimension(String),
    #[error("invalid coefficient {token:?} at token {position}")]
    InvalidToken { position: usize, token: String },
    #[error("instance truncated: expected {expected} coefficients, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("expected {expected} upper-triangle coefficients, got {found}")]
    CoefficientCount { expected: usize, found: usize },
}
