//! Error types for lotline

use thiserror::Error;

/// The main error type for lotline operations.
///
/// Invalid geometry and mutations on missing elements are corrected or
/// ignored locally, so only layout file I/O actually produces errors.
#[derive(Debug, Error)]
pub enum LotError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("JSON serialization error: {0}")]
    JsonSerError(String),
}

/// Result type alias for lotline operations
pub type Result<T> = std::result::Result<T, LotError>;

impl From<serde_json::Error> for LotError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            LotError::JsonSerError(err.to_string())
        } else {
            LotError::JsonParseError(err.to_string())
        }
    }
}
