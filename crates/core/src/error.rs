use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid chunk parameters: size={size}, overlap={overlap} (need size > 0 and overlap < size)")]
    InvalidChunkParams { size: usize, overlap: usize },

    #[error("Model backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Model backend error: {0}")]
    Backend(String),

    #[error("Index not found at {}", .0.display())]
    IndexNotFound(PathBuf),

    #[error("Index at {} is corrupt: {reason}", path.display())]
    IndexCorrupt { path: PathBuf, reason: String },

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("{0}")]
    Other(String),
}

impl RagError {
    /// True for failures that should be reported as "start the model server".
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, RagError::BackendUnavailable(_))
    }
}

pub type Result<T, E = RagError> = std::result::Result<T, E>;
