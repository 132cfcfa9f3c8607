use async_trait::async_trait;
use pdfrag_core::RagError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Backend returned {actual} embeddings for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },
}

impl From<EmbeddingError> for RagError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::Http(e) if e.is_connect() || e.is_timeout() => {
                RagError::BackendUnavailable(format!("embedding backend: {e}"))
            }
            other => RagError::Backend(format!("embedding backend: {other}")),
        }
    }
}

/// Trait for embedding backends.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input text (in order).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;

    /// Model identifier, recorded in the index manifest.
    fn model(&self) -> &str;
}
