pub mod batch;
pub mod ollama;
pub mod traits;

pub use batch::embed_in_batches;
pub use ollama::OllamaEmbedder;
pub use traits::{Embedder, EmbeddingError};
