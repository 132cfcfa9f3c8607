//! Ingestion side of the pipeline: PDF loading, chunking, and embedding backends.

pub mod document;
pub mod embedding;

pub use document::chunker::{chunk_document, chunk_documents, Chunk};
pub use document::loader::{DocumentLoader, LoadOutcome, SkippedFile};
pub use document::{Document, DocumentMetadata, PageContent, PdfExtractor, TextExtractor};
pub use embedding::{embed_in_batches, Embedder, EmbeddingError, OllamaEmbedder};
