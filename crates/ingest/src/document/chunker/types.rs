//! Chunk output type.

use serde::{Deserialize, Serialize};

/// A contiguous span of one document's text, sized for embedding.
///
/// Immutable once produced: `text == document.text[start..end]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// `"{document_id}:{index}"`.
    pub id: String,
    /// Id of the source document.
    pub document_id: String,
    /// Source file name, for attribution.
    pub source: String,
    /// 0-based position within the document.
    pub index: usize,
    /// Exact slice of the document text, including trailing whitespace.
    pub text: String,
    /// Byte offset where the chunk starts in the document text.
    pub start: usize,
    /// Byte offset one past the chunk's end.
    pub end: usize,
    /// Number of whitespace-delimited tokens.
    pub token_count: usize,
    /// 1-based page holding the chunk's first token.
    pub page_number: usize,
}

impl Chunk {
    /// Text without the surrounding whitespace; this is what gets embedded
    /// and shown to the model.
    pub fn content(&self) -> &str {
        self.text.trim()
    }
}
