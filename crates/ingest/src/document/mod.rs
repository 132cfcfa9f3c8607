pub mod chunker;
pub mod clean;
pub mod loader;
mod pdf;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use pdf::PdfExtractor;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF extraction failed: {0}")]
    PdfError(String),
    #[error("no extractable text")]
    Empty,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A page of extracted text.
#[derive(Debug, Clone)]
pub struct PageContent {
    /// 1-based page number.
    pub page_number: usize,
    /// The extracted text content.
    pub text: String,
}

/// Turns raw file bytes into pages of text.
///
/// The PDF backend is a black box behind this seam; tests substitute
/// an in-memory implementation.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError>;
}

/// Descriptive attributes attached to every document and carried into the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// File name, used for source attribution.
    pub source: String,
    pub file_path: String,
    pub file_size: u64,
    pub file_type: String,
    /// First non-empty line of the text.
    pub title: Option<String>,
    /// First line that looks like an author credit.
    pub authors: Option<String>,
}

/// A loaded source PDF.
#[derive(Debug, Clone)]
pub struct Document {
    /// SHA-256 of the file bytes (hex).
    pub id: String,
    pub path: PathBuf,
    /// Cleaned text of all pages joined with a blank line.
    pub text: String,
    /// Byte offset in `text` at which each page starts.
    pub page_boundaries: Vec<usize>,
    pub metadata: DocumentMetadata,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.page_boundaries.len()
    }

    pub fn source(&self) -> &str {
        &self.metadata.source
    }

    /// 1-based page containing the byte at `offset`.
    pub fn page_at(&self, offset: usize) -> usize {
        self.page_boundaries
            .partition_point(|&start| start <= offset)
            .max(1)
    }
}
