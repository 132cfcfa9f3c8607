use pdfrag_ingest::{Chunk, Document};
use serde::{Deserialize, Serialize};

/// Bumped whenever the on-disk layout of `index.bin` changes.
pub const FORMAT_VERSION: u32 = 1;

/// A source document as recorded in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub source: String,
    pub path: String,
    pub page_count: usize,
    pub title: Option<String>,
    pub chunk_count: usize,
}

impl DocumentRecord {
    pub fn from_document(doc: &Document, chunk_count: usize) -> Self {
        Self {
            id: doc.id.clone(),
            source: doc.source().to_string(),
            path: doc.metadata.file_path.clone(),
            page_count: doc.page_count(),
            title: doc.metadata.title.clone(),
            chunk_count,
        }
    }
}

/// A chunk together with its embedding vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// Human-readable summary written next to the index as `meta.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub format_version: u32,
    pub embedding_model: String,
    pub dimensions: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub document_count: usize,
    pub chunk_count: usize,
    pub documents: Vec<DocumentRecord>,
}

/// The full searchable index. Rebuilt wholesale; there is no incremental
/// add or remove.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    pub format_version: u32,
    pub embedding_model: String,
    pub dimensions: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub documents: Vec<DocumentRecord>,
    pub entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// An index with no documents. Queries against it find nothing.
    pub fn empty(embedding_model: &str, dimensions: usize, chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            embedding_model: embedding_model.to_string(),
            dimensions,
            chunk_size,
            chunk_overlap,
            documents: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn manifest(&self) -> IndexManifest {
        IndexManifest {
            format_version: self.format_version,
            embedding_model: self.embedding_model.clone(),
            dimensions: self.dimensions,
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            document_count: self.documents.len(),
            chunk_count: self.entries.len(),
            documents: self.documents.clone(),
        }
    }
}
