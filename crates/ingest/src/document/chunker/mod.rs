//! Token-window chunking engine.
//!
//! Splits a document's text into ordered, overlapping chunks of at most
//! `size` whitespace tokens. Adjacent chunks share exactly `overlap`
//! tokens, windows prefer to end on a sentence boundary, and every chunk
//! is an exact slice of the document text so the full text can be rebuilt
//! from the chunk sequence.

mod helpers;
mod types;

#[cfg(test)]
mod tests;

use pdfrag_core::ChunkParams;
use tracing::info;

use super::Document;
use helpers::{snap_to_sentence, tokenize};

pub use types::Chunk;

/// Chunk a single document. Deterministic for identical text and params.
pub fn chunk_document(doc: &Document, params: &ChunkParams) -> Vec<Chunk> {
    let text = doc.text.as_str();
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Vec::new();
    }

    let total = tokens.len();
    let size = params.size();
    let overlap = params.overlap();

    // Token windows [start, end).
    let mut windows: Vec<(usize, usize)> = Vec::new();
    let mut start = 0usize;
    loop {
        let mut end = (start + size).min(total);
        if end < total {
            end = snap_to_sentence(text, &tokens, start, end, overlap);
        }
        windows.push((start, end));
        if end >= total {
            break;
        }
        start = end - overlap;
    }

    windows
        .iter()
        .enumerate()
        .map(|(index, &(first, last))| {
            let byte_start = if index == 0 { 0 } else { tokens[first].start };
            let byte_end = if last >= total { text.len() } else { tokens[last].start };
            Chunk {
                id: format!("{}:{}", doc.id, index),
                document_id: doc.id.clone(),
                source: doc.source().to_string(),
                index,
                text: text[byte_start..byte_end].to_string(),
                start: byte_start,
                end: byte_end,
                token_count: last - first,
                page_number: doc.page_at(tokens[first].start),
            }
        })
        .collect()
}

/// Chunk a batch of documents, preserving document order.
pub fn chunk_documents(docs: &[Document], params: &ChunkParams) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = docs
        .iter()
        .flat_map(|doc| chunk_document(doc, params))
        .collect();
    info!(
        "Created {} chunks from {} documents (size={}, overlap={})",
        chunks.len(),
        docs.len(),
        params.size(),
        params.overlap()
    );
    chunks
}
