use pdfrag_core::{ChunkParams, RagError};
use pdfrag_ingest::{embed_in_batches, Chunk, Document, Embedder};
use tracing::{info, warn};

use crate::index::{DocumentRecord, IndexEntry, VectorIndex};

/// Embed every chunk and assemble a fresh index.
///
/// `chunks` must come from `documents`; the document list is recorded for
/// status reporting. An unreachable embedding backend fails the whole
/// build with `RagError::BackendUnavailable`.
pub async fn build(
    embedder: &dyn Embedder,
    documents: &[Document],
    chunks: Vec<Chunk>,
    params: &ChunkParams,
    batch_size: usize,
) -> Result<VectorIndex, RagError> {
    let mut index = VectorIndex::empty(
        embedder.model(),
        embedder.dimensions(),
        params.size(),
        params.overlap(),
    );

    index.documents = documents
        .iter()
        .map(|doc| {
            let count = chunks.iter().filter(|c| c.document_id == doc.id).count();
            DocumentRecord::from_document(doc, count)
        })
        .collect();

    if chunks.is_empty() {
        warn!("No chunks to index; writing an empty index");
        return Ok(index);
    }

    let texts: Vec<&str> = chunks.iter().map(|c| c.content()).collect();
    let vectors = embed_in_batches(embedder, &texts, batch_size).await?;

    if let Some(bad) = vectors.iter().find(|v| v.len() != index.dimensions) {
        return Err(RagError::Backend(format!(
            "embedding backend returned {} dimensions, expected {}",
            bad.len(),
            index.dimensions
        )));
    }

    index.entries = chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, vector)| IndexEntry { chunk, vector })
        .collect();

    info!(
        "Built index: {} chunks from {} documents ({} dims)",
        index.len(),
        index.document_count(),
        index.dimensions
    );
    Ok(index)
}
