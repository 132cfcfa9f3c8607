//! Orchestration of the pipeline into two operations: build the index from a
//! directory of PDFs, and answer a question against it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use pdfrag_core::{ChunkParams, Config, RagError};
use pdfrag_index::{DocumentRecord, VectorIndex};
use pdfrag_ingest::{DocumentLoader, Embedder, OllamaEmbedder, PdfExtractor, TextExtractor};
use pdfrag_llm::{LlmProvider, QueryProcessor, QueryResult, QuerySettings};
use serde::Serialize;
use tracing::{info, warn};


/// Summary of one indexing run.
#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub pdf_dir: PathBuf,
    pub storage_dir: PathBuf,
    pub documents: usize,
    pub chunks: usize,
    pub skipped: Vec<SkippedReport>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedReport {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStatus {
    /// An index exists on disk or in memory.
    pub present: bool,
    /// The index is held in memory.
    pub loaded: bool,
    pub storage_dir: PathBuf,
    pub embedding_model: Option<String>,
    pub document_count: usize,
    pub chunk_count: usize,
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
    pub documents: Vec<DocumentRecord>,
}

pub struct RagService {
    config: Config,
    loader: DocumentLoader,
    embedder: Arc<dyn Embedder>,
    query: QueryProcessor,
    index: Option<VectorIndex>,
}

impl RagService {
    pub fn new(
        config: Config,
        embedder: Arc<dyn Embedder>,
        provider: Arc<dyn LlmProvider>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        let query = QueryProcessor::new(embedder.clone(), provider, QuerySettings::from_config(&config));
        Self {
            config,
            loader: DocumentLoader::new(extractor),
            embedder,
            query,
            index: None,
        }
    }

    /// Service wired to the Ollama backends named in `config`.
    pub fn from_config(config: &Config) -> Self {
        let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::from_config(config));
        let provider = pdfrag_llm::providers::create_provider(config);
        Self::new(config.clone(), embedder, provider, Arc::new(PdfExtractor))
    }

    /// `from_config` plus loading any persisted index.
    pub fn open(config: &Config) -> Result<Self, RagError> {
        let mut service = Self::from_config(config);
        service.load_existing()?;
        Ok(service)
    }

    pub fn storage_dir(&self) -> &Path {
        &self.config.storage.storage_dir
    }

    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    /// Load the persisted index if there is one. Returns whether an index is
    /// now in memory.
    pub fn load_existing(&mut self) -> Result<bool, RagError> {
        match pdfrag_index::load(self.storage_dir()) {
            Ok(index) => {
                self.install(index);
                Ok(true)
            }
            Err(RagError::IndexNotFound(path)) => {
                info!("No index at {} yet", path.display());
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Rebuild the index from `pdf_dir` and make it current. Parameters are
    /// validated before any file is read or any backend is called.
    pub async fn index(
        &mut self,
        pdf_dir: &Path,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<IndexReport, RagError> {
        let params = ChunkParams::new(chunk_size, chunk_overlap)?;
        let started = Instant::now();
        info!(
            "Indexing {} (chunk_size={}, chunk_overlap={})",
            pdf_dir.display(),
            params.size(),
            params.overlap()
        );

        let loader = self.loader.clone();
        let dir = pdf_dir.to_path_buf();
        let outcome = tokio::task::spawn_blocking(move || loader.load_dir(&dir))
            .await
            .map_err(|e| RagError::Other(format!("document loading task failed: {e}")))??;

        if outcome.documents.is_empty() {
            warn!("No loadable PDFs in {}; the index will be empty", pdf_dir.display());
        }

        let chunks = pdfrag_ingest::chunk_documents(&outcome.documents, &params);
        let chunk_count = chunks.len();
        let index = pdfrag_index::build(
            self.embedder.as_ref(),
            &outcome.documents,
            chunks,
            &params,
            self.config.embedding.batch_size,
        )
        .await?;

        pdfrag_index::persist(&index, self.storage_dir())?;
        let documents = index.document_count();
        self.index = Some(index);

        let report = IndexReport {
            pdf_dir: pdf_dir.to_path_buf(),
            storage_dir: self.storage_dir().to_path_buf(),
            documents,
            chunks: chunk_count,
            skipped: outcome
                .skipped
                .into_iter()
                .map(|s| SkippedReport {
                    file: s.path.display().to_string(),
                    reason: s.reason,
                })
                .collect(),
            chunk_size: params.size(),
            chunk_overlap: params.overlap(),
            elapsed_ms: started.elapsed().as_millis(),
        };
        info!(
            "Indexed {} documents into {} chunks in {} ms",
            report.documents, report.chunks, report.elapsed_ms
        );
        Ok(report)
    }

    /// Rebuild from the configured PDF directory and chunk parameters.
    pub async fn index_with_defaults(&mut self) -> Result<IndexReport, RagError> {
        let pdf_dir = self.config.storage.pdf_dir.clone();
        let (size, overlap) = (self.config.chunking.chunk_size, self.config.chunking.chunk_overlap);
        self.index(&pdf_dir, size, overlap).await
    }

    /// Answer `question`, loading or building the index first if needed.
    pub async fn query(&mut self, question: &str) -> Result<QueryResult, RagError> {
        if question.trim().is_empty() {
            return Err(RagError::InvalidInput("question must not be empty".into()));
        }
        self.ensure_index().await?;
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| RagError::IndexNotFound(self.config.storage.storage_dir.clone()))?;
        self.query.answer(question, index).await
    }

    pub fn index_status(&self) -> Result<IndexStatus, RagError> {
        let storage_dir = self.storage_dir().to_path_buf();
        if let Some(index) = &self.index {
            return Ok(IndexStatus {
                present: true,
                loaded: true,
                storage_dir,
                embedding_model: Some(index.embedding_model.clone()),
                document_count: index.document_count(),
                chunk_count: index.len(),
                chunk_size: Some(index.chunk_size),
                chunk_overlap: Some(index.chunk_overlap),
                documents: index.documents.clone(),
            });
        }

        match pdfrag_index::load_manifest(&storage_dir) {
            Ok(manifest) => Ok(IndexStatus {
                present: pdfrag_index::index_exists(&storage_dir),
                loaded: false,
                storage_dir,
                embedding_model: Some(manifest.embedding_model),
                document_count: manifest.document_count,
                chunk_count: manifest.chunk_count,
                chunk_size: Some(manifest.chunk_size),
                chunk_overlap: Some(manifest.chunk_overlap),
                documents: manifest.documents,
            }),
            Err(RagError::IndexNotFound(_)) => Ok(IndexStatus {
                present: false,
                loaded: false,
                storage_dir,
                embedding_model: None,
                document_count: 0,
                chunk_count: 0,
                chunk_size: None,
                chunk_overlap: None,
                documents: Vec::new(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn ensure_index(&mut self) -> Result<(), RagError> {
        if self.index.is_some() || self.load_existing()? {
            return Ok(());
        }
        info!("No index found; building one from {}", self.config.storage.pdf_dir.display());
        self.index_with_defaults().await?;
        Ok(())
    }

    fn install(&mut self, index: VectorIndex) {
        let configured = self.embedder.model();
        if index.embedding_model != configured {
            warn!(
                "Index was built with embedding model '{}' but '{}' is configured; re-run indexing if answers look off",
                index.embedding_model, configured
            );
        }
        self.index = Some(index);
    }
}
