//! Directory scanning and per-file PDF loading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pdfrag_core::RagError;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::clean::{clean_text, extract_metadata};
use super::{Document, DocumentMetadata, ExtractionError, PdfExtractor, TextExtractor};

/// Separator placed between pages in `Document::text`.
const PAGE_SEPARATOR: &str = "\n\n";

/// A file that was found but could not be turned into a document.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Documents loaded from a directory, plus the files that were skipped.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub documents: Vec<Document>,
    pub skipped: Vec<SkippedFile>,
}

/// Loads PDFs from disk through a [`TextExtractor`].
#[derive(Clone)]
pub struct DocumentLoader {
    extractor: Arc<dyn TextExtractor>,
}

impl DocumentLoader {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self { extractor }
    }

    /// Loader backed by the real PDF parser.
    pub fn pdf() -> Self {
        Self::new(Arc::new(PdfExtractor))
    }

    /// All `.pdf` files directly inside `dir`, sorted by file name.
    pub fn pdf_files(dir: &Path) -> Result<Vec<PathBuf>, RagError> {
        if !dir.is_dir() {
            return Err(RagError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("PDF directory not found: {}", dir.display()),
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(io::Error::from)?;
            let path = entry.path();
            if path.is_file() && is_pdf(path) {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }

    /// Load a single PDF. I/O failures and parse failures are kept apart so
    /// the caller can abort on the former and skip the latter.
    pub fn load_file(&self, path: &Path) -> Result<Document, ExtractionError> {
        let bytes = fs::read(path)?;
        let pages = self.extractor.extract(&bytes)?;

        let mut text = String::new();
        let mut page_boundaries = Vec::with_capacity(pages.len());
        for page in &pages {
            // Blank or missing pages still occupy a page number.
            while page_boundaries.len() + 1 < page.page_number {
                page_boundaries.push(text.len());
            }
            let cleaned = clean_text(&page.text);
            if cleaned.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push_str(PAGE_SEPARATOR);
            }
            page_boundaries.push(text.len());
            text.push_str(&cleaned);
        }
        let last_page = pages.iter().map(|p| p.page_number).max().unwrap_or(0);
        while page_boundaries.len() < last_page {
            page_boundaries.push(text.len());
        }
        if text.is_empty() {
            return Err(ExtractionError::Empty);
        }

        let (title, authors) = extract_metadata(&text);
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Document {
            id: format!("{:x}", Sha256::digest(&bytes)),
            path: path.to_path_buf(),
            text,
            page_boundaries,
            metadata: DocumentMetadata {
                source,
                file_path: path.display().to_string(),
                file_size: bytes.len() as u64,
                file_type: "pdf".to_string(),
                title,
                authors,
            },
        })
    }

    /// Load every PDF in `dir`. Unparseable or empty PDFs are skipped with a
    /// warning; a missing directory or an unreadable file aborts the batch.
    pub fn load_dir(&self, dir: &Path) -> Result<LoadOutcome, RagError> {
        let files = Self::pdf_files(dir)?;
        info!("Found {} PDF files in {}", files.len(), dir.display());

        let mut outcome = LoadOutcome::default();
        for path in files {
            info!("Processing {}...", path.display());
            match self.load_file(&path) {
                Ok(doc) => {
                    info!(
                        "Loaded '{}': {} pages, {} chars",
                        doc.source(),
                        doc.page_count(),
                        doc.text.len()
                    );
                    outcome.documents.push(doc);
                }
                Err(ExtractionError::Io(e)) => {
                    return Err(RagError::Io(io::Error::new(
                        e.kind(),
                        format!("failed to read {}: {e}", path.display()),
                    )));
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    outcome.skipped.push(SkippedFile {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(outcome)
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
