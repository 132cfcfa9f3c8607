//! Management of the input PDF directory.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Multipart, Path as UrlPath, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use pdfrag_ingest::DocumentLoader;
use serde::Serialize;
use tokio::fs;
use tracing::info;

use super::{rag_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PdfFile {
    pub name: String,
    pub size_bytes: u64,
    /// RFC 3339 modification time.
    pub modified: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub pdf_dir: String,
    pub documents: Vec<PdfFile>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub saved: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: String,
}

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<DocumentListResponse>, ApiError> {
    let dir = &state.config.storage.pdf_dir;
    let mut documents = Vec::new();

    if dir.is_dir() {
        for path in DocumentLoader::pdf_files(dir).map_err(rag_error)? {
            let meta = fs::metadata(&path).await.map_err(internal)?;
            documents.push(PdfFile {
                name: file_name(&path),
                size_bytes: meta.len(),
                modified: meta
                    .modified()
                    .ok()
                    .map(|t| DateTime::<Utc>::from(t).to_rfc3339()),
            });
        }
    }

    Ok(Json(DocumentListResponse {
        pdf_dir: dir.display().to_string(),
        documents,
    }))
}

/// Save every uploaded `.pdf` part into the PDF directory. The index is not
/// rebuilt; call `POST /api/index` afterwards.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let dir = &state.config.storage.pdf_dir;
    fs::create_dir_all(dir).await.map_err(internal)?;

    let mut saved = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Multipart error: {e}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        validate_pdf_name(&name)?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read {name}: {e}")))?;
        fs::write(dir.join(&name), &bytes).await.map_err(internal)?;
        info!("Saved upload '{}' ({} bytes)", name, bytes.len());
        saved.push(name);
    }

    if saved.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No PDF file provided".to_string()));
    }
    Ok(Json(UploadResponse { saved }))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    UrlPath(name): UrlPath<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    validate_pdf_name(&name)?;
    let path = state.config.storage.pdf_dir.join(&name);
    if !path.is_file() {
        return Err((StatusCode::NOT_FOUND, format!("No such document: {name}")));
    }
    fs::remove_file(&path).await.map_err(internal)?;
    info!("Deleted document '{}'", name);
    Ok(Json(DeleteResponse { deleted: name }))
}

/// Accept only a bare file name ending in `.pdf`.
fn validate_pdf_name(name: &str) -> Result<(), ApiError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if !plain {
        return Err((StatusCode::BAD_REQUEST, format!("Invalid file name: {name:?}")));
    }
    let is_pdf = Path::new(name)
        .extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err((StatusCode::BAD_REQUEST, format!("Only .pdf files are accepted: {name}")));
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn internal(err: std::io::Error) -> ApiError {
    rag_error(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_pdf_names() {
        assert!(validate_pdf_name("report.pdf").is_ok());
        assert!(validate_pdf_name("Annual Report 2024.PDF").is_ok());
    }

    #[test]
    fn rejects_paths_and_other_types() {
        for bad in ["", "..", "../secret.pdf", "dir/a.pdf", "a\\b.pdf", "notes.txt", "pdf"] {
            let err = validate_pdf_name(bad).unwrap_err();
            assert_eq!(err.0, StatusCode::BAD_REQUEST, "{bad:?}");
        }
    }
}
