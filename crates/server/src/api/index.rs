use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use pdfrag_service::{IndexReport, IndexStatus};
use serde::Deserialize;
use tracing::info;

use super::{rag_error, ApiError};
use crate::state::AppState;

pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<IndexStatus>, ApiError> {
    let service = state.service.lock().await;
    service.index_status().map(Json).map_err(rag_error)
}

#[derive(Debug, Default, Deserialize)]
pub struct RebuildRequest {
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
}

/// Rebuild the index from the configured PDF directory. The body is optional;
/// omitted parameters fall back to the configured defaults.
pub async fn rebuild(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<IndexReport>, ApiError> {
    let req = parse_rebuild_request(&body)?;
    let size = req.chunk_size.unwrap_or(state.config.chunking.chunk_size);
    let overlap = req.chunk_overlap.unwrap_or(state.config.chunking.chunk_overlap);
    info!("Rebuild requested (chunk_size={}, chunk_overlap={})", size, overlap);

    let mut service = state.service.lock().await;
    let result = service.index(&state.config.storage.pdf_dir, size, overlap).await;
    state.sync_index_loaded(&service);
    result.map(Json).map_err(rag_error)
}

fn parse_rebuild_request(body: &[u8]) -> Result<RebuildRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RebuildRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid rebuild request: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_means_defaults() {
        let req = parse_rebuild_request(b"").unwrap();
        assert_eq!(req.chunk_size, None);
        assert_eq!(req.chunk_overlap, None);
        assert!(parse_rebuild_request(b" \n").is_ok());
    }

    #[test]
    fn partial_body_keeps_given_fields() {
        let req = parse_rebuild_request(br#"{"chunk_size": 256}"#).unwrap();
        assert_eq!(req.chunk_size, Some(256));
        assert_eq!(req.chunk_overlap, None);
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = parse_rebuild_request(b"{chunk_size").unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
