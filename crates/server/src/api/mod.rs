pub mod documents;
pub mod health;
pub mod index;
pub mod query;

use axum::http::StatusCode;
use pdfrag_core::RagError;
use tracing::{error, warn};

pub type ApiError = (StatusCode, String);

/// Map a service error onto the HTTP status the client should see.
pub fn rag_error(err: RagError) -> ApiError {
    let status = match &err {
        RagError::InvalidInput(_) | RagError::InvalidChunkParams { .. } => StatusCode::BAD_REQUEST,
        RagError::IndexNotFound(_) => StatusCode::NOT_FOUND,
        RagError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        RagError::Backend(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("{}", err);
    } else {
        warn!("{}", err);
    }
    (status, err.to_string())
}
