use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use pdfrag_llm::QueryResult;
use serde::Deserialize;

use super::{rag_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResult>, ApiError> {
    let mut service = state.service.lock().await;
    let result = service.query(&req.question).await;
    state.sync_index_loaded(&service);
    result.map(Json).map_err(rag_error)
}
