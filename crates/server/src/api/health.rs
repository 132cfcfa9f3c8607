use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use pdfrag_llm::BackendStatus;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub index_loaded: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        index_loaded: state.index_loaded(),
    })
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub backend: BackendStatus,
    pub config: serde_json::Value,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let backend = state.ollama.report(&state.config.required_models()).await;
    Json(StatusResponse {
        backend,
        config: state.config.redacted_summary(),
    })
}
