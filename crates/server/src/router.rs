//! HTTP router construction.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::api;
use crate::state::AppState;

const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.server.cors_origin);

    Router::new()
        .route("/health", get(api::health::health))
        .route("/api/status", get(api::health::status))
        .route(
            "/api/documents",
            get(api::documents::list).post(api::documents::upload),
        )
        .route("/api/documents/{name}", delete(api::documents::remove))
        .route(
            "/api/index",
            get(api::index::status).post(api::index::rebuild),
        )
        .route("/api/query", post(api::query::query))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            warn!("Invalid CORS_ORIGIN '{}'; falling back to permissive CORS", origin);
            CorsLayer::permissive()
        }
    }
}
