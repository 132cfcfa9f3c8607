//! JSON HTTP API over the RAG service.

pub mod api;
pub mod router;
pub mod state;

use std::sync::Arc;

use tracing::info;

pub use router::build_router;
pub use state::AppState;

/// Bind `host:port` and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
