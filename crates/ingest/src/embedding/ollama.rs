use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{Embedder, EmbeddingError};

/// Embedder backed by a local Ollama instance.
pub struct OllamaEmbedder {
    client: Client,
    url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    pub fn new(url: String, model: String, dimensions: usize, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.trim_end_matches('/').to_string(),
            model,
            dimensions,
        }
    }

    pub fn from_config(config: &pdfrag_core::Config) -> Self {
        Self::new(
            config.ollama.base_url.clone(),
            config.ollama.embedding_model.clone(),
            config.embedding.dimensions,
            config.ollama.request_timeout(),
        )
    }
}

#[derive(Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.url);
        debug!("Ollama embed request to {} ({} inputs)", url, texts.len());

        let request = OllamaEmbedRequest {
            model: &self.model,
            input: texts,
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let parsed: OllamaEmbedResponse = response.json().await?;

        if parsed.embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: parsed.embeddings.len(),
            });
        }
        if let Some(bad) = parsed.embeddings.iter().find(|v| v.len() != self.dimensions) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: bad.len(),
            });
        }

        Ok(parsed.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfrag_core::RagError;

    #[tokio::test]
    async fn empty_batch_makes_no_request() {
        // Port 9 (discard) is never an Ollama server; no request must be sent.
        let embedder = OllamaEmbedder::new(
            "http://127.0.0.1:9".into(),
            "nomic-embed-text".into(),
            768,
            Duration::from_secs(1),
        );
        assert!(embedder.embed_batch(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_server_is_backend_unavailable() {
        let embedder = OllamaEmbedder::new(
            "http://127.0.0.1:9/".into(),
            "nomic-embed-text".into(),
            768,
            Duration::from_secs(2),
        );
        let err = embedder.embed_batch(&["hello"]).await.unwrap_err();
        let rag: RagError = err.into();
        assert!(rag.is_backend_unavailable(), "got {rag:?}");
    }

    #[test]
    fn request_body_shape() {
        let texts = ["a", "b"];
        let body = serde_json::to_value(OllamaEmbedRequest { model: "m", input: &texts }).unwrap();
        assert_eq!(body, serde_json::json!({ "model": "m", "input": ["a", "b"] }));
    }
}
