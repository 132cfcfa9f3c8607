//! Ollama server probe: is it running, which models are installed, and are
//! the configured ones among them.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::provider::LlmError;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct OllamaStatus {
    client: reqwest::Client,
    base_url: String,
}

/// Snapshot of backend health for the CLI and the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendStatus {
    pub base_url: String,
    pub running: bool,
    pub version: Option<String>,
    /// Required model name -> installed.
    pub required_models: BTreeMap<String, bool>,
    pub available_models: Vec<String>,
    /// `/api/show` details for the required models that are installed.
    #[serde(default)]
    pub model_details: BTreeMap<String, ModelDetails>,
}

/// The `details` block of an `/api/show` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDetails {
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub parameter_size: Option<String>,
    #[serde(default)]
    pub quantization_level: Option<String>,
}

impl ModelDetails {
    /// Short human label such as `12.2B Q4_K_M`.
    pub fn label(&self) -> String {
        [&self.parameter_size, &self.quantization_level]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl BackendStatus {
    pub fn missing_models(&self) -> Vec<&str> {
        self.required_models
            .iter()
            .filter(|(_, &ok)| !ok)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Running with every required model installed.
    pub fn is_ready(&self) -> bool {
        self.running && self.required_models.values().all(|&ok| ok)
    }
}

#[derive(Deserialize)]
struct VersionResponse {
    version: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

#[derive(Deserialize)]
struct ShowResponse {
    #[serde(default)]
    details: ModelDetails,
}

impl OllamaStatus {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(PROBE_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn version(&self) -> Result<String, LlmError> {
        let url = format!("{}/api/version", self.base_url);
        debug!("Ollama probe {}", url);
        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;
        let parsed: VersionResponse = response.json().await?;
        Ok(parsed.version)
    }

    pub async fn is_running(&self) -> bool {
        self.version().await.is_ok()
    }

    /// Names of installed models, as reported by `/api/tags`.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        debug!("Ollama probe {}", url);
        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;
        let parsed: TagsResponse = response.json().await?;
        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }

    /// Model details from `/api/show`; `None` when the model is not installed.
    pub async fn model_info(&self, model: &str) -> Result<Option<ModelDetails>, LlmError> {
        let url = format!("{}/api/show", self.base_url);
        debug!("Ollama probe {} ({})", url, model);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "name": model, "model": model }))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response).await?;
        let parsed: ShowResponse = response.json().await?;
        Ok(Some(parsed.details))
    }

    pub async fn check_required_models(&self, required: &[String]) -> Result<BTreeMap<String, bool>, LlmError> {
        let available = self.list_models().await?;
        Ok(match_models(required, &available))
    }

    /// Full report. Never fails: an unreachable server yields `running: false`.
    pub async fn report(&self, required: &[String]) -> BackendStatus {
        let mut status = BackendStatus {
            base_url: self.base_url.clone(),
            running: false,
            version: None,
            required_models: required.iter().map(|m| (m.clone(), false)).collect(),
            available_models: Vec::new(),
            model_details: BTreeMap::new(),
        };

        if !self.is_running().await {
            debug!("Ollama not reachable at {}", self.base_url);
            return status;
        }
        status.running = true;
        status.version = self.version().await.ok();

        match self.check_required_models(required).await {
            Ok(map) => status.required_models = map,
            Err(e) => warn!("Could not list Ollama models: {}", e),
        }
        status.available_models = self.list_models().await.unwrap_or_default();

        for (model, _) in status.required_models.iter().filter(|(_, &ok)| ok) {
            match self.model_info(model).await {
                Ok(Some(details)) => {
                    status.model_details.insert(model.clone(), details);
                }
                Ok(None) => {}
                Err(e) => debug!("No details for {}: {}", model, e),
            }
        }
        status
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::ApiError { status, body })
}

/// A model counts as installed when the names are equal, or equal once the
/// implicit `:latest` tag is added to whichever side lacks a tag.
pub fn model_available(required: &str, available: &[String]) -> bool {
    let normalized = with_tag(required);
    available.iter().any(|name| name == required || with_tag(name) == normalized)
}

fn with_tag(name: &str) -> String {
    if name.contains(':') {
        name.to_string()
    } else {
        format!("{name}:latest")
    }
}

fn match_models(required: &[String], available: &[String]) -> BTreeMap<String, bool> {
    required
        .iter()
        .map(|m| (m.clone(), model_available(m, available)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_and_implicit_latest_tags_match() {
        let available = names(&["gemma3:12b", "nomic-embed-text:latest"]);
        assert!(model_available("gemma3:12b", &available));
        assert!(model_available("nomic-embed-text", &available));
        assert!(model_available("nomic-embed-text:latest", &available));
        assert!(!model_available("gemma3", &available));
        assert!(!model_available("gemma3:4b", &available));
    }

    #[test]
    fn required_map_lists_every_model() {
        let required = names(&["gemma3:12b", "nomic-embed-text:latest"]);
        let map = match_models(&required, &names(&["gemma3:12b"]));
        assert_eq!(map.len(), 2);
        assert!(map["gemma3:12b"]);
        assert!(!map["nomic-embed-text:latest"]);
    }

    #[test]
    fn readiness_and_missing() {
        let status = BackendStatus {
            base_url: "http://localhost:11434".into(),
            running: true,
            version: Some("0.6.0".into()),
            required_models: [("a".to_string(), true), ("b".to_string(), false)].into_iter().collect(),
            available_models: names(&["a:latest"]),
            model_details: BTreeMap::new(),
        };
        assert!(!status.is_ready());
        assert_eq!(status.missing_models(), vec!["b"]);
    }

    #[test]
    fn show_details_are_parsed_and_labelled() {
        let body = r#"{
            "modelfile": "FROM gemma3",
            "details": { "format": "gguf", "family": "gemma3", "parameter_size": "12.2B", "quantization_level": "Q4_K_M" }
        }"#;
        let parsed: ShowResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.details.family.as_deref(), Some("gemma3"));
        assert_eq!(parsed.details.label(), "12.2B Q4_K_M");

        let bare: ShowResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(bare.details, ModelDetails::default());
        assert_eq!(bare.details.label(), "");
    }

    #[tokio::test]
    async fn unreachable_server_reports_not_running() {
        let probe = OllamaStatus::new("http://127.0.0.1:9/");
        let required = names(&["gemma3:12b"]);
        let status = probe.report(&required).await;
        assert!(!status.running);
        assert!(!status.is_ready());
        assert_eq!(status.missing_models(), vec!["gemma3:12b"]);
        assert!(status.model_details.is_empty());
        assert_eq!(status.base_url, "http://127.0.0.1:9");
    }

    #[tokio::test]
    async fn unreachable_server_fails_each_probe() {
        let probe = OllamaStatus::new("http://127.0.0.1:9");
        assert!(!probe.is_running().await);
        assert!(matches!(probe.version().await, Err(LlmError::HttpError(_))));
        assert!(matches!(probe.list_models().await, Err(LlmError::HttpError(_))));
        assert!(matches!(probe.model_info("gemma3:12b").await, Err(LlmError::HttpError(_))));
        let err = probe.check_required_models(&names(&["gemma3:12b"])).await.unwrap_err();
        let err: pdfrag_core::RagError = err.into();
        assert!(err.is_backend_unavailable(), "got {err:?}");
    }
}
