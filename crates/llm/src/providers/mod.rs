pub mod ollama;

use std::sync::Arc;

use pdfrag_core::Config;

use crate::provider::LlmProvider;

/// Build the generation backend named by the config.
pub fn create_provider(config: &Config) -> Arc<dyn LlmProvider> {
    Arc::new(ollama::OllamaProvider::new(
        config.ollama.base_url.clone(),
        config.ollama.model.clone(),
        config.ollama.request_timeout(),
    ))
}
