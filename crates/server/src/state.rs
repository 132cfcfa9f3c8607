use std::sync::atomic::{AtomicBool, Ordering};

use pdfrag_core::Config;
use pdfrag_llm::OllamaStatus;
use pdfrag_service::RagService;
use tokio::sync::Mutex;

pub struct AppState {
    pub config: Config,
    /// Indexing and querying are serialised through this lock.
    pub service: Mutex<RagService>,
    pub ollama: OllamaStatus,
    /// Mirrors `RagService::is_loaded` so `/health` never waits on the lock.
    index_loaded: AtomicBool,
}

impl AppState {
    pub fn new(config: Config, service: RagService) -> Self {
        let ollama = OllamaStatus::new(&config.ollama.base_url);
        let index_loaded = AtomicBool::new(service.is_loaded());
        Self {
            config,
            service: Mutex::new(service),
            ollama,
            index_loaded,
        }
    }

    pub fn index_loaded(&self) -> bool {
        self.index_loaded.load(Ordering::Acquire)
    }

    /// Record the service's load state; call while still holding the lock.
    pub fn sync_index_loaded(&self, service: &RagService) {
        self.index_loaded.store(service.is_loaded(), Ordering::Release);
    }
}
