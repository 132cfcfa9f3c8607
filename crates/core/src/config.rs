use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RagError;
use crate::params::ChunkParams;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_parse<T: std::str::FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub ollama: OllamaConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub storage: StorageConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `PDFRAG_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("PDFRAG_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            ollama: OllamaConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            embedding: EmbeddingConfig::from_env_profiled(p),
            storage: StorageConfig::from_env_profiled(p),
            chunking: ChunkingConfig::from_env_profiled(p),
            retrieval: RetrievalConfig::from_env_profiled(p),
            server: ServerConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Models the backend must serve for indexing and answering.
    pub fn required_models(&self) -> Vec<String> {
        vec![self.ollama.model.clone(), self.ollama.embedding_model.clone()]
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  ollama:      url={}, timeout={}s", self.ollama.base_url, self.ollama.request_timeout_secs);
        tracing::info!("  models:      llm={}, embedding={}", self.ollama.model, self.ollama.embedding_model);
        tracing::info!("  storage:     pdf_dir={}, storage_dir={}", self.storage.pdf_dir.display(), self.storage.storage_dir.display());
        tracing::info!("  chunking:    size={}, overlap={}", self.chunking.chunk_size, self.chunking.chunk_overlap);
        tracing::info!("  retrieval:   top_k={}, threshold={}", self.retrieval.top_k, self.retrieval.similarity_threshold);
    }

    /// Return a view safe for API responses.
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "ollama": {
                "base_url": self.ollama.base_url,
                "model": self.ollama.model,
                "embedding_model": self.ollama.embedding_model,
            },
            "llm": { "temperature": self.llm.temperature, "max_tokens": self.llm.max_tokens },
            "embedding": { "dimensions": self.embedding.dimensions, "batch_size": self.embedding.batch_size },
            "storage": { "pdf_dir": self.storage.pdf_dir, "storage_dir": self.storage.storage_dir },
            "chunking": { "chunk_size": self.chunking.chunk_size, "chunk_overlap": self.chunking.chunk_overlap },
            "retrieval": { "top_k": self.retrieval.top_k, "similarity_threshold": self.retrieval.similarity_threshold },
        })
    }
}

// ── Ollama (local model server) ───────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub embedding_model: String,
    pub request_timeout_secs: u64,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        let base_url = profiled_env_opt(p, "OLLAMA_BASE_URL")
            .or_else(|| profiled_env_opt(p, "OLLAMA_URL"))
            .unwrap_or_else(|| "http://localhost:11434".to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: profiled_env_or(p, "OLLAMA_MODEL", "gemma3:12b"),
            embedding_model: profiled_env_or(p, "OLLAMA_EMBEDDING_MODEL", "nomic-embed-text:latest"),
            request_timeout_secs: profiled_env_parse(p, "OLLAMA_REQUEST_TIMEOUT_SECS", 120),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ── Generation ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            temperature: profiled_env_parse(p, "LLM_TEMPERATURE", 0.1),
            max_tokens: profiled_env_parse(p, "LLM_MAX_TOKENS", 1024),
        }
    }
}

// ── Embedding ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub dimensions: usize,
    pub batch_size: usize,
}

impl EmbeddingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            dimensions: profiled_env_parse(p, "EMBEDDING_DIMENSIONS", 768),
            batch_size: profiled_env_parse::<usize>(p, "EMBEDDING_BATCH_SIZE", 64).max(1),
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory scanned for input PDFs.
    pub pdf_dir: PathBuf,
    /// Directory holding the persisted index.
    pub storage_dir: PathBuf,
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            pdf_dir: PathBuf::from(profiled_env_or(p, "PDF_DIR", "pdfs")),
            storage_dir: PathBuf::from(profiled_env_or(p, "STORAGE_DIR", "storage")),
        }
    }

    /// Create both directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.pdf_dir)?;
        std::fs::create_dir_all(&self.storage_dir)
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            chunk_size: profiled_env_parse(p, "CHUNK_SIZE", ChunkParams::DEFAULT_SIZE),
            chunk_overlap: profiled_env_parse(p, "CHUNK_OVERLAP", ChunkParams::DEFAULT_OVERLAP),
        }
    }

    pub fn params(&self) -> Result<ChunkParams, RagError> {
        ChunkParams::new(self.chunk_size, self.chunk_overlap)
    }
}

// ── Retrieval ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of nearest chunks fetched per question.
    pub top_k: usize,
    /// Cosine similarity below which a retrieved chunk is discarded.
    pub similarity_threshold: f32,
}

impl RetrievalConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            top_k: profiled_env_parse::<usize>(p, "RETRIEVAL_TOP_K", 2).max(1),
            similarity_threshold: profiled_env_parse(p, "SIMILARITY_THRESHOLD", 0.3),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 2,
            similarity_threshold: 0.3,
        }
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "127.0.0.1"),
            port: profiled_env_parse(p, "PORT", 8501),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}
