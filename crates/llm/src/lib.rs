pub mod provider;
pub mod providers;
pub mod query;
pub mod status;

pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::ollama::OllamaProvider;
pub use query::{QueryOutcome, QueryProcessor, QueryResult, QuerySettings, SourceRef, NO_RELEVANT_CONTEXT};
pub use status::{BackendStatus, ModelDetails, OllamaStatus};
