//! Question answering over a [`VectorIndex`]: embed the question, retrieve
//! the nearest chunks, and ask the generation model to answer from them.

use std::sync::Arc;

use pdfrag_core::{Config, RagError};
use pdfrag_index::{ScoredChunk, VectorIndex};
use pdfrag_ingest::Embedder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::provider::{LlmProvider, Message};

/// Answer returned when retrieval finds nothing above the threshold.
pub const NO_RELEVANT_CONTEXT: &str = "No relevant information found in the indexed documents.";

const SYSTEM_PROMPT: &str = "You are an expert Q&A system that is trusted around the world.\n\
Always answer the query using the provided context information, and not prior knowledge.\n\
Some rules to follow:\n\
1. Never directly reference the given context in your answer.\n\
2. Avoid statements like 'Based on the context, ...' or 'The context information ...' or anything along those lines.";

const SEPARATOR: &str = "---------------------";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuerySettings {
    pub top_k: usize,
    pub similarity_threshold: f32,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl QuerySettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            similarity_threshold: config.retrieval.similarity_threshold,
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcome {
    Answered,
    NoRelevantContext,
}

/// A chunk that was handed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub chunk_id: String,
    pub source: String,
    pub page: usize,
    pub score: f32,
    pub text: String,
}

impl From<&ScoredChunk> for SourceRef {
    fn from(hit: &ScoredChunk) -> Self {
        Self {
            chunk_id: hit.chunk.id.clone(),
            source: hit.chunk.source.clone(),
            page: hit.chunk.page_number,
            score: hit.score,
            text: hit.chunk.content().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub question: String,
    pub answer: String,
    pub outcome: QueryOutcome,
    /// Ranked best first.
    pub sources: Vec<SourceRef>,
}

impl QueryResult {
    fn no_relevant_context(question: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: NO_RELEVANT_CONTEXT.to_string(),
            outcome: QueryOutcome::NoRelevantContext,
            sources: Vec::new(),
        }
    }
}

pub struct QueryProcessor {
    embedder: Arc<dyn Embedder>,
    provider: Arc<dyn LlmProvider>,
    settings: QuerySettings,
}

impl QueryProcessor {
    pub fn new(embedder: Arc<dyn Embedder>, provider: Arc<dyn LlmProvider>, settings: QuerySettings) -> Self {
        Self {
            embedder,
            provider,
            settings,
        }
    }

    pub async fn answer(&self, question: &str, index: &VectorIndex) -> Result<QueryResult, RagError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::InvalidInput("question must not be empty".into()));
        }

        if index.is_empty() {
            info!("Index is empty; nothing to retrieve");
            return Ok(QueryResult::no_relevant_context(question));
        }

        let hits = self.retrieve(question, index).await?;
        if hits.is_empty() {
            info!(
                "No chunk scored above {:.2} for query",
                self.settings.similarity_threshold
            );
            return Ok(QueryResult::no_relevant_context(question));
        }

        let messages = build_messages(question, &hits);
        let answer = self
            .provider
            .complete(messages, self.settings.temperature, self.settings.max_tokens)
            .await?;

        info!("Answered query from {} retrieved chunks", hits.len());
        Ok(QueryResult {
            question: question.to_string(),
            answer: answer.trim().to_string(),
            outcome: QueryOutcome::Answered,
            sources: hits.iter().map(SourceRef::from).collect(),
        })
    }

    /// Top-k chunks scoring at or above the similarity threshold.
    pub async fn retrieve(&self, question: &str, index: &VectorIndex) -> Result<Vec<ScoredChunk>, RagError> {
        let mut vectors = self.embedder.embed_batch(&[question]).await?;
        let query_vector = vectors
            .pop()
            .ok_or_else(|| RagError::Backend("embedding backend returned no vector for the query".into()))?;

        let hits = index.search(&query_vector, self.settings.top_k)?;
        for hit in &hits {
            debug!("retrieved {} score={:.3}", hit.chunk.id, hit.score);
        }
        Ok(hits
            .into_iter()
            .filter(|hit| hit.score >= self.settings.similarity_threshold)
            .collect())
    }
}

/// Render retrieved chunks as labelled context blocks.
fn context_block(hits: &[ScoredChunk]) -> String {
    hits.iter()
        .map(|hit| {
            format!(
                "source: {}\npage: {}\n\n{}",
                hit.chunk.source,
                hit.chunk.page_number,
                hit.chunk.content()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn build_messages(question: &str, hits: &[ScoredChunk]) -> Vec<Message> {
    let user = format!(
        "Context information is below.\n{SEPARATOR}\n{}\n{SEPARATOR}\n\
         Given the context information and not prior knowledge, answer the query.\n\
         Query: {question}\nAnswer: ",
        context_block(hits)
    );
    vec![Message::system(SYSTEM_PROMPT), Message::user(user)]
}
