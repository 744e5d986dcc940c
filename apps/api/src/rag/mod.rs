//! RAG Orchestrator: retrieve → augment → generate → sanitize.
//!
//! Per request the pipeline walks a fixed state machine:
//!
//! ```text
//! EMBED_QUERY → RETRIEVE ─┬─ no hits ──→ ANSWER_WITHOUT_GROUNDING ─┬→ GENERATE → SANITIZE → DONE
//!                         └─ hits ─────→ BUILD_CONTEXT ────────────┘
//! ```
//!
//! Retrieval is best-effort: a provider failure while embedding the query
//! jumps straight to ANSWER_WITHOUT_GROUNDING. A dimension mismatch is a
//! configuration bug and aborts the request, as does any generation failure.
//! Every visited state is recorded in [`RagAnswer::trace`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RetrievalSettings;
use crate::embedding::EmbeddingGateway;
use crate::errors::CoreError;
use crate::knowledge::{KnowledgeStore, RetrievalResult, RetrievedChunk};
use crate::llm_client::{GenerationGateway, PromptContext};
use crate::models::chat::{recent_turns, ChatTurn};
use crate::sanitize::sanitize;

pub mod context;
pub mod prompts;

use context::fit_to_budget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RagStage {
    EmbedQuery,
    Retrieve,
    AnswerWithoutGrounding,
    BuildContext,
    Generate,
    Sanitize,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RagAnswer {
    pub answer: String,
    /// Hits whose text reached the prompt, best first.
    pub sources: Vec<RetrievedChunk>,
    pub grounded: bool,
    pub trace: Vec<RagStage>,
}

#[derive(Clone)]
pub struct RagOrchestrator {
    embedder: Arc<dyn EmbeddingGateway>,
    store: Arc<KnowledgeStore>,
    generator: Arc<dyn GenerationGateway>,
    settings: RetrievalSettings,
}

impl RagOrchestrator {
    pub fn new(
        embedder: Arc<dyn EmbeddingGateway>,
        store: Arc<KnowledgeStore>,
        generator: Arc<dyn GenerationGateway>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            embedder,
            store,
            generator,
            settings,
        }
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    /// Answers `query`, grounded in the knowledge store when it has anything
    /// relevant. `history` is trimmed to the configured recent-turn limit.
    pub async fn answer(&self, query: &str, history: &[ChatTurn]) -> Result<RagAnswer, CoreError> {
        let mut trace = vec![RagStage::EmbedQuery];

        let hits = match self.embedder.embed(query).await {
            Ok(vector) => {
                trace.push(RagStage::Retrieve);
                self.store
                    .search(&vector, self.settings.similarity_threshold, self.settings.top_k)?
            }
            Err(CoreError::Provider(message)) => {
                warn!("Query embedding failed, answering without grounding: {message}");
                RetrievalResult::new()
            }
            Err(e) => return Err(e),
        };
        debug!("Retrieved {} chunks for query", hits.len());

        let context = fit_to_budget(&hits, self.settings.context_char_budget);
        let (system_instructions, grounded) = if context.is_empty() {
            trace.push(RagStage::AnswerWithoutGrounding);
            (prompts::ungrounded_system(), false)
        } else {
            trace.push(RagStage::BuildContext);
            (prompts::grounded_system(), true)
        };

        let prompt = PromptContext {
            system_instructions,
            retrieved_snippets: context.snippets,
            user_query: query.to_string(),
            recent_turns: recent_turns(history, self.settings.recent_turn_limit).to_vec(),
        };
        let answer = self.generate_and_sanitize(&prompt, &mut trace).await?;

        Ok(RagAnswer {
            answer,
            sources: context.kept,
            grounded,
            trace,
        })
    }

    /// Open-ended generation with no retrieval, for messages no specialised
    /// handler claims.
    pub async fn answer_without_retrieval(
        &self,
        query: &str,
        history: &[ChatTurn],
    ) -> Result<RagAnswer, CoreError> {
        let mut trace = Vec::new();
        let prompt = PromptContext {
            system_instructions: prompts::open_chat_system(),
            retrieved_snippets: Vec::new(),
            user_query: query.to_string(),
            recent_turns: recent_turns(history, self.settings.recent_turn_limit).to_vec(),
        };
        let answer = self.generate_and_sanitize(&prompt, &mut trace).await?;
        Ok(RagAnswer {
            answer,
            sources: Vec::new(),
            grounded: false,
            trace,
        })
    }

    async fn generate_and_sanitize(
        &self,
        prompt: &PromptContext,
        trace: &mut Vec<RagStage>,
    ) -> Result<String, CoreError> {
        trace.push(RagStage::Generate);
        let raw = self.generator.generate(prompt).await?;

        trace.push(RagStage::Sanitize);
        let answer = sanitize(&raw);
        if answer.is_empty() {
            return Err(CoreError::EmptyGeneration);
        }

        trace.push(RagStage::Done);
        Ok(answer)
    }
}
