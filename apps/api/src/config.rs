use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Tunables for the retrieve → augment → generate pipeline.
///
/// Defaults were tuned against `text-embedding-3-small`; re-validate them when
/// switching embedding models.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalSettings {
    /// Chunks must score strictly above this cosine similarity.
    pub similarity_threshold: f32,
    pub top_k: usize,
    /// Upper bound on the characters of snippet text placed into a prompt.
    pub context_char_budget: usize,
    /// How many recent conversation turns reach the prompt.
    pub recent_turn_limit: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            top_k: 5,
            context_char_budget: 6000,
            recent_turn_limit: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchingSettings {
    /// Minimum best-match similarity for a skill to count as covered.
    pub skill_threshold: f32,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            skill_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub model: String,
    pub dims: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dims: 1536,
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
    pub matching: MatchingSettings,
    pub knowledge_corpus_path: Option<PathBuf>,
    /// Transport-level attempts made by the HTTP provider adapters.
    pub provider_max_attempts: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let retrieval_defaults = RetrievalSettings::default();
        let embedding_defaults = EmbeddingSettings::default();

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            embedding: EmbeddingSettings {
                model: std::env::var("EMBEDDING_MODEL").unwrap_or(embedding_defaults.model),
                dims: parse_env("EMBEDDING_DIMS", embedding_defaults.dims)?,
            },
            retrieval: RetrievalSettings {
                similarity_threshold: parse_env(
                    "RAG_SIMILARITY_THRESHOLD",
                    retrieval_defaults.similarity_threshold,
                )?,
                top_k: parse_env("RAG_TOP_K", retrieval_defaults.top_k)?,
                context_char_budget: parse_env(
                    "RAG_CONTEXT_CHAR_BUDGET",
                    retrieval_defaults.context_char_budget,
                )?,
                recent_turn_limit: parse_env(
                    "RECENT_TURN_LIMIT",
                    retrieval_defaults.recent_turn_limit,
                )?,
            },
            matching: MatchingSettings {
                skill_threshold: parse_env(
                    "SKILL_MATCH_THRESHOLD",
                    MatchingSettings::default().skill_threshold,
                )?,
            },
            knowledge_corpus_path: std::env::var("KNOWLEDGE_CORPUS_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            provider_max_attempts: parse_env("PROVIDER_MAX_ATTEMPTS", 3)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads an optional variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
