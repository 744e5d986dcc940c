//! Corpus loading: JSON records → embedded, immutable [`KnowledgeStore`].

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use super::{KnowledgeChunk, KnowledgeStore};
use crate::embedding::EmbeddingGateway;
use crate::errors::CoreError;

/// One entry of the corpus file. `vector` is optional; missing vectors are
/// computed at load time.
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub vector: Option<Vec<f32>>,
}

/// Reads a JSON array of [`CorpusRecord`]s from `path` and builds the store.
pub async fn load_corpus(path: &Path, embedder: &dyn EmbeddingGateway) -> Result<KnowledgeStore> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read knowledge corpus at {}", path.display()))?;
    let records: Vec<CorpusRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("knowledge corpus at {} is not valid JSON", path.display()))?;

    let store = build_store(records, embedder)
        .await
        .context("failed to embed knowledge corpus")?;
    info!(
        "Knowledge store ready: {} chunks from {}",
        store.len(),
        path.display()
    );
    Ok(store)
}

/// Embeds every record lacking a vector in a single batched call, then
/// indexes the records in file order. Records whose vector has the wrong
/// length are skipped with a warning.
pub async fn build_store(
    records: Vec<CorpusRecord>,
    embedder: &dyn EmbeddingGateway,
) -> Result<KnowledgeStore, CoreError> {
    let missing: Vec<String> = records
        .iter()
        .filter(|r| r.vector.is_none())
        .map(|r| r.text.clone())
        .collect();
    let mut computed = if missing.is_empty() {
        Vec::new().into_iter()
    } else {
        embedder.embed_batch(&missing).await?.into_iter()
    };

    let mut store = KnowledgeStore::new(embedder.dims());
    for (index, record) in records.into_iter().enumerate() {
        let vector = match record.vector {
            Some(v) => v,
            None => computed
                .next()
                .ok_or_else(|| CoreError::provider("embedding batch ended early"))?,
        };
        let chunk = KnowledgeChunk {
            id: record.id.unwrap_or_else(|| format!("chunk-{index}")),
            title: record.title,
            text: record.text,
            vector,
        };
        let id = chunk.id.clone();
        if let Err(e) = store.insert(chunk) {
            warn!("Skipping knowledge chunk '{id}': {e}");
        }
    }
    Ok(store)
}
