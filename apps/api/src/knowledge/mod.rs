//! Vector retrieval store: brute-force cosine search over an immutable corpus.
//!
//! The store is built once at startup (see [`seed`]) and then shared behind an
//! `Arc` by every request. Nothing mutates it afterwards, so searches run
//! concurrently without locks.

use serde::{Deserialize, Serialize};

use crate::embedding::cosine_similarity;
use crate::errors::CoreError;

pub mod seed;

pub use seed::{build_store, load_corpus, CorpusRecord};

/// One indexed piece of career knowledge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    pub id: String,
    pub title: String,
    pub text: String,
    pub vector: Vec<f32>,
}

/// A search hit. `similarity` is cosine, in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub title: String,
    pub text: String,
    pub similarity: f32,
}

/// Hits sorted by descending similarity, at most `top_k` long. Empty means
/// "no grounding available", not failure.
pub type RetrievalResult = Vec<RetrievedChunk>;

#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    dims: usize,
    chunks: Vec<KnowledgeChunk>,
}

impl KnowledgeStore {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            chunks: Vec::new(),
        }
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[KnowledgeChunk] {
        &self.chunks
    }

    /// Adds a chunk, rejecting vectors of the wrong dimensionality.
    pub fn insert(&mut self, chunk: KnowledgeChunk) -> Result<(), CoreError> {
        if chunk.vector.len() != self.dims {
            return Err(CoreError::DimensionMismatch {
                expected: self.dims,
                actual: chunk.vector.len(),
            });
        }
        self.chunks.push(chunk);
        Ok(())
    }

    /// Nearest neighbours of `query` scoring strictly above `threshold`.
    ///
    /// Equal similarities keep insertion order. An empty corpus yields an
    /// empty result regardless of the query.
    pub fn search(
        &self,
        query: &[f32],
        threshold: f32,
        top_k: usize,
    ) -> Result<RetrievalResult, CoreError> {
        if self.chunks.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dims {
            return Err(CoreError::DimensionMismatch {
                expected: self.dims,
                actual: query.len(),
            });
        }

        let mut hits = Vec::new();
        for chunk in &self.chunks {
            let similarity = cosine_similarity(query, &chunk.vector)?;
            if similarity > threshold {
                hits.push(RetrievedChunk {
                    chunk_id: chunk.id.clone(),
                    title: chunk.title.clone(),
                    text: chunk.text.clone(),
                    similarity,
                });
            }
        }

        // sort_by is stable: ties stay in insertion order
        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(top_k);
        Ok(hits)
    }

    /// Chunk whose title names `career`: exact (case-insensitive) first, then
    /// the first title that contains it or is contained by it.
    pub fn find_by_title(&self, career: &str) -> Option<&KnowledgeChunk> {
        let wanted = career.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.chunks
            .iter()
            .find(|c| c.title.to_lowercase() == wanted)
            .or_else(|| {
                self.chunks.iter().find(|c| {
                    let title = c.title.to_lowercase();
                    title.contains(&wanted) || wanted.contains(&title)
                })
            })
    }
}
