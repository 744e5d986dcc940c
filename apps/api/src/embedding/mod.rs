//! Embedding gateway: the single seam through which text becomes vectors.
//!
//! ARCHITECTURAL RULE: retrieval, skill comparison and job-fit scoring never
//! call an embedding API directly. They hold an `Arc<dyn EmbeddingGateway>`.
//!
//! The gateway never retries on behalf of the core. Transport retries live in
//! the concrete HTTP adapter ([`OpenAiEmbedder`]); everything above it sees a
//! single `Result`.

use async_trait::async_trait;

use crate::errors::CoreError;

pub mod openai;

pub use openai::OpenAiEmbedder;

/// Text → fixed-length vector, deterministic for a given model version.
#[async_trait]
pub trait EmbeddingGateway: Send + Sync {
    /// Model identifier (e.g. `"text-embedding-3-small"`).
    fn model_name(&self) -> &str;

    /// Dimensionality every returned vector must have.
    fn dims(&self) -> usize;

    /// Embeds a batch of texts in one upstream call. Output order matches input.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError>;

    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CoreError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| CoreError::provider("embedding response contained no vectors"))
    }
}

/// Validates a batch response: one vector per input, each of `dims` length.
pub(crate) fn check_batch(
    vectors: Vec<Vec<f32>>,
    expected_len: usize,
    dims: usize,
) -> Result<Vec<Vec<f32>>, CoreError> {
    if vectors.len() != expected_len {
        return Err(CoreError::provider(format!(
            "expected {expected_len} embeddings, received {}",
            vectors.len()
        )));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
        return Err(CoreError::DimensionMismatch {
            expected: dims,
            actual: bad.len(),
        });
    }
    Ok(vectors)
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`; `0.0` when either vector has zero norm.
/// Vectors of different lengths are a programming error, never padded.
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, CoreError> {
    if a.len() != b.len() {
        return Err(CoreError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return Ok(0.0);
    }

    Ok((dot / denom).clamp(-1.0, 1.0))
}
