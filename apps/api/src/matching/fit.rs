//! Job fit scoring: how well a stored profile matches a job description.
//!
//! `Assistant` holds an `Arc<dyn FitScorer>` so the scoring backend can be
//! swapped without touching the dispatcher or HTTP layer.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{MatchedSkill, SemanticComparator, SkillComparison};
use crate::embedding::{cosine_similarity, EmbeddingGateway};
use crate::errors::CoreError;
use crate::models::profile::Profile;

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    pub overall_score: u32, // 0 – 100
    /// Raw profile ↔ job description cosine.
    pub profile_similarity: f32,
    pub matched: Vec<MatchedSkill>,
    pub gaps: Vec<String>,
    pub recommendation: String,
    pub scorer_backend: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait FitScorer: Send + Sync {
    /// `required_skills` may be empty when none could be extracted from the
    /// job description; the score then rests on text similarity alone.
    async fn score(
        &self,
        profile: &Profile,
        job_description: &str,
        required_skills: &[String],
    ) -> Result<FitReport, CoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// EmbeddingFitScorer
// ────────────────────────────────────────────────────────────────────────────

/// Scores fit from embeddings only. No generation call.
///
/// Algorithm:
/// 1. similarity = cosine(profile text, job description), negatives → 0
/// 2. coverage = share of required skills the profile covers
///    (via [`SemanticComparator`], job skills relative to profile skills)
/// 3. overall_score = round(100 × mean(similarity, coverage)), or
///    round(100 × similarity) when there are no required skills
pub struct EmbeddingFitScorer {
    embedder: Arc<dyn EmbeddingGateway>,
    comparator: SemanticComparator,
}

impl EmbeddingFitScorer {
    pub fn new(embedder: Arc<dyn EmbeddingGateway>, comparator: SemanticComparator) -> Self {
        Self {
            embedder,
            comparator,
        }
    }
}

#[async_trait]
impl FitScorer for EmbeddingFitScorer {
    async fn score(
        &self,
        profile: &Profile,
        job_description: &str,
        required_skills: &[String],
    ) -> Result<FitReport, CoreError> {
        let texts = vec![profile.embedding_text(), job_description.to_string()];
        let vectors = self.embedder.embed_batch(&texts).await?;
        let [profile_vec, job_vec] = vectors.as_slice() else {
            return Err(CoreError::provider(format!(
                "expected 2 embeddings, received {}",
                vectors.len()
            )));
        };
        let similarity = cosine_similarity(profile_vec, job_vec)?;

        let comparison = self
            .comparator
            .compare_default(required_skills, &profile.skills)
            .await?;

        let overall_score = combine_score(similarity, &comparison, !required_skills.is_empty());
        debug!(
            "Job fit: similarity {similarity:.3}, coverage {:.2}, score {overall_score}",
            comparison.coverage()
        );

        let recommendation = build_recommendation(overall_score, &comparison.gap);
        Ok(FitReport {
            overall_score,
            profile_similarity: similarity,
            matched: comparison.matched,
            gaps: comparison.gap,
            recommendation,
            scorer_backend: "embedding".to_string(),
        })
    }
}

fn combine_score(similarity: f32, comparison: &SkillComparison, has_required: bool) -> u32 {
    let similarity = similarity.clamp(0.0, 1.0);
    let blended = if has_required {
        (similarity + comparison.coverage()) / 2.0
    } else {
        similarity
    };
    ((blended * 100.0).round() as u32).min(100)
}

/// Builds a human-readable recommendation string from score and gaps.
pub fn build_recommendation(score: u32, gaps: &[String]) -> String {
    let top_gaps: Vec<&str> = gaps.iter().take(3).map(String::as_str).collect();

    if score >= 70 {
        "Strong fit. Your profile directly covers the key requirements of this role.".to_string()
    } else if score >= 50 {
        if top_gaps.is_empty() {
            format!("Moderate fit ({score}/100). Strengthen how your experience reflects this role.")
        } else {
            format!(
                "Moderate fit ({score}/100). Consider developing: {}.",
                top_gaps.join(", ")
            )
        }
    } else if top_gaps.is_empty() {
        format!("Low fit ({score}/100). Your background differs substantially from this role.")
    } else {
        format!(
            "Low fit ({score}/100). Significant gaps: {}. Focus on building these skills before applying.",
            top_gaps.join(", ")
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
