//! Semantic Comparator: embedding-based partition of one skill vocabulary
//! relative to another.
//!
//! `compare(a, b, t)` answers "which of `a` does `b` cover?". It is
//! deliberately one-directional: swapping the arguments asks a different
//! question and may partition differently. Callers comparing a job against a
//! candidate pass the job's required skills as `a` and the candidate's skills
//! as `b`, so the gap list reads as "skills to develop".

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::MatchingSettings;
use crate::embedding::{cosine_similarity, EmbeddingGateway};
use crate::errors::CoreError;

pub mod fit;

pub use fit::{EmbeddingFitScorer, FitReport, FitScorer};

/// An element of A together with the element of B that covered it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedSkill {
    pub skill: String,
    pub best_match: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkillComparison {
    pub matched: Vec<MatchedSkill>,
    pub gap: Vec<String>,
}

impl SkillComparison {
    pub fn matched_labels(&self) -> Vec<&str> {
        self.matched.iter().map(|m| m.skill.as_str()).collect()
    }

    /// Share of A that B covers, in `[0, 1]`. An empty comparison is zero.
    pub fn coverage(&self) -> f32 {
        let total = self.matched.len() + self.gap.len();
        if total == 0 {
            return 0.0;
        }
        self.matched.len() as f32 / total as f32
    }
}

#[derive(Clone)]
pub struct SemanticComparator {
    embedder: Arc<dyn EmbeddingGateway>,
    settings: MatchingSettings,
}

impl SemanticComparator {
    pub fn new(embedder: Arc<dyn EmbeddingGateway>, settings: MatchingSettings) -> Self {
        Self { embedder, settings }
    }

    pub fn default_threshold(&self) -> f32 {
        self.settings.skill_threshold
    }

    /// [`compare`](Self::compare) at the configured threshold.
    pub async fn compare_default(
        &self,
        a: &[String],
        b: &[String],
    ) -> Result<SkillComparison, CoreError> {
        self.compare(a, b, self.default_threshold()).await
    }

    /// Partitions `a` into matched and gap relative to `b`.
    ///
    /// Each set is embedded with one batched call. An element is matched when
    /// its best similarity against `b` is `>= threshold`. Order of `a` is
    /// preserved in both output lists. An empty `b` puts all of `a` in the gap
    /// without calling the embedding provider.
    pub async fn compare(
        &self,
        a: &[String],
        b: &[String],
        threshold: f32,
    ) -> Result<SkillComparison, CoreError> {
        if a.is_empty() {
            return Ok(SkillComparison::default());
        }
        if b.is_empty() {
            return Ok(SkillComparison {
                matched: Vec::new(),
                gap: a.to_vec(),
            });
        }

        let a_vectors = self.embedder.embed_batch(a).await?;
        let b_vectors = self.embedder.embed_batch(b).await?;

        let mut result = SkillComparison::default();
        for (skill, vector) in a.iter().zip(a_vectors.iter()) {
            let mut best: Option<(usize, f32)> = None;
            for (j, candidate) in b_vectors.iter().enumerate() {
                let similarity = cosine_similarity(vector, candidate)?;
                // strict > keeps the earliest element of B on ties
                if best.map_or(true, |(_, s)| similarity > s) {
                    best = Some((j, similarity));
                }
            }

            match best {
                Some((j, similarity)) if similarity >= threshold => {
                    result.matched.push(MatchedSkill {
                        skill: skill.clone(),
                        best_match: b[j].clone(),
                        similarity,
                    })
                }
                _ => result.gap.push(skill.clone()),
            }
        }

        debug!(
            "Compared {} skills against {}: {} matched, {} gaps (threshold {threshold})",
            a.len(),
            b.len(),
            result.matched.len(),
            result.gap.len()
        );
        Ok(result)
    }
}
