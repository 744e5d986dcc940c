//! Conversational assistant: routes each message to one handler and produces
//! the reply.
//!
//! The intent router decides the category; every handler below is a thin
//! composition of the core services (comparator, fit scorer, RAG pipeline)
//! plus the profile and goal stores.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{MatchingSettings, RetrievalSettings};
use crate::embedding::EmbeddingGateway;
use crate::errors::AppError;
use crate::intent::{ExtractedSlots, GoalSpec, IntentCategory, IntentRouter, SkillGapTarget};
use crate::knowledge::{KnowledgeStore, RetrievedChunk};
use crate::llm_client::GenerationGateway;
use crate::matching::{EmbeddingFitScorer, FitScorer, SemanticComparator, SkillComparison};
use crate::models::chat::{recent_turns, IncomingMessage};
use crate::models::profile::Profile;
use crate::rag::{RagAnswer, RagOrchestrator};

pub mod extraction;
pub mod format;
pub mod handlers;
pub mod prompts;
pub mod stores;

use extraction::{
    career_skills_from_model, dedup_skills, gap_skills_from_history, job_skills_from_description,
    required_skills_line, ParsedResume, ResumeParser,
};
use format::{
    NEED_GOAL_TEXT, NEED_JOB_DESCRIPTION, NEED_PROFILE, NEED_RESUME_TEXT, NEED_USER_ID,
    NO_RECOMMENDATIONS,
};
use stores::{GoalStore, InMemoryGoalStore, InMemoryProfileStore, ProfileStore};

/// Below this many characters a "resume" is a request, not a paste.
const MIN_RESUME_CHARS: usize = 80;
const MAX_RECOMMENDATIONS: usize = 3;

static GOAL_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:top|first|main|key)\s+(\d{1,2})\b").expect("invalid regex")
});

// ────────────────────────────────────────────────────────────────────────────
// Reply types
// ────────────────────────────────────────────────────────────────────────────

/// A knowledge chunk an answer drew on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub chunk_id: String,
    pub title: String,
    pub similarity: f32,
}

impl From<&RetrievedChunk> for SourceRef {
    fn from(chunk: &RetrievedChunk) -> Self {
        Self {
            chunk_id: chunk.chunk_id.clone(),
            title: chunk.title.clone(),
            similarity: chunk.similarity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssistantReply {
    pub intent: IntentCategory,
    pub text: String,
    pub sources: Vec<SourceRef>,
}

impl AssistantReply {
    fn text(intent: IntentCategory, text: impl Into<String>) -> Self {
        Self {
            intent,
            text: text.into(),
            sources: Vec::new(),
        }
    }

    fn from_rag(intent: IntentCategory, answer: RagAnswer) -> Self {
        Self {
            intent,
            sources: answer.sources.iter().map(SourceRef::from).collect(),
            text: answer.answer,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Assistant
// ────────────────────────────────────────────────────────────────────────────

pub struct Assistant {
    router: IntentRouter,
    rag: RagOrchestrator,
    comparator: SemanticComparator,
    fit_scorer: Arc<dyn FitScorer>,
    resume_parser: ResumeParser,
    embedder: Arc<dyn EmbeddingGateway>,
    generator: Arc<dyn GenerationGateway>,
    profiles: Arc<dyn ProfileStore>,
    goals: Arc<dyn GoalStore>,
}

impl Assistant {
    /// Wires the core services together. Profiles and goals live in memory
    /// until [`with_stores`](Self::with_stores) swaps in other backends.
    pub fn new(
        embedder: Arc<dyn EmbeddingGateway>,
        generator: Arc<dyn GenerationGateway>,
        store: Arc<KnowledgeStore>,
        retrieval: RetrievalSettings,
        matching: MatchingSettings,
    ) -> Self {
        let comparator = SemanticComparator::new(embedder.clone(), matching);
        let fit_scorer = Arc::new(EmbeddingFitScorer::new(embedder.clone(), comparator.clone()));
        Self {
            router: IntentRouter::new(retrieval.recent_turn_limit),
            rag: RagOrchestrator::new(embedder.clone(), store, generator.clone(), retrieval),
            comparator,
            fit_scorer,
            resume_parser: ResumeParser::new(generator.clone()),
            embedder,
            generator,
            profiles: Arc::new(InMemoryProfileStore::new()),
            goals: Arc::new(InMemoryGoalStore::new()),
        }
    }

    pub fn with_stores(mut self, profiles: Arc<dyn ProfileStore>, goals: Arc<dyn GoalStore>) -> Self {
        self.profiles = profiles;
        self.goals = goals;
        self
    }

    pub fn rag(&self) -> &RagOrchestrator {
        &self.rag
    }

    /// Routes `message` and runs the matching handler.
    pub async fn respond(&self, message: &IncomingMessage) -> Result<AssistantReply, AppError> {
        let decision = self.router.route(message);
        info!(
            "Handling {} message (rule '{}', confidence {:?})",
            decision.category.as_str(),
            decision.rule,
            decision.confidence
        );

        let intent = decision.category;
        let slots = decision.slots;
        match intent {
            IntentCategory::Resume => self.handle_resume(message, &slots).await,
            IntentCategory::JobFit => self.handle_job_fit(message, &slots).await,
            IntentCategory::SkillGap => self.handle_skill_gap(message, &slots).await,
            IntentCategory::Recommend => self.handle_recommend(message).await,
            IntentCategory::GoalSet => self.handle_goal_set(message, &slots).await,
            IntentCategory::GoalList => self.handle_goal_list(message).await,
            IntentCategory::Qa => {
                let query = slots.query.as_deref().unwrap_or(&message.text);
                let answer = self.rag.answer(query, &message.history).await?;
                Ok(AssistantReply::from_rag(intent, answer))
            }
            IntentCategory::Fallback => {
                let query = slots.query.as_deref().unwrap_or(&message.text);
                let answer = self.rag.answer_without_retrieval(query, &message.history).await?;
                Ok(AssistantReply::from_rag(intent, answer))
            }
        }
    }

    // ── Handlers ────────────────────────────────────────────────────────────

    async fn handle_resume(
        &self,
        message: &IncomingMessage,
        slots: &ExtractedSlots,
    ) -> Result<AssistantReply, AppError> {
        let intent = IntentCategory::Resume;
        let text = slots.resume_text.as_deref().unwrap_or(&message.text).trim();
        if text.chars().count() < MIN_RESUME_CHARS {
            return Ok(AssistantReply::text(intent, NEED_RESUME_TEXT));
        }

        let parsed = self.resume_parser.parse(text).await?;
        let saved = match message.user_id.as_deref() {
            Some(user_id) => {
                let existing = self.profiles.get(user_id).await?;
                self.profiles
                    .upsert(merge_resume(existing, user_id, &parsed))
                    .await?;
                info!("Saved profile for user {user_id} ({} skills)", parsed.skills.len());
                true
            }
            None => false,
        };
        Ok(AssistantReply::text(intent, format::resume_reply(&parsed, saved)))
    }

    async fn handle_recommend(&self, message: &IncomingMessage) -> Result<AssistantReply, AppError> {
        let intent = IntentCategory::Recommend;
        let profile = match self.require_profile(message).await? {
            Ok(profile) => profile,
            Err(guidance) => return Ok(AssistantReply::text(intent, guidance)),
        };

        let vector = self.embedder.embed(&profile.embedding_text()).await?;
        let settings = self.rag.settings();
        let hits = self
            .rag
            .store()
            .search(&vector, settings.similarity_threshold, settings.top_k)?;

        let mut careers: Vec<RetrievedChunk> = Vec::new();
        for hit in hits {
            if careers.len() == MAX_RECOMMENDATIONS {
                break;
            }
            if !careers.iter().any(|c| c.title.eq_ignore_ascii_case(&hit.title)) {
                careers.push(hit);
            }
        }
        debug!("Recommending {} careers", careers.len());

        if careers.is_empty() {
            return Ok(AssistantReply::text(intent, NO_RECOMMENDATIONS));
        }
        Ok(AssistantReply {
            intent,
            text: format::recommendations_reply(&careers),
            sources: careers.iter().map(SourceRef::from).collect(),
        })
    }

    async fn handle_skill_gap(
        &self,
        message: &IncomingMessage,
        slots: &ExtractedSlots,
    ) -> Result<AssistantReply, AppError> {
        let intent = IntentCategory::SkillGap;
        let profile = match self.require_profile(message).await? {
            Ok(profile) => profile,
            Err(guidance) => return Ok(AssistantReply::text(intent, guidance)),
        };

        let (title, required) = match &slots.target {
            Some(SkillGapTarget::Named(career)) => self.career_requirements(career).await?,
            _ => match slots.job_description.as_deref() {
                Some(jd) => (
                    "This Job".to_string(),
                    job_skills_from_description(self.generator.as_ref(), jd).await?,
                ),
                None => return Ok(AssistantReply::text(intent, NEED_JOB_DESCRIPTION)),
            },
        };
        if required.is_empty() {
            return Ok(AssistantReply::text(
                intent,
                format!("I couldn't determine the required skills for {title}. Try pasting a job description for the role."),
            ));
        }

        let comparison = self.comparator.compare_default(&required, &profile.skills).await?;
        Ok(AssistantReply::text(intent, format::skill_gap_reply(&title, &comparison)))
    }

    async fn handle_job_fit(
        &self,
        message: &IncomingMessage,
        slots: &ExtractedSlots,
    ) -> Result<AssistantReply, AppError> {
        let intent = IntentCategory::JobFit;
        let profile = match self.require_profile(message).await? {
            Ok(profile) => profile,
            Err(guidance) => return Ok(AssistantReply::text(intent, guidance)),
        };
        let Some(jd) = slots.job_description.as_deref() else {
            return Ok(AssistantReply::text(intent, NEED_JOB_DESCRIPTION));
        };

        // Fit is still meaningful from similarity alone.
        let required = job_skills_from_description(self.generator.as_ref(), jd)
            .await
            .unwrap_or_else(|e| {
                warn!("Skill extraction failed, scoring on similarity only: {e}");
                Vec::new()
            });

        let report = self.fit_scorer.score(&profile, jd, &required).await?;
        info!(
            "Job fit for {}: {}/100 via {}",
            profile.user_id, report.overall_score, report.scorer_backend
        );
        Ok(AssistantReply::text(intent, format::job_fit_reply(&report)))
    }

    async fn handle_goal_set(
        &self,
        message: &IncomingMessage,
        slots: &ExtractedSlots,
    ) -> Result<AssistantReply, AppError> {
        let intent = IntentCategory::GoalSet;
        let Some(user_id) = message.user_id.as_deref() else {
            return Ok(AssistantReply::text(intent, NEED_USER_ID));
        };

        let goal_texts: Vec<String> = match &slots.goal {
            Some(GoalSpec::Text(text)) => vec![format!("Learn {}", format::title_case(text))],
            _ => {
                let history = recent_turns(&message.history, self.rag.settings().recent_turn_limit);
                let gaps = gap_skills_from_history(history).unwrap_or_default();
                let limit = requested_goal_count(&message.text).unwrap_or(gaps.len());
                gaps.into_iter()
                    .take(limit)
                    .map(|skill| format!("Learn {skill}"))
                    .collect()
            }
        };
        if goal_texts.is_empty() {
            return Ok(AssistantReply::text(intent, NEED_GOAL_TEXT));
        }

        let mut outcomes = Vec::with_capacity(goal_texts.len());
        for text in &goal_texts {
            outcomes.push(self.goals.add(user_id, text).await?);
        }
        Ok(AssistantReply::text(intent, format::goals_set_reply(&outcomes)))
    }

    async fn handle_goal_list(&self, message: &IncomingMessage) -> Result<AssistantReply, AppError> {
        let intent = IntentCategory::GoalList;
        let Some(user_id) = message.user_id.as_deref() else {
            return Ok(AssistantReply::text(intent, NEED_USER_ID));
        };
        let goals = self.goals.list(user_id).await?;
        Ok(AssistantReply::text(intent, format::goal_list_reply(&goals)))
    }

    // ── Helpers ─────────────────────────────────────────────────────────────

    /// The caller's stored profile, or the guidance text to reply with.
    async fn require_profile(
        &self,
        message: &IncomingMessage,
    ) -> Result<Result<Profile, &'static str>, AppError> {
        let Some(user_id) = message.user_id.as_deref() else {
            return Ok(Err(NEED_USER_ID));
        };
        Ok(self
            .profiles
            .get(user_id)
            .await?
            .filter(|p| !p.is_empty())
            .ok_or(NEED_PROFILE))
    }

    /// Display title and required skills for a named career. The corpus entry
    /// wins; the model is asked only for careers the corpus lacks.
    async fn career_requirements(&self, career: &str) -> Result<(String, Vec<String>), AppError> {
        let chunk = self.rag.store().find_by_title(career);
        if let Some(skills) = chunk.and_then(|c| required_skills_line(&c.text)) {
            let title = chunk.map_or_else(|| format::title_case(career), |c| c.title.clone());
            return Ok((title, skills));
        }

        let title = format::title_case(career);
        debug!("No corpus requirements for '{title}', asking the model");
        let skills = career_skills_from_model(self.generator.as_ref(), &title).await?;
        Ok((title, skills))
    }

    /// Plain skill comparison for the analysis endpoint: job skills relative
    /// to the user's. Blank entries never reach the embedding provider.
    pub async fn compare_skills(
        &self,
        user_skills: &[String],
        job_skills: &[String],
    ) -> Result<SkillComparison, AppError> {
        let user_skills = dedup_skills(user_skills.to_vec());
        let job_skills = dedup_skills(job_skills.to_vec());
        Ok(self.comparator.compare_default(&job_skills, &user_skills).await?)
    }
}

/// Folds a parsed resume into the stored profile; fields the parse missed
/// keep their previous values.
fn merge_resume(existing: Option<Profile>, user_id: &str, parsed: &ParsedResume) -> Profile {
    let mut profile = existing.unwrap_or_else(|| Profile {
        user_id: user_id.to_string(),
        ..Default::default()
    });
    if parsed.name.is_some() {
        profile.name = parsed.name.clone();
    }
    if parsed.email.is_some() {
        profile.email = parsed.email.clone();
    }
    if parsed.experience.is_some() {
        profile.experience_summary = parsed.experience.clone();
    }
    if !parsed.skills.is_empty() {
        profile.skills = parsed.skills.clone();
    }
    profile
}

/// "add the top 3 skills to my goals" → 3.
fn requested_goal_count(text: &str) -> Option<usize> {
    GOAL_COUNT_RE
        .captures(&text.to_lowercase())
        .and_then(|caps| caps[1].parse().ok())
        .filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreError;
    use crate::knowledge::KnowledgeChunk;
    use crate::models::chat::ChatTurn;
    use crate::testing::{RecordingGenerator, StubEmbedder};

    const DS_TEXT: &str = "Data Scientists analyze complex data to guide decisions.\n\
        Required skills: Python, SQL, Statistics\n\
        Salary: ₹8 LPA - ₹25 LPA\n\
        Outlook: Very high demand";
    const DS_ALT_TEXT: &str = "Data Scientists in research labs publish and prototype models.";
    const PM_TEXT: &str = "Product Managers own product strategy.\nRequired skills: Roadmapping, Communication";
    const QUERY: &str = "What is the job outlook for Data Scientists?";

    fn profile() -> Profile {
        Profile {
            user_id: "u1".into(),
            experience_summary: Some("Built forecasting models".into()),
            skills: vec!["Python".into()],
            ..Default::default()
        }
    }

    fn embedder() -> StubEmbedder {
        StubEmbedder::new()
            .term(DS_TEXT)
            .term(PM_TEXT)
            .blend(DS_ALT_TEXT, DS_TEXT, 0.95)
            .term("Python")
            .term("SQL")
            .term("Statistics")
            .term("Kafka")
            .blend(&profile().embedding_text(), DS_TEXT, 0.9)
            .blend(QUERY, DS_TEXT, 0.8)
    }

    struct Harness {
        assistant: Assistant,
        generator: Arc<RecordingGenerator>,
        profiles: Arc<InMemoryProfileStore>,
    }

    async fn harness(generator: RecordingGenerator) -> Harness {
        let embedder = embedder();
        let mut store = KnowledgeStore::new(embedder.dims());
        for (id, title, text) in [
            ("ds", "Data Scientist", DS_TEXT),
            ("pm", "Product Manager", PM_TEXT),
            ("ds-research", "Data Scientist", DS_ALT_TEXT),
        ] {
            store
                .insert(KnowledgeChunk {
                    id: id.into(),
                    title: title.into(),
                    text: text.into(),
                    vector: embedder.vector(text),
                })
                .unwrap();
        }

        let generator = Arc::new(generator);
        let profiles = Arc::new(InMemoryProfileStore::new());
        profiles.upsert(profile()).await.unwrap();
        let assistant = Assistant::new(
            Arc::new(embedder),
            generator.clone(),
            Arc::new(store),
            RetrievalSettings::default(),
            MatchingSettings::default(),
        )
        .with_stores(profiles.clone(), Arc::new(InMemoryGoalStore::new()));

        Harness {
            assistant,
            generator,
            profiles,
        }
    }

    #[tokio::test]
    async fn test_question_answered_with_sources() {
        let h = harness(RecordingGenerator::replying("Demand is very high.")).await;
        let reply = h.assistant.respond(&IncomingMessage::new(QUERY)).await.unwrap();

        assert_eq!(reply.intent, IntentCategory::Qa);
        assert_eq!(reply.text, "Demand is very high.");
        assert!(!reply.sources.is_empty());
        assert_eq!(reply.sources[0].chunk_id, "ds");
    }

    #[tokio::test]
    async fn test_skill_gap_uses_corpus_requirements() {
        let h = harness(RecordingGenerator::replying("unused")).await;
        let message = IncomingMessage::new("What skills do I need for data scientist?").with_user("u1");
        let reply = h.assistant.respond(&message).await.unwrap();

        assert_eq!(reply.intent, IntentCategory::SkillGap);
        assert!(reply.text.starts_with("**Skill Gap Analysis for Data Scientist**"));
        assert!(reply.text.contains("**Skills You Have:**\nPython\n"));
        assert!(reply.text.contains("**Skills You Need to Develop:**\nSQL, Statistics\n"));
        assert_eq!(h.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_skill_gap_for_unknown_career_asks_model() {
        let h = harness(RecordingGenerator::replying(r#"["Python", "Kafka"]"#)).await;
        let message = IncomingMessage::new("What skills do I need for data engineer?").with_user("u1");
        let reply = h.assistant.respond(&message).await.unwrap();

        assert!(reply.text.starts_with("**Skill Gap Analysis for Data Engineer**"));
        assert!(reply.text.contains("**Skills You Need to Develop:**\nKafka\n"));
        assert_eq!(h.generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_profile_required_for_personal_analysis() {
        let h = harness(RecordingGenerator::replying("unused")).await;

        let anonymous = IncomingMessage::new("What skills do I need for data scientist?");
        let reply = h.assistant.respond(&anonymous).await.unwrap();
        assert_eq!(reply.text, NEED_USER_ID);

        let stranger = IncomingMessage::new("Recommend careers for me").with_user("u2");
        let reply = h.assistant.respond(&stranger).await.unwrap();
        assert_eq!(reply.intent, IntentCategory::Recommend);
        assert_eq!(reply.text, NEED_PROFILE);
    }

    #[tokio::test]
    async fn test_recommendations_deduplicate_titles() {
        let h = harness(RecordingGenerator::replying("unused")).await;
        let message = IncomingMessage::new("Recommend careers for me").with_user("u1");
        let reply = h.assistant.respond(&message).await.unwrap();

        assert_eq!(reply.sources.len(), 1);
        assert_eq!(reply.sources[0].chunk_id, "ds");
        assert!(reply.text.contains("**1. Data Scientist** (match 90%)"));
        assert!(reply.text.contains("Outlook: Very high demand"));
    }

    #[tokio::test]
    async fn test_gap_reply_feeds_goal_setting() {
        let h = harness(RecordingGenerator::replying("unused")).await;
        let question = "What skills do I need for data scientist?";
        let gap_reply = h
            .assistant
            .respond(&IncomingMessage::new(question).with_user("u1"))
            .await
            .unwrap();

        let history = vec![ChatTurn::user(question), ChatTurn::assistant(gap_reply.text)];
        let message = IncomingMessage::new("Add these skills to my goals")
            .with_user("u1")
            .with_history(history.clone());
        let reply = h.assistant.respond(&message).await.unwrap();
        assert_eq!(reply.intent, IntentCategory::GoalSet);
        assert!(reply.text.contains("**Goals Created (2):**\n- Learn SQL\n- Learn Statistics"));

        // asking again does not duplicate
        let reply = h.assistant.respond(&message).await.unwrap();
        assert!(reply.text.contains("**Already Active (2):**"));

        let list = h
            .assistant
            .respond(&IncomingMessage::new("What are my goals?").with_user("u1"))
            .await
            .unwrap();
        assert_eq!(list.intent, IntentCategory::GoalList);
        assert!(list.text.starts_with("**Your Goals (2 total):**"));
    }

    #[tokio::test]
    async fn test_goal_count_limits_context_goals() {
        let h = harness(RecordingGenerator::replying("unused")).await;
        let history = vec![ChatTurn::assistant(
            "**Skills You Need to Develop:**\nSQL, Statistics, Spark\n\n**Recommendation:**\nFocus.",
        )];
        let message = IncomingMessage::new("Add the top 1 skill to my goals")
            .with_user("u1")
            .with_history(history);
        let reply = h.assistant.respond(&message).await.unwrap();
        assert!(reply.text.contains("**Goals Created (1):**\n- Learn SQL"));
    }

    #[tokio::test]
    async fn test_named_goal_and_missing_context() {
        let h = harness(RecordingGenerator::replying("unused")).await;
        let named = IncomingMessage::new("Set a goal to learn machine learning").with_user("u1");
        let reply = h.assistant.respond(&named).await.unwrap();
        assert!(reply.text.contains("- Learn Machine Learning"));

        let vague = IncomingMessage::new("Add these skills to my goals").with_user("u1");
        let reply = h.assistant.respond(&vague).await.unwrap();
        assert_eq!(reply.text, NEED_GOAL_TEXT);
    }

    #[tokio::test]
    async fn test_resume_parsed_and_saved() {
        let h = harness(RecordingGenerator::replying(
            r#"{"name": "Priya Sharma", "email": null, "experience": "4 years building payment APIs", "skills": ["Java", "Rust", "java"]}"#,
        ))
        .await;
        let resume = "Here is my resume:\nPriya Sharma\npriya@example.com\nWork Experience\n\
                      Acme Pay - Software Engineer (2020-2024): built payment APIs in Java and Rust.\n\
                      Education\nB.Tech Computer Science";
        let reply = h
            .assistant
            .respond(&IncomingMessage::new(resume).with_user("u3"))
            .await
            .unwrap();

        assert_eq!(reply.intent, IntentCategory::Resume);
        assert!(reply.text.starts_with("**Resume Parsed Successfully!**"));
        let saved = h.profiles.get("u3").await.unwrap().unwrap();
        assert_eq!(saved.skills, vec!["Java", "Rust"]);
        assert_eq!(saved.email.as_deref(), Some("priya@example.com"));
    }

    #[tokio::test]
    async fn test_short_resume_request_asks_for_text() {
        let h = harness(RecordingGenerator::replying("unused")).await;
        let reply = h
            .assistant
            .respond(&IncomingMessage::new("Please review my resume").with_user("u1"))
            .await
            .unwrap();
        assert_eq!(reply.text, NEED_RESUME_TEXT);
        assert_eq!(h.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_job_fit_scores_pasted_description() {
        let h = harness(RecordingGenerator::replying(r#"["Python", "Kafka"]"#)).await;
        let jd = "We are looking for a Data Engineer to build streaming pipelines for our payments platform. \
                  Required skills: Python, Kafka. Key responsibilities: own ingestion jobs and the on-call rotation. \
                  Location: Remote.";
        let reply = h
            .assistant
            .respond(&IncomingMessage::new(jd).with_user("u1"))
            .await
            .unwrap();

        assert_eq!(reply.intent, IntentCategory::JobFit);
        // profile/JD similarity 0, coverage 1 of 2
        assert!(reply.text.contains("**Fit Score: 25/100**"));
        assert!(reply.text.contains("**Skills You Need to Develop:**\nKafka\n"));
    }

    #[tokio::test]
    async fn test_job_fit_without_description() {
        let h = harness(RecordingGenerator::replying("unused")).await;
        let reply = h
            .assistant
            .respond(&IncomingMessage::new("What's my fit score?").with_user("u1"))
            .await
            .unwrap();
        assert_eq!(reply.intent, IntentCategory::JobFit);
        assert_eq!(reply.text, NEED_JOB_DESCRIPTION);
    }

    #[tokio::test]
    async fn test_small_talk_goes_to_open_chat() {
        let h = harness(RecordingGenerator::replying("You're welcome!")).await;
        let reply = h.assistant.respond(&IncomingMessage::new("thanks!")).await.unwrap();
        assert_eq!(reply.intent, IntentCategory::Fallback);
        assert_eq!(reply.text, "You're welcome!");
        assert!(reply.sources.is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_surfaces() {
        let h = harness(RecordingGenerator::failing()).await;
        let err = h.assistant.respond(&IncomingMessage::new(QUERY)).await.unwrap_err();
        assert!(matches!(err, AppError::Core(CoreError::Provider(_))));
    }

    #[tokio::test]
    async fn test_compare_skills_is_job_relative() {
        let h = harness(RecordingGenerator::replying("unused")).await;
        let comparison = h
            .assistant
            .compare_skills(&["Python".to_string()], &["Python".to_string(), "SQL".to_string()])
            .await
            .unwrap();
        assert_eq!(comparison.matched_labels(), vec!["Python"]);
        assert_eq!(comparison.gap, vec!["SQL"]);
    }

    #[tokio::test]
    async fn test_compare_skills_drops_blank_entries() {
        let h = harness(RecordingGenerator::replying("unused")).await;
        let user = ["Python", "  "].map(String::from);
        let job = ["Python", "", " SQL ", "python"].map(String::from);
        let comparison = h.assistant.compare_skills(&user, &job).await.unwrap();
        assert_eq!(comparison.matched_labels(), vec!["Python"]);
        assert_eq!(comparison.gap, vec!["SQL"]);

        let comparison = h.assistant.compare_skills(&user, &[" ".to_string()]).await.unwrap();
        assert!(comparison.matched.is_empty());
        assert!(comparison.gap.is_empty());
    }

    #[test]
    fn test_requested_goal_count() {
        assert_eq!(requested_goal_count("add the top 3 skills"), Some(3));
        assert_eq!(requested_goal_count("add them all"), None);
        assert_eq!(requested_goal_count("top 0 skills"), None);
    }
}
