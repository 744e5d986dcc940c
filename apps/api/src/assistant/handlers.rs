//! Axum route handlers for the chat, knowledge and analysis APIs.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{AssistantReply, SourceRef};
use crate::errors::AppError;
use crate::matching::SkillComparison;
use crate::models::chat::{ChatTurn, IncomingMessage};
use crate::rag::RagStage;
use crate::state::AppState;

const MIN_QUERY_CHARS: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub has_attachment: bool,
}

#[derive(Debug, Deserialize)]
pub struct RagQueryRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct RagQueryResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub grounded: bool,
    pub trace: Vec<RagStage>,
}

#[derive(Debug, Deserialize)]
pub struct SkillGapRequest {
    pub user_skills: Vec<String>,
    pub job_skills: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SkillGapResponse {
    pub comparison: SkillComparison,
    pub coverage: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/chat
///
/// Routes one user message to the matching assistant handler.
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<AssistantReply>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let message = IncomingMessage {
        text: request.message,
        user_id: request.user_id.filter(|id| !id.trim().is_empty()),
        history: request.history,
        has_attachment: request.has_attachment,
    };
    let reply = state.assistant.respond(&message).await?;
    Ok(Json(reply))
}

/// POST /api/v1/rag/query
///
/// Knowledge-base question answering without intent routing.
pub async fn handle_rag_query(
    State(state): State<AppState>,
    Json(request): Json<RagQueryRequest>,
) -> Result<Json<RagQueryResponse>, AppError> {
    let query = request.query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(AppError::Validation(format!(
            "query must be at least {MIN_QUERY_CHARS} characters"
        )));
    }

    let answer = state.assistant.rag().answer(query, &[]).await?;
    Ok(Json(RagQueryResponse {
        sources: answer.sources.iter().map(SourceRef::from).collect(),
        answer: answer.answer,
        grounded: answer.grounded,
        trace: answer.trace,
    }))
}

/// POST /api/v1/analysis/skill-gap
///
/// Which job skills the user's skills cover, by semantic similarity.
pub async fn handle_skill_gap(
    State(state): State<AppState>,
    Json(request): Json<SkillGapRequest>,
) -> Result<Json<SkillGapResponse>, AppError> {
    if request.job_skills.iter().all(|s| s.trim().is_empty()) {
        return Err(AppError::Validation("job_skills cannot be empty".to_string()));
    }

    let comparison = state
        .assistant
        .compare_skills(&request.user_skills, &request.job_skills)
        .await?;
    Ok(Json(SkillGapResponse {
        coverage: comparison.coverage(),
        comparison,
    }))
}
