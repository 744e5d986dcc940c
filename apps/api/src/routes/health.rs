use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status and version, plus what the knowledge base was built with.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "career-guide-api",
        "embedding_model": state.config.embedding.model,
        "knowledge_chunks": state.assistant.rag().store().len()
    }))
}
