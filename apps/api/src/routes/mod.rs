pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assistant::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Conversational entry point
        .route("/api/v1/chat", post(handlers::handle_chat))
        // Direct access to the core services
        .route("/api/v1/rag/query", post(handlers::handle_rag_query))
        .route(
            "/api/v1/analysis/skill-gap",
            post(handlers::handle_skill_gap),
        )
        .with_state(state)
}
