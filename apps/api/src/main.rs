use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use career_guide::assistant::Assistant;
use career_guide::config::Config;
use career_guide::embedding::{EmbeddingGateway, OpenAiEmbedder};
use career_guide::knowledge::{load_corpus, KnowledgeStore};
use career_guide::llm_client::{self, LlmClient};
use career_guide::routes::build_router;
use career_guide::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "career_guide={level},career_guide_api={level},tower_http={level}",
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career Guide API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize provider gateways
    let embedder = Arc::new(OpenAiEmbedder::new(
        config.openai_api_key.clone(),
        &config.embedding,
        config.provider_max_attempts,
    )?);
    info!(
        "Embedding gateway initialized (model: {}, dims: {})",
        embedder.model_name(),
        embedder.dims()
    );

    let llm = Arc::new(LlmClient::new(
        config.anthropic_api_key.clone(),
        config.provider_max_attempts,
    )?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build the knowledge store once; it is read-only afterwards
    let store = match &config.knowledge_corpus_path {
        Some(path) => load_corpus(path, embedder.as_ref()).await?,
        None => {
            warn!("KNOWLEDGE_CORPUS_PATH not set; answers will not be grounded");
            KnowledgeStore::new(config.embedding.dims)
        }
    };

    let assistant = Assistant::new(
        embedder,
        llm,
        Arc::new(store),
        config.retrieval.clone(),
        config.matching.clone(),
    );

    // Build app state
    let state = AppState {
        assistant: Arc::new(assistant),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
