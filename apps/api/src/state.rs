use std::sync::Arc;

use crate::assistant::Assistant;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub config: Config,
}
