use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{check_batch, EmbeddingGateway};
use crate::config::EmbeddingSettings;
use crate::errors::CoreError;

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

/// Embedding gateway backed by the OpenAI `/v1/embeddings` endpoint.
///
/// Batched: one HTTP call per `embed_batch`. Retries on 429, 5xx and network
/// errors with exponential backoff (1s, 2s, 4s, ...); other statuses fail fast.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    dims: usize,
    max_attempts: u32,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: String,
        settings: &EmbeddingSettings,
        max_attempts: u32,
    ) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CoreError::provider(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: settings.model.clone(),
            dims: settings.dims,
            max_attempts: max_attempts.max(1),
        })
    }
}

#[async_trait]
impl EmbeddingGateway for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let mut last_error: Option<CoreError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(5)));
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(OPENAI_EMBEDDINGS_URL)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(CoreError::provider(format!("embedding request failed: {e}")));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let text = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, text);
                last_error = Some(CoreError::provider(format!("embedding API {status}: {text}")));
                continue;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(CoreError::provider(format!("embedding API {status}: {text}")));
            }

            let parsed: EmbeddingResponse = response
                .json()
                .await
                .map_err(|e| CoreError::provider(format!("malformed embedding response: {e}")))?;

            debug!(
                "Embedded {} texts with {} ({} dims)",
                texts.len(),
                self.model,
                self.dims
            );

            return check_batch(into_input_order(parsed), texts.len(), self.dims);
        }

        Err(last_error
            .unwrap_or_else(|| CoreError::provider("embedding failed without a response")))
    }
}

/// The API documents `index` per datum; never rely on response order.
fn into_input_order(response: EmbeddingResponse) -> Vec<Vec<f32>> {
    let mut data = response.data;
    data.sort_by_key(|d| d.index);
    data.into_iter().map(|d| d.embedding).collect()
}
