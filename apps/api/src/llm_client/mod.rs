/// LLM Client: the single point of entry for all text-generation calls.
///
/// ARCHITECTURAL RULE: No other module may call a generation API directly.
/// Everything goes through the [`GenerationGateway`] trait; [`LlmClient`] is
/// the production implementation over the Anthropic Messages API.
///
/// The gateway does not police output format. Prompts carry the plain-text
/// contract (see `prompts::PLAIN_TEXT_RULES`) and callers run the sanitizer.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::chat::{ChatTurn, Role};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all generation calls.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;

/// Everything a single generation call sees. Built per request, then dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptContext {
    pub system_instructions: String,
    /// Source-tagged knowledge snippets, highest similarity first.
    pub retrieved_snippets: Vec<String>,
    pub user_query: String,
    /// Bounded tail of the conversation, oldest first.
    pub recent_turns: Vec<ChatTurn>,
}

impl PromptContext {
    /// A one-shot prompt with no retrieval and no history.
    pub fn single(system_instructions: impl Into<String>, user_query: impl Into<String>) -> Self {
        Self {
            system_instructions: system_instructions.into(),
            user_query: user_query.into(),
            ..Default::default()
        }
    }

    /// System text: instructions followed by the knowledge block, if any.
    pub fn render_system(&self) -> String {
        if self.retrieved_snippets.is_empty() {
            return self.system_instructions.clone();
        }
        format!(
            "{}\n\nContext from knowledge base:\n{}",
            self.system_instructions,
            self.retrieved_snippets.join("\n---\n")
        )
    }

    /// Conversation as a strictly alternating user/assistant list that starts
    /// and ends with a user message, as the Messages API requires.
    pub fn render_messages(&self) -> Vec<(Role, String)> {
        let mut messages: Vec<(Role, String)> = Vec::new();
        let turns = self
            .recent_turns
            .iter()
            .skip_while(|t| t.role == Role::Assistant)
            .map(|t| (t.role, t.content.as_str()))
            .chain(std::iter::once((Role::User, self.user_query.as_str())));

        for (role, content) in turns {
            if content.trim().is_empty() {
                continue;
            }
            match messages.last_mut() {
                Some((last_role, text)) if *last_role == role => {
                    text.push_str("\n\n");
                    text.push_str(content);
                }
                _ => messages.push((role, content.to_string())),
            }
        }
        messages
    }
}

/// Structured prompt in, free text out.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn generate(&self, prompt: &PromptContext) -> Result<String, CoreError>;
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The production generation gateway.
/// Wraps the Anthropic Messages API with transport retries (429, 5xx, network,
/// blank completions) and exponential backoff.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    max_attempts: u32,
}

impl LlmClient {
    pub fn new(api_key: String, max_attempts: u32) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| CoreError::provider(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            max_attempts: max_attempts.max(1),
        })
    }

    async fn call(&self, prompt: &PromptContext) -> Result<String, CoreError> {
        let system = prompt.render_system();
        let rendered = prompt.render_messages();
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: &system,
            messages: rendered
                .iter()
                .map(|(role, content)| AnthropicMessage {
                    role: role.as_str(),
                    content,
                })
                .collect(),
        };

        let mut last_error: Option<CoreError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(5)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(CoreError::provider(format!("LLM request failed: {e}")));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(CoreError::provider(format!("LLM API {status}: {body}")));
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(CoreError::provider(format!("LLM API {status}: {message}")));
            }

            let llm_response: LlmResponse = response
                .json()
                .await
                .map_err(|e| CoreError::provider(format!("malformed LLM response: {e}")))?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            let text = llm_response.text();
            if text.trim().is_empty() {
                last_error = Some(CoreError::EmptyGeneration);
                continue;
            }
            return Ok(text);
        }

        Err(last_error.unwrap_or(CoreError::EmptyGeneration))
    }
}

#[async_trait]
impl GenerationGateway for LlmClient {
    async fn generate(&self, prompt: &PromptContext) -> Result<String, CoreError> {
        self.call(prompt).await
    }
}

/// One-shot structured extraction: JSON-only system prompt, parsed reply.
pub async fn call_json<T: DeserializeOwned>(
    generator: &dyn GenerationGateway,
    instructions: &str,
    user_content: &str,
) -> Result<T, CoreError> {
    let prompt = PromptContext::single(
        format!("{}\n\n{instructions}", prompts::JSON_ONLY_SYSTEM),
        user_content,
    );
    let reply = generator.generate(&prompt).await?;
    parse_json_reply(&reply)
}

/// Parses a JSON reply from the model, tolerating code fences and stray prose
/// around the payload.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, CoreError> {
    let text = strip_json_fences(text);
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }
    let payload = embedded_json(text)
        .ok_or_else(|| CoreError::provider("model reply contained no JSON payload"))?;
    serde_json::from_str(payload)
        .map_err(|e| CoreError::provider(format!("model reply was not valid JSON: {e}")))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// The outermost `{...}` or `[...]` span, whichever opens first.
fn embedded_json(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_parse_json_reply_with_surrounding_prose() {
        let skills: Vec<String> =
            parse_json_reply("Here are the skills:\n[\"Java\", \"SQL\"]\nHope this helps.").unwrap();
        assert_eq!(skills, vec!["Java", "SQL"]);
    }

    #[test]
    fn test_parse_json_reply_rejects_plain_text() {
        let result: Result<Vec<String>, _> = parse_json_reply("no json here");
        assert!(matches!(result, Err(CoreError::Provider(_))));
    }

    #[test]
    fn test_render_system_without_snippets_is_instructions_only() {
        let prompt = PromptContext::single("Be helpful.", "hi");
        assert_eq!(prompt.render_system(), "Be helpful.");
    }

    #[test]
    fn test_render_system_appends_snippets() {
        let prompt = PromptContext {
            system_instructions: "Rules.".into(),
            retrieved_snippets: vec!["Career: A\nalpha".into(), "Career: B\nbeta".into()],
            user_query: "q".into(),
            recent_turns: vec![],
        };
        let system = prompt.render_system();
        assert!(system.starts_with("Rules.\n\nContext from knowledge base:\n"));
        assert!(system.contains("Career: A\nalpha\n---\nCareer: B\nbeta"));
    }

    #[test]
    fn test_render_messages_alternates_and_ends_with_user() {
        let prompt = PromptContext {
            system_instructions: String::new(),
            retrieved_snippets: vec![],
            user_query: "And the salary?".into(),
            recent_turns: vec![
                ChatTurn::assistant("Welcome!"),
                ChatTurn::user("Tell me about data science"),
                ChatTurn::assistant("It is a growing field."),
                ChatTurn::user("Sounds good"),
            ],
        };
        let messages = prompt.render_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].0, Role::User);
        assert_eq!(messages[1].0, Role::Assistant);
        assert_eq!(messages[2], (Role::User, "Sounds good\n\nAnd the salary?".to_string()));
    }

    #[test]
    fn test_llm_response_text_joins_text_blocks() {
        let json = r#"{
            "content": [
                {"type": "text", "text": "Hello "},
                {"type": "tool_use", "text": null},
                {"type": "text", "text": "world"}
            ],
            "usage": {"input_tokens": 3, "output_tokens": 2}
        }"#;
        let response: LlmResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), "Hello world");
    }
}
