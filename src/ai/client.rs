//! Completion-service client module
//!
//! The summarizer only needs a single-shot "complete this prompt" call, so the
//! capability is the [`CompletionService`] trait and the `OpenAI` chat
//! completions endpoint is one implementation of it.

use std::time::Duration;

use async_trait::async_trait;
use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::errors::RelayError;

pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

/// External language-model completion capability.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Complete `request.prompt`, returning the model's free-text answer.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RelayError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: Option<ChatCompletionChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoiceMessage {
    content: Option<String>,
}

/// `OpenAI` chat-completions client
pub struct OpenAiCompletionClient {
    api_key: String,
    org_id: Option<String>,
    model_name: String,
    endpoint: String,
    http: Client,
}

impl OpenAiCompletionClient {
    #[must_use]
    pub fn new(api_key: String, org_id: Option<String>, model_name: String) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            api_key,
            org_id,
            model_name,
            endpoint: OPENAI_CHAT_COMPLETIONS_URL.to_string(),
            http,
        }
    }

    /// Point the client at a compatible endpoint (proxies, self-hosted gateways).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    #[must_use]
    pub fn build_prompt(&self, prompt: &str) -> Vec<ChatCompletionMessage> {
        vec![ChatCompletionMessage {
            role: MessageRole::user,
            content: Content::Text(prompt.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }]
    }

    /// # Errors
    ///
    /// Returns an error if a header value is invalid or the HTTP request fails.
    async fn post(&self, body: &Value) -> Result<reqwest::Response, RelayError> {
        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = format!("Bearer {}", self.api_key)
            .parse()
            .map_err(|e| RelayError::HttpError(format!("Invalid Authorization header: {e}")))?;
        headers.insert("Authorization", auth_value);

        if let Some(org) = &self.org_id {
            let org_value = org.parse().map_err(|e| {
                RelayError::HttpError(format!("Invalid OpenAI-Organization header: {e}"))
            })?;
            headers.insert("OpenAI-Organization", org_value);
        }

        self.http
            .post(&self.endpoint)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| RelayError::HttpError(format!("OpenAI API request failed: {e}")))
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, RelayError> {
        let messages = build_chat_messages(&self.build_prompt(&request.prompt));
        let body = json!({
            "model": self.model_name,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_output_tokens,
        });

        info!(
            "Requesting completion from {} (max_tokens={})",
            self.model_name, request.max_output_tokens
        );

        let response = self.post(&body).await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(RelayError::CompletionError(format!(
                "status {status}: {error_text}"
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| RelayError::ParseError(format!("Invalid completion response: {e}")))?;
        let text = extract_completion_text(parsed)?;
        debug!("Completion returned {} chars", text.len());
        Ok(text)
    }
}

fn extract_completion_text(response: ChatCompletionResponse) -> Result<String, RelayError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| {
            RelayError::CompletionError("Completion response had no message content".to_string())
        })
}

/// Convert chat-style prompt messages into the chat-completions JSON shape.
/// Non-text parts are skipped.
pub(crate) fn build_chat_messages(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter_map(|m| {
            let role_str = match m.role {
                MessageRole::system => "system",
                MessageRole::user | MessageRole::function | MessageRole::tool => "user",
                MessageRole::assistant => "assistant",
            };

            match &m.content {
                Content::Text(t) => Some(json!({
                    "role": role_str,
                    "content": t
                })),
                Content::ImageUrl(_) => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chat_messages_uses_plain_text_content() {
        let client = OpenAiCompletionClient::new("key".to_string(), None, "gpt-test".to_string());
        let messages = build_chat_messages(&client.build_prompt("summarize this"));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "summarize this");
    }

    #[test]
    fn test_extract_completion_text_trims() {
        let parsed: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "  A summary.  "}}]
        }))
        .unwrap();
        assert_eq!(extract_completion_text(parsed).unwrap(), "A summary.");
    }

    #[test]
    fn test_extract_completion_text_rejects_malformed() {
        let parsed: ChatCompletionResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            extract_completion_text(parsed),
            Err(RelayError::CompletionError(_))
        ));

        let parsed: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert!(extract_completion_text(parsed).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let client = OpenAiCompletionClient::new("key".to_string(), None, "gpt-test".to_string())
            .with_endpoint("http://127.0.0.1:9/v1/chat/completions");
        let request = CompletionRequest {
            prompt: "hi".to_string(),
            max_output_tokens: 10,
            temperature: 0.3,
        };
        assert!(client.complete(&request).await.is_err());
    }
}
