use async_trait::async_trait;
use forge_core::{Message, Role};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::provider::{GenerationOptions, LLMError, LLMProvider, Result};

use super::common::backend_error;

const NAME: &str = "Anthropic";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
/// The messages API rejects requests without `max_tokens`.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<&'a Message>,
    temperature: f32,
    max_tokens: u32,
}

fn build_request<'a>(model: &'a str, messages: &'a [Message], options: &GenerationOptions<'_>) -> MessagesRequest<'a> {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    MessagesRequest {
        model,
        system: (!system.is_empty()).then(|| system.join("\n\n")),
        messages: messages.iter().filter(|m| m.role != Role::System).collect(),
        temperature: options.temperature(),
        max_tokens: options.max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
    }
}

/// One-shot messages API; system turns are hoisted to the top-level field.
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn generate(&self, messages: &[Message], options: GenerationOptions<'_>) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(LLMError::Configuration("Anthropic API key is missing".to_string()));
        }

        let body = build_request(&options.model, messages, &options);
        log::debug!(
            "Anthropic request: model={} system={} max_tokens={}",
            options.model,
            body.system.is_some(),
            body.max_tokens
        );

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(NAME, response).await);
        }

        let data: Value = response.json().await?;
        Ok(data
            .pointer("/content/0/text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}
