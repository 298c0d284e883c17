use async_trait::async_trait;
use forge_core::Message;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::provider::{GenerationOptions, LLMError, LLMProvider, Result};

use super::common::backend_error;

const NAME: &str = "OpenAI";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// One-shot chat completions; the system message stays inline.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIProvider {
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
impl LLMProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn generate(&self, messages: &[Message], options: GenerationOptions<'_>) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(LLMError::Configuration("OpenAI API key is missing".to_string()));
        }

        let body = ChatCompletionRequest {
            model: &options.model,
            messages,
            temperature: options.temperature(),
            max_tokens: options.max_output_tokens,
        };

        log::debug!("OpenAI request: model={} messages={}", options.model, messages.len());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(NAME, response).await);
        }

        let data: Value = response.json().await?;
        Ok(data
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_absent_cap() {
        let messages = [Message::system("be terse"), Message::user("hi")];
        let body = ChatCompletionRequest {
            model: "gpt-4o",
            messages: &messages,
            temperature: 0.7,
            max_tokens: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn missing_key_fails_before_io() {
        let provider = OpenAIProvider::new(Client::new(), "").with_base_url("http://127.0.0.1:9");
        let err = tokio_test::block_on(provider.generate(&[Message::user("hi")], GenerationOptions::new("gpt-4o")))
            .unwrap_err();
        assert!(matches!(err, LLMError::Configuration(_)));
    }
}
