//! Google Gemini provider.
//!
//! Streams `streamGenerateContent` as server-sent events and reads the text
//! of the first part of the first candidate from every event.

mod request;

pub use request::{build_contents, build_request, Content, GenerateContentRequest, GenerationConfig, Part};

use async_trait::async_trait;
use forge_core::Message;
use reqwest::Client;
use serde_json::Value;

use crate::provider::{GenerationOptions, LLMError, LLMProvider, Result};

use super::common::{backend_error, collect_fragments, decode_stream, FrameFormat};

const NAME: &str = "Gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub fn candidate_text(event: &Value) -> Option<&str> {
    event
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
}

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
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
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn generate(&self, messages: &[Message], mut options: GenerationOptions<'_>) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(LLMError::Configuration("Gemini API key is missing".to_string()));
        }

        let request = build_request(messages, options.temperature(), options.max_output_tokens);
        log::debug!(
            "Gemini request: model={} turns={}",
            options.model,
            request.contents.len()
        );

        let url = format!("{}/models/{}:streamGenerateContent", self.base_url, options.model);
        let response = self
            .client
            .post(url)
            .query(&[("alt", "sse"), ("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(NAME, response).await);
        }

        let fragments = decode_stream(NAME, response.bytes_stream(), FrameFormat::Sse, candidate_text);
        collect_fragments(fragments, &mut options).await
    }
}
