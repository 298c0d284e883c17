use async_trait::async_trait;
use forge_core::Message;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::provider::{GenerationOptions, LLMProvider, Result};

use super::common::{backend_error, collect_fragments, decode_stream, FrameFormat};

const NAME: &str = "Ollama";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: ModelOptions,
}

#[derive(Serialize)]
struct ModelOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

pub fn message_content(line: &Value) -> Option<&str> {
    line.pointer("/message/content").and_then(Value::as_str)
}

/// Local Ollama server streaming newline-delimited JSON from `/api/chat`.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
}

impl OllamaProvider {
    pub fn new(client: Client, base_url: impl AsRef<str>) -> Self {
        Self {
            client,
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn generate(&self, messages: &[Message], mut options: GenerationOptions<'_>) -> Result<String> {
        let body = ChatRequest {
            model: &options.model,
            messages,
            stream: true,
            options: ModelOptions {
                temperature: options.temperature(),
                num_predict: options.max_output_tokens,
            },
        };

        log::debug!("Ollama request: {}/api/chat model={}", self.base_url, options.model);

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(NAME, response).await);
        }

        let fragments = decode_stream(NAME, response.bytes_stream(), FrameFormat::Ndjson, message_content);
        collect_fragments(fragments, &mut options).await
    }
}
