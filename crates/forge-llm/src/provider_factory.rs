//! Provider Factory
//!
//! Routes a model identifier to one of the four provider families and builds
//! it from a configuration snapshot.

use async_trait::async_trait;
use forge_core::{Config, Message};
use reqwest::{Client, Proxy};

use crate::provider::{GenerationOptions, LLMError, LLMProvider, Result};
use crate::providers::{AnthropicProvider, GeminiProvider, OllamaProvider, OpenAIProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAI,
    Anthropic,
    Gemini,
    Ollama,
}

impl ProviderKind {
    /// Case-insensitive substring match on the model identifier; anything
    /// unrecognized is assumed to be served by the local Ollama instance.
    pub fn from_model(model: &str) -> Self {
        let model = model.to_ascii_lowercase();
        if model.contains("gpt") {
            ProviderKind::OpenAI
        } else if model.contains("claude") {
            ProviderKind::Anthropic
        } else if model.contains("gemini") {
            ProviderKind::Gemini
        } else {
            ProviderKind::Ollama
        }
    }
}

/// Closed set of provider backends.
pub enum Provider {
    OpenAI(OpenAIProvider),
    Anthropic(AnthropicProvider),
    Gemini(GeminiProvider),
    Ollama(OllamaProvider),
}

impl Provider {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::OpenAI(_) => ProviderKind::OpenAI,
            Provider::Anthropic(_) => ProviderKind::Anthropic,
            Provider::Gemini(_) => ProviderKind::Gemini,
            Provider::Ollama(_) => ProviderKind::Ollama,
        }
    }
}

#[async_trait]
impl LLMProvider for Provider {
    fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI(p) => p.name(),
            Provider::Anthropic(p) => p.name(),
            Provider::Gemini(p) => p.name(),
            Provider::Ollama(p) => p.name(),
        }
    }

    async fn generate(&self, messages: &[Message], options: GenerationOptions<'_>) -> Result<String> {
        match self {
            Provider::OpenAI(p) => p.generate(messages, options).await,
            Provider::Anthropic(p) => p.generate(messages, options).await,
            Provider::Gemini(p) => p.generate(messages, options).await,
            Provider::Ollama(p) => p.generate(messages, options).await,
        }
    }
}

fn build_http_client(config: &Config) -> Result<Client> {
    let mut builder = Client::builder();
    if !config.http_proxy.is_empty() {
        let proxy = Proxy::http(&config.http_proxy)
            .map_err(|e| LLMError::Configuration(format!("Invalid HTTP proxy: {e}")))?;
        builder = builder.proxy(proxy);
    }
    if !config.https_proxy.is_empty() {
        let proxy = Proxy::https(&config.https_proxy)
            .map_err(|e| LLMError::Configuration(format!("Invalid HTTPS proxy: {e}")))?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| LLMError::Configuration(format!("Failed to build HTTP client: {e}")))
}

fn require_key(key: Option<&String>, provider: &str) -> Result<String> {
    match key.map(|k| k.trim()).filter(|k| !k.is_empty()) {
        Some(key) => Ok(key.to_string()),
        None => Err(LLMError::Configuration(format!("{provider} API key is missing"))),
    }
}

/// Build the provider serving `model`.
///
/// Hosted providers fail here when their key is absent, before any request.
pub fn create_provider(config: &Config, model: &str) -> Result<Provider> {
    let kind = ProviderKind::from_model(model);
    log::debug!("Routing model '{}' to {:?}", model, kind);

    let provider = match kind {
        ProviderKind::OpenAI => {
            let key = require_key(config.openai_api_key.as_ref(), "OpenAI")?;
            Provider::OpenAI(OpenAIProvider::new(build_http_client(config)?, key))
        }
        ProviderKind::Anthropic => {
            let key = require_key(config.anthropic_api_key.as_ref(), "Anthropic")?;
            Provider::Anthropic(AnthropicProvider::new(build_http_client(config)?, key))
        }
        ProviderKind::Gemini => {
            let key = require_key(config.gemini_api_key.as_ref(), "Gemini")?;
            Provider::Gemini(GeminiProvider::new(build_http_client(config)?, key))
        }
        ProviderKind::Ollama => Provider::Ollama(OllamaProvider::new(build_http_client(config)?, &config.ollama_url)),
    };
    Ok(provider)
}
