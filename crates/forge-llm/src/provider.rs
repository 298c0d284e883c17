use async_trait::async_trait;
use forge_core::Message;
use thiserror::Error;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Error, Debug)]
pub enum LLMError {
    /// Missing or unusable settings, raised before any request is sent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{provider} API error: {message}")]
    Backend {
        provider: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LLMError {
    pub(crate) fn no_body(provider: &'static str) -> Self {
        LLMError::Backend {
            provider,
            status: None,
            message: "no response body".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LLMError>;

pub type ProgressCallback<'a> = Box<dyn FnMut(&str) + Send + 'a>;

/// Per-call generation settings.
///
/// The progress callback is only borrowed for the duration of one call.
pub struct GenerationOptions<'a> {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub on_progress: Option<ProgressCallback<'a>>,
}

impl<'a> GenerationOptions<'a> {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_output_tokens: None,
            on_progress: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn on_progress(mut self, callback: impl FnMut(&str) + Send + 'a) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub(crate) fn report(&mut self, fragment: &str) {
        if let Some(callback) = self.on_progress.as_mut() {
            callback(fragment);
        }
    }
}

impl std::fmt::Debug for GenerationOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationOptions")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Send `messages` and return the full generated text.
    ///
    /// Streaming backends call `options.on_progress` once per decoded
    /// fragment, in arrival order, before returning.
    async fn generate(&self, messages: &[Message], options: GenerationOptions<'_>) -> Result<String>;
}
