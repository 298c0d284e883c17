//! Vendor error envelopes.
//!
//! Hosted backends wrap failures as `{"error":{"message":...}}`, Ollama uses
//! `{"error":"..."}` and Gemini sometimes returns the envelope inside an
//! array. Anything else falls back to the HTTP status text.

use reqwest::{Response, StatusCode};
use serde_json::Value;

use crate::provider::LLMError;

/// Best-effort vendor message from an error body. Never fails.
pub fn error_message_from_body(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let envelope = match &value {
        Value::Array(items) => items.first()?,
        other => other,
    };

    let error = envelope.get("error")?;
    let message = match error {
        Value::String(message) => message.as_str(),
        other => other.get("message")?.as_str()?,
    };
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Consume a non-success response into a backend error.
pub async fn backend_error(provider: &'static str, response: Response) -> LLMError {
    let status = response.status();
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            log::debug!("{provider}: failed to read error body: {e}");
            Default::default()
        }
    };

    let message = error_message_from_body(&body).unwrap_or_else(|| status_text(status));
    log::warn!("{provider} request failed with {status}: {message}");

    LLMError::Backend {
        provider,
        status: Some(status.as_u16()),
        message,
    }
}
