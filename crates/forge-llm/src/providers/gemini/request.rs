//! Gemini `generateContent` request shape.
//!
//! Gemini only knows `user` and `model` turns, requires them to alternate
//! and expects the conversation to open with a user turn. System text moves
//! to `system_instruction`.

use forge_core::{Message, Role};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "system_instruction", skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        Role::User | Role::System => "user",
    }
}

impl Content {
    fn text(role: Option<&'static str>, text: String) -> Self {
        Self {
            role,
            parts: vec![Part { text }],
        }
    }
}

/// Turn normalized messages into alternating Gemini contents.
///
/// Adjacent same-role turns are merged with a newline; a leading model turn
/// is dropped.
pub fn build_contents(messages: &[Message]) -> Vec<Content> {
    let mut turns: Vec<(&'static str, String)> = Vec::new();

    for message in messages.iter().filter(|m| m.role != Role::System) {
        let role = gemini_role(message.role);
        match turns.last_mut() {
            Some((last_role, text)) if *last_role == role => {
                text.push('\n');
                text.push_str(&message.content);
            }
            _ => turns.push((role, message.content.clone())),
        }
    }

    if matches!(turns.first(), Some((role, _)) if *role != "user") {
        let (role, _) = turns.remove(0);
        log::debug!("Gemini: dropping leading {role} turn");
    }

    turns
        .into_iter()
        .map(|(role, text)| Content::text(Some(role), text))
        .collect()
}

pub fn build_request(messages: &[Message], temperature: f32, max_output_tokens: Option<u32>) -> GenerateContentRequest {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    GenerateContentRequest {
        contents: build_contents(messages),
        system_instruction: (!system.is_empty()).then(|| Content::text(None, system.join("\n\n"))),
        generation_config: GenerationConfig {
            temperature,
            max_output_tokens,
        },
    }
}
