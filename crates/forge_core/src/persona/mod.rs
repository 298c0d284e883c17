//! Persona - Role definitions applied on top of a prompt
//!
//! A persona supplies the leading system segment of a compiled prompt, a set
//! of neutral constraints and an output-format hint used when the user leaves
//! the output format empty.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static BUILTIN_PERSONAS: Lazy<Vec<Persona>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../data/personas.json"))
        .expect("built-in persona catalog must be valid JSON")
});

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub mindset: String,
    #[serde(default)]
    pub thinking_style: String,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub output_format_hint: String,
    /// Review questions shown next to the result; never compiled into the prompt.
    #[serde(default)]
    pub evaluation_checklist: Vec<String>,
    #[serde(default)]
    pub is_custom: bool,
}

impl Persona {
    pub fn new(id: impl Into<String>, name: impl Into<String>, mindset: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mindset: mindset.into(),
            thinking_style: String::new(),
            constraints: Vec::new(),
            output_format_hint: String::new(),
            evaluation_checklist: Vec::new(),
            is_custom: true,
        }
    }

    pub fn with_thinking_style(mut self, style: impl Into<String>) -> Self {
        self.thinking_style = style.into();
        self
    }

    pub fn with_constraints<I, S>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints = constraints.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_output_format_hint(mut self, hint: impl Into<String>) -> Self {
        self.output_format_hint = hint.into();
        self
    }

    /// The hint as an optional fallback, `None` when blank.
    pub fn output_format_fallback(&self) -> Option<&str> {
        let hint = self.output_format_hint.trim();
        (!hint.is_empty()).then_some(hint)
    }
}

/// The personas shipped with the application.
pub fn builtin_personas() -> &'static [Persona] {
    BUILTIN_PERSONAS.as_slice()
}

pub fn find_persona<'a>(personas: &'a [Persona], id: &str) -> Option<&'a Persona> {
    personas.iter().find(|p| p.id == id)
}
