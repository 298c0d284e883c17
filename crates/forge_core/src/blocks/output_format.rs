//! Output format resolution
//!
//! Turns the output-format block into instruction text. Structured mode
//! describes a JSON object shape in plain text; it is guidance for the model,
//! not an enforced schema.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FormatMode {
    #[default]
    Simple,
    Structured,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }
}

impl FromStr for FieldType {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" => Ok(FieldType::String),
            "number" => Ok(FieldType::Number),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "array" => Ok(FieldType::Array),
            "object" => Ok(FieldType::Object),
            _ => Err(CompileError::Unrecognized {
                kind: "field type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaField {
    pub key: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub description: String,
}

impl SchemaField {
    pub fn new(key: impl Into<String>, field_type: FieldType, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field_type,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OutputFormatSpec {
    #[serde(default)]
    pub mode: FormatMode,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

impl OutputFormatSpec {
    pub fn simple(raw_text: impl Into<String>) -> Self {
        Self {
            mode: FormatMode::Simple,
            raw_text: raw_text.into(),
            fields: Vec::new(),
        }
    }

    pub fn structured(fields: Vec<SchemaField>) -> Self {
        Self {
            mode: FormatMode::Structured,
            raw_text: String::new(),
            fields,
        }
    }
}

/// Resolve an output-format spec into instruction text.
///
/// Returns an empty string when neither the spec nor the fallback carry any
/// text. Fields with a blank key are not rendered.
pub fn resolve_output_format(spec: &OutputFormatSpec, fallback: Option<&str>) -> String {
    let use_fallback = || fallback.map(str::trim).unwrap_or_default().to_string();

    match spec.mode {
        FormatMode::Simple => {
            let text = spec.raw_text.trim();
            if text.is_empty() {
                use_fallback()
            } else {
                text.to_string()
            }
        }
        FormatMode::Structured => {
            let fields: Vec<&SchemaField> =
                spec.fields.iter().filter(|f| !f.key.trim().is_empty()).collect();
            if fields.is_empty() {
                return use_fallback();
            }
            render_schema(&fields)
        }
    }
}

fn render_schema(fields: &[&SchemaField]) -> String {
    let mut lines = Vec::with_capacity(fields.len() + 3);
    lines.push("Respond with a single JSON object matching this shape:".to_string());
    lines.push("{".to_string());

    let last = fields.len() - 1;
    for (i, field) in fields.iter().enumerate() {
        let comma = if i == last { "" } else { "," };
        let mut line = format!(
            "  \"{}\": [{}]{}",
            field.key.trim(),
            field.field_type.as_str(),
            comma
        );
        let description = field.description.trim();
        if !description.is_empty() {
            line.push_str(" // ");
            line.push_str(description);
        }
        lines.push(line);
    }

    lines.push("}".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_mode_trims_text() {
        let spec = OutputFormatSpec::simple("  Markdown table \n");
        assert_eq!(resolve_output_format(&spec, Some("ignored")), "Markdown table");
    }

    #[test]
    fn simple_mode_falls_back_when_empty() {
        let spec = OutputFormatSpec::simple("   ");
        assert_eq!(resolve_output_format(&spec, Some("Bullet list")), "Bullet list");
        assert_eq!(resolve_output_format(&spec, None), "");
    }

    #[test]
    fn structured_mode_renders_fields_in_order() {
        let spec = OutputFormatSpec::structured(vec![
            SchemaField::new("title", FieldType::String, "Short title"),
            SchemaField::new("score", FieldType::Number, ""),
            SchemaField::new("tags", FieldType::Array, "Lowercase tags"),
        ]);

        let out = resolve_output_format(&spec, None);
        assert_eq!(
            out,
            "Respond with a single JSON object matching this shape:\n\
             {\n  \"title\": [string], // Short title\n  \"score\": [number],\n  \"tags\": [array] // Lowercase tags\n}"
        );
    }

    #[test]
    fn structured_mode_ignores_raw_text() {
        let mut spec = OutputFormatSpec::structured(vec![SchemaField::new(
            "ok",
            FieldType::Boolean,
            "",
        )]);
        spec.raw_text = "prose".into();
        let out = resolve_output_format(&spec, None);
        assert!(out.contains("\"ok\": [boolean]"));
        assert!(!out.contains("prose"));
    }

    #[test]
    fn empty_structured_equals_empty_simple() {
        let structured = OutputFormatSpec::structured(Vec::new());
        let simple = OutputFormatSpec::simple("");
        for fallback in [None, Some(""), Some("YAML"), Some("  padded  ")] {
            assert_eq!(
                resolve_output_format(&structured, fallback),
                resolve_output_format(&simple, fallback)
            );
        }
    }

    #[test]
    fn blank_keys_count_as_no_fields() {
        let spec = OutputFormatSpec::structured(vec![SchemaField::new(" ", FieldType::Object, "x")]);
        assert_eq!(resolve_output_format(&spec, Some("hint")), "hint");
    }

    #[test]
    fn field_types_parse() {
        assert_eq!("Number".parse::<FieldType>().unwrap(), FieldType::Number);
        assert_eq!("bool".parse::<FieldType>().unwrap(), FieldType::Boolean);
        assert!("date".parse::<FieldType>().is_err());
    }

    #[test]
    fn spec_deserializes_with_defaults() {
        let spec: OutputFormatSpec = serde_json::from_str(
            r#"{"mode":"structured","fields":[{"key":"a","type":"object"}]}"#,
        )
        .unwrap();
        assert_eq!(spec.fields[0].field_type, FieldType::Object);
        assert!(spec.raw_text.is_empty());
    }
}
