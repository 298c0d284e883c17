//! Block arguments shared by `compile` and `generate`.

use std::path::PathBuf;

use anyhow::{anyhow, Context as _};
use chrono::{DateTime, Utc};
use clap::Args;
use forge_core::{
    assemble_context, find_persona, BlockKind, BlockOrder, BlockValues, ContextSnippet, FieldType,
    OutputFormatSpec, Persona, SchemaField,
};

#[derive(Args, Debug, Default)]
pub struct BlockArgs {
    /// What the model should accomplish
    #[arg(long, short, default_value = "")]
    pub goal: String,

    /// Context text
    #[arg(long, short, conflicts_with = "snippets")]
    pub context: Option<String>,

    /// Context snippet files, merged oldest first (repeatable)
    #[arg(long = "snippet", value_name = "FILE")]
    pub snippets: Vec<PathBuf>,

    /// Constraint line; prefix with ! for critical or ? for optional (repeatable)
    #[arg(long = "constraint", short = 'k', value_name = "LINE")]
    pub constraints: Vec<String>,

    /// Free-text output format
    #[arg(long, conflicts_with = "fields")]
    pub format: Option<String>,

    /// Structured output field as key:type[:description] (repeatable)
    #[arg(long = "field", value_name = "FIELD", value_parser = parse_field)]
    pub fields: Vec<SchemaField>,

    /// Persona id from the built-in catalog
    #[arg(long, short)]
    pub persona: Option<String>,

    /// Block order, comma separated (goal,context,constraints,output_format)
    #[arg(long, value_delimiter = ',')]
    pub order: Option<Vec<BlockKind>>,
}

/// Parse `key:type[:description]`; the type defaults to string.
pub fn parse_field(raw: &str) -> Result<SchemaField, String> {
    let mut parts = raw.splitn(3, ':');
    let key = parts.next().unwrap_or_default().trim();
    if key.is_empty() {
        return Err(format!("field '{raw}' has no key"));
    }
    let field_type = match parts.next().map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t.parse::<FieldType>().map_err(|e| e.to_string())?,
        None => FieldType::String,
    };
    let description = parts.next().unwrap_or_default().trim();
    Ok(SchemaField::new(key, field_type, description))
}

pub struct ResolvedBlocks<'a> {
    pub order: BlockOrder,
    pub values: BlockValues,
    pub persona: Option<&'a Persona>,
}

impl BlockArgs {
    pub fn resolve<'a>(&self, personas: &'a [Persona]) -> anyhow::Result<ResolvedBlocks<'a>> {
        let persona = match &self.persona {
            Some(id) => Some(find_persona(personas, id).ok_or_else(|| anyhow!("Unknown persona: {id}"))?),
            None => None,
        };

        let order = match &self.order {
            Some(kinds) => BlockOrder::new(kinds.clone())?,
            None => BlockOrder::default(),
        };

        let output_format = if self.fields.is_empty() {
            OutputFormatSpec::simple(self.format.clone().unwrap_or_default())
        } else {
            OutputFormatSpec::structured(self.fields.clone())
        };

        let values = BlockValues {
            goal: self.goal.clone(),
            context: self.context_text()?,
            constraints: self.constraints.join("\n"),
            output_format,
        };

        Ok(ResolvedBlocks {
            order,
            values,
            persona,
        })
    }

    fn context_text(&self) -> anyhow::Result<String> {
        if let Some(context) = &self.context {
            return Ok(context.clone());
        }

        let snippets = self
            .snippets
            .iter()
            .map(|path| {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read snippet {}", path.display()))?;
                let captured_at: DateTime<Utc> = std::fs::metadata(path)
                    .and_then(|m| m.modified())
                    .map(DateTime::from)
                    .unwrap_or_else(|_| Utc::now());
                Ok(ContextSnippet::new(content, captured_at))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(assemble_context(&snippets))
    }
}
