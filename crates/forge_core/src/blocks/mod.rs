//! Prompt blocks and their ordering
//!
//! A prompt is assembled from four block kinds. The user controls the order in
//! which they appear through a [`BlockOrder`]; the content of each block lives
//! in [`BlockValues`].

mod constraints;
mod output_format;

pub use constraints::{annotate, parse_constraints, AnnotatedConstraint, ConstraintKind};
pub use output_format::{resolve_output_format, FieldType, FormatMode, OutputFormatSpec, SchemaField};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Goal,
    Context,
    Constraints,
    OutputFormat,
}

impl BlockKind {
    pub const ALL: [BlockKind; 4] = [
        BlockKind::Goal,
        BlockKind::Context,
        BlockKind::Constraints,
        BlockKind::OutputFormat,
    ];

    /// Section header used in compiled output.
    pub fn label(&self) -> &'static str {
        match self {
            BlockKind::Goal => "GOAL",
            BlockKind::Context => "CONTEXT",
            BlockKind::Constraints => "CONSTRAINTS",
            BlockKind::OutputFormat => "OUTPUT FORMAT",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BlockKind {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "goal" => Ok(BlockKind::Goal),
            "context" => Ok(BlockKind::Context),
            "constraints" => Ok(BlockKind::Constraints),
            "output_format" | "format" => Ok(BlockKind::OutputFormat),
            _ => Err(CompileError::Unrecognized {
                kind: "block",
                value: s.to_string(),
            }),
        }
    }
}

/// Ordered, duplicate-free sequence of block kinds.
///
/// A partial order is valid for previews; dispatch requires all four kinds
/// (see [`BlockOrder::ensure_complete`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<BlockKind>", into = "Vec<BlockKind>")]
pub struct BlockOrder(Vec<BlockKind>);

impl BlockOrder {
    pub fn new(kinds: Vec<BlockKind>) -> CompileResult<Self> {
        for (i, kind) in kinds.iter().enumerate() {
            if kinds[..i].contains(kind) {
                return Err(CompileError::DuplicateBlock(*kind));
            }
        }
        Ok(Self(kinds))
    }

    pub fn kinds(&self) -> &[BlockKind] {
        &self.0
    }

    pub fn missing(&self) -> Vec<BlockKind> {
        BlockKind::ALL
            .into_iter()
            .filter(|kind| !self.0.contains(kind))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.0.len() == BlockKind::ALL.len()
    }

    pub fn ensure_complete(&self) -> CompileResult<()> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CompileError::IncompleteBlockOrder(missing))
        }
    }
}

impl Default for BlockOrder {
    fn default() -> Self {
        Self(BlockKind::ALL.to_vec())
    }
}

impl TryFrom<Vec<BlockKind>> for BlockOrder {
    type Error = CompileError;

    fn try_from(kinds: Vec<BlockKind>) -> Result<Self, Self::Error> {
        Self::new(kinds)
    }
}

impl From<BlockOrder> for Vec<BlockKind> {
    fn from(order: BlockOrder) -> Self {
        order.0
    }
}

/// One block's content, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptBlock<'a> {
    Goal(&'a str),
    Context(&'a str),
    /// Raw, newline separated constraint lines as typed by the user.
    Constraints(&'a str),
    OutputFormat(&'a OutputFormatSpec),
}

impl PromptBlock<'_> {
    pub fn kind(&self) -> BlockKind {
        match self {
            PromptBlock::Goal(_) => BlockKind::Goal,
            PromptBlock::Context(_) => BlockKind::Context,
            PromptBlock::Constraints(_) => BlockKind::Constraints,
            PromptBlock::OutputFormat(_) => BlockKind::OutputFormat,
        }
    }
}

/// Field values of the builder form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockValues {
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub constraints: String,
    #[serde(default)]
    pub output_format: OutputFormatSpec,
}

impl BlockValues {
    pub fn block(&self, kind: BlockKind) -> PromptBlock<'_> {
        match kind {
            BlockKind::Goal => PromptBlock::Goal(&self.goal),
            BlockKind::Context => PromptBlock::Context(&self.context),
            BlockKind::Constraints => PromptBlock::Constraints(&self.constraints),
            BlockKind::OutputFormat => PromptBlock::OutputFormat(&self.output_format),
        }
    }
}
