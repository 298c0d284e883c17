//! Workflow-related type definitions

use std::path::Path;

use forge_core::CompileError;
use forge_llm::LLMError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Workflow execution errors
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Workflow has no steps: {0}")]
    EmptyWorkflow(String),

    #[error("Step {step} could not be compiled: {source}")]
    Compile {
        step: usize,
        #[source]
        source: CompileError,
    },

    #[error("Step {step} ({node}) compiled to no user content")]
    EmptyStep { step: usize, node: String },

    #[error("Failed to load workflow: {0}")]
    Load(String),

    #[error(transparent)]
    Llm(#[from] LLMError),
}

/// One step of a workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: String,
    pub persona_id: String,
    #[serde(default)]
    pub goal: String,
    /// Replaces the persona's output format hint for this step.
    #[serde(default, rename = "outputFormat", alias = "outputFormatOverride", skip_serializing_if = "Option::is_none")]
    pub output_format_override: Option<String>,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, persona_id: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            persona_id: persona_id.into(),
            goal: goal.into(),
            output_format_override: None,
        }
    }

    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format_override = Some(format.into());
        self
    }
}

/// An ordered chain of steps; each step's output becomes the next step's context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub nodes: Vec<WorkflowNode>,
}

impl Workflow {
    /// Load a workflow definition from a JSON file.
    pub fn load(path: &Path) -> Result<Self, WorkflowError> {
        forge_core::paths::load_json(path).map_err(WorkflowError::Load)
    }
}
