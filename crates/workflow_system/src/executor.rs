//! Workflow executor implementation

use forge_core::{compile_messages, find_persona, BlockOrder, BlockValues, Config, Message, OutputFormatSpec, Persona, Role};
use forge_llm::{create_provider, GenerationOptions, LLMProvider, Provider};

use crate::types::{Workflow, WorkflowError, WorkflowNode};

/// Output cap sent with every step.
pub const DEFAULT_STEP_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Runs workflows step by step against a single provider.
pub struct WorkflowExecutor<P: LLMProvider> {
    provider: P,
    personas: Vec<Persona>,
    model: String,
    max_output_tokens: Option<u32>,
}

impl WorkflowExecutor<Provider> {
    /// Executor backed by the provider serving `config.default_model`.
    pub fn from_config(config: &Config, personas: Vec<Persona>) -> Result<Self, WorkflowError> {
        let provider = create_provider(config, &config.default_model)?;
        Ok(Self::new(provider, personas, config.default_model.clone()))
    }
}

impl<P: LLMProvider> WorkflowExecutor<P> {
    pub fn new(provider: P, personas: Vec<Persona>, model: impl Into<String>) -> Self {
        Self {
            provider,
            personas,
            model: model.into(),
            max_output_tokens: Some(DEFAULT_STEP_MAX_OUTPUT_TOKENS),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Messages sent for `node` when the running context is `context`.
    pub fn compile_step(&self, step: usize, node: &WorkflowNode, context: &str) -> Result<Vec<Message>, WorkflowError> {
        compile_node(step, node, self.persona_for(node), context)
    }

    fn persona_for(&self, node: &WorkflowNode) -> Option<&Persona> {
        let persona = find_persona(&self.personas, &node.persona_id);
        if persona.is_none() {
            log::warn!(
                "Workflow step '{}' references unknown persona '{}', compiling without one",
                node.id,
                node.persona_id
            );
        }
        persona
    }

    /// Run every step in order and return the last step's output.
    ///
    /// `on_step` receives the step index, its full output and the persona
    /// name (or node id when the persona is unknown). The first failing step
    /// aborts the run.
    pub async fn run<F>(&self, workflow: &Workflow, initial_context: &str, mut on_step: F) -> Result<String, WorkflowError>
    where
        F: FnMut(usize, &str, &str) + Send,
    {
        if workflow.nodes.is_empty() {
            return Err(WorkflowError::EmptyWorkflow(workflow.id.clone()));
        }

        log::info!(
            "Running workflow '{}' ({} steps) with {} model '{}'",
            workflow.name,
            workflow.nodes.len(),
            self.provider.name(),
            self.model
        );

        let mut context = initial_context.to_string();
        for (step, node) in workflow.nodes.iter().enumerate() {
            let persona = self.persona_for(node);
            let messages = compile_node(step, node, persona, &context)?;

            let mut options = GenerationOptions::new(self.model.clone());
            options.max_output_tokens = self.max_output_tokens;

            let result = self.provider.generate(&messages, options).await.map_err(|e| {
                log::error!("Workflow '{}' failed at step {} ({}): {}", workflow.id, step, node.id, e);
                e
            })?;

            let label = persona
                .map(|p| p.name.as_str())
                .unwrap_or(node.id.as_str());
            log::debug!("Workflow '{}' step {} ({}) produced {} bytes", workflow.id, step, label, result.len());
            on_step(step, &result, label);

            context = result;
        }

        Ok(context)
    }
}

/// Persona, goal and running context through the block compiler. The node's
/// override wins over the persona's output format hint.
///
/// Steps carry the persona's mindset, thinking style and format hint only;
/// its constraint list is never sent.
fn compile_node(
    step: usize,
    node: &WorkflowNode,
    persona: Option<&Persona>,
    context: &str,
) -> Result<Vec<Message>, WorkflowError> {
    let values = BlockValues {
        goal: node.goal.clone(),
        context: context.to_string(),
        constraints: String::new(),
        output_format: OutputFormatSpec::simple(node.output_format_override.clone().unwrap_or_default()),
    };
    let persona = persona.map(|p| Persona {
        constraints: Vec::new(),
        ..p.clone()
    });

    let messages = compile_messages(&BlockOrder::default(), &values, persona.as_ref())
        .map_err(|source| WorkflowError::Compile { step, source })?;

    if !messages.iter().any(|m| m.role == Role::User) {
        return Err(WorkflowError::EmptyStep {
            step,
            node: node.id.clone(),
        });
    }
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use forge_core::builtin_personas;
    use forge_llm::Result as LLMResult;

    struct NeverCalled;

    #[async_trait]
    impl LLMProvider for NeverCalled {
        fn name(&self) -> &'static str {
            "never"
        }

        async fn generate(&self, _messages: &[Message], _options: GenerationOptions<'_>) -> LLMResult<String> {
            panic!("provider should not be called");
        }
    }

    fn executor() -> WorkflowExecutor<NeverCalled> {
        WorkflowExecutor::new(NeverCalled, builtin_personas().to_vec(), "llama3")
    }

    #[test]
    fn step_uses_persona_and_context() {
        let persona = &builtin_personas()[0];
        let node = WorkflowNode::new("n1", persona.id.clone(), "Plan the feature");
        let messages = executor().compile_step(0, &node, "previous output").unwrap();

        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.starts_with(&format!("## ROLE: {}", persona.name)));
        assert!(messages[1].content.contains("## GOAL\nPlan the feature"));
        assert!(messages[1].content.contains("## CONTEXT\nprevious output"));
    }

    #[test]
    fn override_replaces_persona_hint() {
        let persona = &builtin_personas()[0];
        let node = WorkflowNode::new("n1", persona.id.clone(), "g").with_output_format("Exactly three bullets");
        let messages = executor().compile_step(0, &node, "").unwrap();
        assert!(messages[1].content.ends_with("## OUTPUT FORMAT\nExactly three bullets"));
    }

    #[test]
    fn unknown_persona_compiles_without_system_message() {
        let node = WorkflowNode::new("n1", "nobody", "g");
        let messages = executor().compile_step(0, &node, "ctx").unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
    }

    #[test]
    fn persona_constraints_are_not_sent() {
        let persona = &builtin_personas()[0];
        assert!(!persona.constraints.is_empty());

        let node = WorkflowNode::new("n1", persona.id.clone(), "summarize");
        let messages = executor().compile_step(0, &node, "notes").unwrap();

        assert!(messages.iter().all(|m| !m.content.contains("## CONSTRAINTS")));
        for constraint in &persona.constraints {
            assert!(!messages[1].content.contains(constraint.as_str()));
        }
        assert!(messages[0].content.contains(persona.mindset.trim()));
    }

    #[test]
    fn step_with_nothing_to_send_is_rejected() {
        let node = WorkflowNode::new("blank", "nobody", "");
        let err = executor().compile_step(2, &node, "  ").unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyStep { step: 2, ref node } if node == "blank"));

        let persona = Persona::new("bare", "Bare", "Terse.");
        let node = WorkflowNode::new("n", "bare", "");
        let err = compile_node(0, &node, Some(&persona), "").unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyStep { .. }));
    }

    #[test]
    fn empty_workflow_is_rejected() {
        let workflow = Workflow {
            id: "empty".into(),
            name: "Empty".into(),
            description: String::new(),
            nodes: Vec::new(),
        };
        let err = tokio_test::block_on(executor().run(&workflow, "ctx", |_, _, _| {})).unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyWorkflow(id) if id == "empty"));
    }
}
