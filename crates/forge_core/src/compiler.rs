//! Block compiler
//!
//! Compiles block values, a block order and an optional persona into a
//! [`CompiledPrompt`]. The same compiled value backs both targets: the
//! flattened preview string and the dispatch message list, so the two can
//! never disagree.
//!
//! ```text
//! ## ROLE: <persona name>          -> system message
//! <mindset>
//!
//! ## <first block in order>        -> single user message
//! ...
//! ```

use crate::blocks::{parse_constraints, resolve_output_format, AnnotatedConstraint, BlockKind, BlockOrder, BlockValues, PromptBlock};
use crate::error::CompileResult;
use crate::message::Message;
use crate::persona::Persona;

const SECTION_SEPARATOR: &str = "\n\n";

/// One labeled, non-empty block of compiled output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: BlockKind,
    pub body: String,
}

impl Section {
    pub fn render(&self) -> String {
        format!("## {}\n{}", self.kind.label(), self.body)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledPrompt {
    /// Persona segment, present only when a persona was selected.
    pub system: Option<String>,
    /// Non-empty blocks in block order.
    pub sections: Vec<Section>,
}

impl CompiledPrompt {
    pub fn is_empty(&self) -> bool {
        self.system.is_none() && self.sections.is_empty()
    }

    pub fn section(&self, kind: BlockKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// All sections concatenated, as sent in the user message.
    pub fn user_content(&self) -> Option<String> {
        if self.sections.is_empty() {
            return None;
        }
        Some(
            self.sections
                .iter()
                .map(Section::render)
                .collect::<Vec<_>>()
                .join(SECTION_SEPARATOR),
        )
    }

    /// Single flattened text for display.
    pub fn preview(&self) -> String {
        self.system
            .iter()
            .cloned()
            .chain(self.user_content())
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR)
    }

    /// System message (when a persona is set) followed by exactly one user
    /// message holding every section. Empty input yields no messages.
    pub fn to_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system {
            messages.push(Message::system(system.clone()));
        }
        if let Some(user) = self.user_content() {
            messages.push(Message::user(user));
        }
        messages
    }
}

/// Compile blocks in the given order. Partial orders are accepted.
pub fn compile(order: &BlockOrder, values: &BlockValues, persona: Option<&Persona>) -> CompiledPrompt {
    let sections = order
        .kinds()
        .iter()
        .filter_map(|kind| {
            render_block(&values.block(*kind), persona).map(|body| Section { kind: *kind, body })
        })
        .collect();

    CompiledPrompt {
        system: persona.map(persona_segment),
        sections,
    }
}

pub fn compile_preview(order: &BlockOrder, values: &BlockValues, persona: Option<&Persona>) -> String {
    compile(order, values, persona).preview()
}

/// Compile for dispatch. Requires every block kind to be present in `order`.
pub fn compile_messages(
    order: &BlockOrder,
    values: &BlockValues,
    persona: Option<&Persona>,
) -> CompileResult<Vec<Message>> {
    order.ensure_complete()?;
    Ok(compile(order, values, persona).to_messages())
}

fn persona_segment(persona: &Persona) -> String {
    let mut segment = format!("## ROLE: {}\n{}", persona.name.trim(), persona.mindset.trim());
    let style = persona.thinking_style.trim();
    if !style.is_empty() {
        segment.push_str(SECTION_SEPARATOR);
        segment.push_str("## THINKING STYLE\n");
        segment.push_str(style);
    }
    segment
}

fn render_block(block: &PromptBlock<'_>, persona: Option<&Persona>) -> Option<String> {
    match block {
        // Free text is kept verbatim so piped workflow context survives untouched.
        PromptBlock::Goal(text) | PromptBlock::Context(text) => {
            (!text.trim().is_empty()).then(|| text.to_string())
        }
        PromptBlock::Constraints(raw) => {
            let lines: Vec<String> = persona_constraints(persona)
                .chain(parse_constraints(raw))
                .map(|c| c.render())
                .collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        }
        PromptBlock::OutputFormat(spec) => {
            let fallback = persona.and_then(Persona::output_format_fallback);
            let text = resolve_output_format(spec, fallback);
            (!text.is_empty()).then_some(text)
        }
    }
}

fn persona_constraints(persona: Option<&Persona>) -> impl Iterator<Item = AnnotatedConstraint> + '_ {
    persona
        .into_iter()
        .flat_map(|p| p.constraints.iter())
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| AnnotatedConstraint::neutral(c))
}
