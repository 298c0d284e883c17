//! forge_core - Core types for the PromptForge engine
//!
//! This crate provides everything that does not touch the network:
//! - `message` - Role and Message, the normalized dispatch unit
//! - `persona` - Persona definitions and the built-in catalog
//! - `blocks` - Prompt blocks, block ordering, constraints and output formats
//! - `compiler` - Deterministic compilation of blocks into a prompt
//! - `context` - Context snippet assembly and content classification
//! - `config` - Settings snapshot consumed by the provider layer

pub mod blocks;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod paths;
pub mod persona;

// Re-export commonly used types
pub use blocks::{
    annotate, parse_constraints, resolve_output_format, AnnotatedConstraint, BlockKind,
    BlockOrder, BlockValues, ConstraintKind, FieldType, FormatMode, OutputFormatSpec,
    PromptBlock, SchemaField,
};
pub use compiler::{compile, compile_messages, compile_preview, CompiledPrompt, Section};
pub use config::Config;
pub use context::{assemble_context, detect_content_type, ContentType, ContextSnippet};
pub use error::CompileError;
pub use message::{Message, Role};
pub use persona::{builtin_personas, find_persona, Persona};
