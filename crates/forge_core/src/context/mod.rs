//! Context helpers
//!
//! Utilities for preparing the CONTEXT block: joining captured snippets into
//! one text and guessing what kind of content a text holds.

mod assembly;
mod classifier;

pub use assembly::{assemble_context, ContextSnippet};
pub use classifier::{detect_content_type, ContentType};
