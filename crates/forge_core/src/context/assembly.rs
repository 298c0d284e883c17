use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const RULE: &str = "----------------------------------------";

/// A piece of captured text destined for the CONTEXT block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextSnippet {
    pub content: String,
    pub captured_at: DateTime<Utc>,
}

impl ContextSnippet {
    pub fn new(content: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            captured_at,
        }
    }
}

/// Join snippets into a single context text, oldest first.
///
/// A single snippet is returned verbatim; several are numbered and fenced
/// with their capture time.
pub fn assemble_context(snippets: &[ContextSnippet]) -> String {
    match snippets {
        [] => String::new(),
        [only] => only.content.clone(),
        _ => {
            let mut ordered: Vec<&ContextSnippet> = snippets.iter().collect();
            ordered.sort_by_key(|s| s.captured_at);

            ordered
                .iter()
                .enumerate()
                .map(|(index, snippet)| {
                    format!(
                        "### CLIPBOARD SNIPPET {}\nCaptured: {}\n{RULE}\n{}\n{RULE}\n",
                        index + 1,
                        snippet.captured_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        snippet.content
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}
