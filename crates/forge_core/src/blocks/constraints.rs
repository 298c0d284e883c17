//! Constraint annotation
//!
//! Users prefix a constraint line with `!` to mark it critical or `?` to mark
//! it optional. The marker only changes how the line is wrapped in the
//! compiled prompt.

use serde::{Deserialize, Serialize};

const CRITICAL_MARKER: char = '!';
const OPTIONAL_MARKER: char = '?';

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Critical,
    Optional,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotatedConstraint {
    pub kind: ConstraintKind,
    /// Line text without its marker.
    pub text: String,
}

impl AnnotatedConstraint {
    pub fn neutral(text: impl Into<String>) -> Self {
        Self {
            kind: ConstraintKind::Neutral,
            text: text.into(),
        }
    }

    /// Bullet line as it appears in the CONSTRAINTS section.
    pub fn render(&self) -> String {
        match self.kind {
            ConstraintKind::Critical => format!("- <critical>{}</critical>", self.text),
            ConstraintKind::Optional => format!("- <optional>{}</optional>", self.text),
            ConstraintKind::Neutral => format!("- {}", self.text),
        }
    }
}

/// Annotate a single raw line. Blank lines yield `None`.
pub fn annotate(raw_line: &str) -> Option<AnnotatedConstraint> {
    let line = raw_line.trim();
    if line.is_empty() {
        return None;
    }

    let (kind, text) = if let Some(rest) = line.strip_prefix(CRITICAL_MARKER) {
        (ConstraintKind::Critical, rest.trim_start())
    } else if let Some(rest) = line.strip_prefix(OPTIONAL_MARKER) {
        (ConstraintKind::Optional, rest.trim_start())
    } else {
        (ConstraintKind::Neutral, line)
    };

    Some(AnnotatedConstraint {
        kind,
        text: text.to_string(),
    })
}

/// Annotate every line of a multi-line constraint field, in order.
///
/// A line consisting of a bare marker carries no constraint and is dropped.
pub fn parse_constraints(raw: &str) -> Vec<AnnotatedConstraint> {
    raw.lines()
        .filter_map(annotate)
        .filter(|c| !c.text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_select_kind() {
        assert_eq!(annotate("! never log secrets").unwrap().kind, ConstraintKind::Critical);
        assert_eq!(annotate("?add examples").unwrap().kind, ConstraintKind::Optional);
        assert_eq!(annotate("be brief").unwrap().kind, ConstraintKind::Neutral);
    }

    #[test]
    fn marker_and_following_whitespace_are_stripped() {
        let c = annotate("   !   keep it short  ").unwrap();
        assert_eq!(c.text, "keep it short");
    }

    #[test]
    fn only_one_marker_is_stripped() {
        let c = annotate("!!urgent").unwrap();
        assert_eq!(c.kind, ConstraintKind::Critical);
        assert_eq!(c.text, "!urgent");

        let c = annotate("?!maybe").unwrap();
        assert_eq!(c.kind, ConstraintKind::Optional);
        assert_eq!(c.text, "!maybe");
    }

    #[test]
    fn blank_lines_are_discarded() {
        assert!(annotate("").is_none());
        assert!(annotate("  \t ").is_none());
    }

    #[test]
    fn stripping_the_tag_recovers_the_line() {
        let lines = [
            "plain line",
            "!critical",
            "! spaced critical",
            "?optional",
            "?   very optional",
            "mid ! marker",
            "!",
        ];
        for raw in lines {
            let trimmed = raw.trim();
            let c = annotate(raw).unwrap();
            let expected = match c.kind {
                ConstraintKind::Critical => trimmed[1..].trim_start(),
                ConstraintKind::Optional => trimmed[1..].trim_start(),
                ConstraintKind::Neutral => trimmed,
            };
            assert_eq!(c.text, expected, "line {raw:?}");
        }
    }

    #[test]
    fn render_wraps_marked_lines() {
        assert_eq!(annotate("!a").unwrap().render(), "- <critical>a</critical>");
        assert_eq!(annotate("?b").unwrap().render(), "- <optional>b</optional>");
        assert_eq!(annotate("c").unwrap().render(), "- c");
    }

    #[test]
    fn parse_keeps_order_and_skips_empty() {
        let parsed = parse_constraints("first\n\n  !second\r\n!\n?third\n");
        let texts: Vec<_> = parsed.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }
}
