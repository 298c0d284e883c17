use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Sql,
    Log,
    Code { language: Option<&'static str> },
    Text,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "json",
            ContentType::Sql => "sql",
            ContentType::Log => "log",
            ContentType::Code { .. } => "code",
            ContentType::Text => "text",
        }
    }
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("classifier patterns are valid")
}

static SQL_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)\b(SELECT|INSERT|UPDATE|DELETE|CREATE|ALTER|DROP|FROM|WHERE|GROUP BY|ORDER BY|JOIN)\b")
});

static LOG_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // stack frame
        regex(r"at .*\((.*):(\d+):(\d+)\)"),
        regex(r"\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\]"),
        regex(r"(?i)\d{2}:\d{2}:\d{2}\s+(INFO|ERROR|WARN|DEBUG|TRACE)"),
        regex(r"(?i)Error: .*\n\s+at "),
    ]
});

static CODE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        regex(r"\b(function|const|let|var|class|export|import|if|else|return|switch|case|break)\b"),
        regex(r"\b(def|class|if|elif|else|import|from|return|yield|with|as)\b"),
        regex(r"\b(fn|pub|use|let|mut|match|impl|trait|struct|enum)\b"),
        regex(r"[{};]"),
        regex(r"=>"),
    ]
});

static TYPESCRIPT_HINT: Lazy<Regex> = Lazy::new(|| regex(r"\b(const|let|var|function|export|import)\b"));
static PYTHON_HINT: Lazy<Regex> = Lazy::new(|| regex(r"\b(def|class|import|from)\b"));
static RUST_HINT: Lazy<Regex> = Lazy::new(|| regex(r"\b(pub|fn|use|let|match)\b"));

/// Guess the kind of content held by `text`.
///
/// Checks run from most to least specific: JSON, SQL, logs, code, text.
pub fn detect_content_type(text: &str) -> ContentType {
    let trimmed = text.trim();

    let looks_like_json = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if looks_like_json && serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return ContentType::Json;
    }

    if SQL_KEYWORDS.is_match(trimmed) {
        return ContentType::Sql;
    }

    if LOG_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        return ContentType::Log;
    }

    if CODE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        let language = if TYPESCRIPT_HINT.is_match(trimmed) {
            Some("typescript")
        } else if PYTHON_HINT.is_match(trimmed) {
            Some("python")
        } else if RUST_HINT.is_match(trimmed) {
            Some("rust")
        } else {
            None
        };
        return ContentType::Code { language };
    }

    ContentType::Text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_json() {
        assert_eq!(detect_content_type(r#" {"a": [1, 2]} "#), ContentType::Json);
        assert_eq!(detect_content_type("[1, 2, 3]"), ContentType::Json);
    }

    #[test]
    fn broken_json_is_not_json() {
        assert_ne!(detect_content_type(r#"{"a": }"#), ContentType::Json);
    }

    #[test]
    fn detects_sql() {
        assert_eq!(detect_content_type("select id from users"), ContentType::Sql);
    }

    #[test]
    fn detects_logs() {
        assert_eq!(
            detect_content_type("[2024-01-02 10:11:12] worker started"),
            ContentType::Log
        );
        assert_eq!(detect_content_type("10:11:12 ERROR boom"), ContentType::Log);
    }

    #[test]
    fn detects_code_language() {
        assert_eq!(
            detect_content_type("const x = 1;"),
            ContentType::Code { language: Some("typescript") }
        );
        assert_eq!(
            detect_content_type("def main():\n    pass"),
            ContentType::Code { language: Some("python") }
        );
        assert_eq!(
            detect_content_type("pub fn main() {}"),
            ContentType::Code { language: Some("rust") }
        );
        assert_eq!(detect_content_type("a => b"), ContentType::Code { language: None });
    }

    #[test]
    fn plain_prose_is_text() {
        assert_eq!(detect_content_type("Hello there, nice day"), ContentType::Text);
        assert_eq!(ContentType::Text.as_str(), "text");
    }
}
