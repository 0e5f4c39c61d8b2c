//! Tool argument extraction helpers

use once_cell::sync::Lazy;
use regex::Regex;

use super::ToolKind;

/// Upper bound on the argument passed to a tool
pub const MAX_ARGUMENT_CHARS: usize = 100;

static LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:in|for|at)\s+(.+?)[\s?.!,]*$").expect("valid location regex")
});

static TOPIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:about|on|regarding|for|in)\s+(.+?)[\s?.!,]*$").expect("valid topic regex")
});

static TRAILING_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:today|tomorrow|tonight|now|right now|this (?:morning|afternoon|evening|week))$")
        .expect("valid time regex")
});

static LEADING_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:the|a|an)\s+").expect("valid article regex"));

const NEWS_FALLBACK_TOPIC: &str = "latest";

/// Deterministic argument extraction used when the model cannot provide one
pub fn extract_argument_heuristic(kind: ToolKind, query: &str) -> String {
    let query = query.trim();

    let extracted = match kind {
        ToolKind::Weather => LOCATION
            .captures(query)
            .and_then(|c| c.get(1))
            .map(|m| TRAILING_TIME.replace(m.as_str(), "").into_owned()),
        ToolKind::News => TOPIC
            .captures(query)
            .and_then(|c| c.get(1))
            .map(|m| LEADING_ARTICLE.replace(m.as_str(), "").into_owned()),
    }
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty());

    let argument = match (kind, extracted) {
        (_, Some(argument)) => argument,
        (ToolKind::Weather, None) => query.trim_end_matches(['?', '.', '!']).to_string(),
        (ToolKind::News, None) => NEWS_FALLBACK_TOPIC.to_string(),
    };

    truncate_chars(&argument, MAX_ARGUMENT_CHARS)
}

/// Validate an argument returned by the model.
///
/// Accepts a single non-empty line of at most `MAX_ARGUMENT_CHARS`
/// characters; surrounding quotes and trailing punctuation are stripped.
/// A literal `NONE` means the model found nothing.
pub fn normalize_extracted_argument(output: &str) -> Option<String> {
    let trimmed = output.trim();

    if trimmed.is_empty() || trimmed.contains('\n') {
        return None;
    }

    let cleaned = trimmed
        .trim_end_matches(['.', '!', '?'])
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim_end_matches(['.', '!', '?'])
        .trim();

    if cleaned.is_empty()
        || cleaned.eq_ignore_ascii_case("none")
        || cleaned.chars().count() > MAX_ARGUMENT_CHARS
    {
        return None;
    }

    Some(cleaned.to_string())
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
