use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Longest query text accepted, in characters
pub const MAX_QUERY_CHARS: usize = 2000;

/// A validated user query: trimmed, non-empty and bounded
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query(String);

impl Query {
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return Err(DomainError::validation("Query cannot be empty"));
        }

        if trimmed.chars().count() > MAX_QUERY_CHARS {
            return Err(DomainError::validation(format!(
                "Query cannot exceed {} characters",
                MAX_QUERY_CHARS
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
