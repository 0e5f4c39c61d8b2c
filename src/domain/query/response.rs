use serde::Serialize;

/// Prefix shown in front of answers served from the semantic cache
pub const CACHE_MARKER: &str = "[From Cache]";

const FAILURE_MARKERS: [&str; 2] = ["Error", "Sorry"];

/// Terminal state a query ended in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrigin {
    /// Answer reused from the semantic cache
    Cache,
    /// Answer freshly produced by a tool
    Fresh,
    /// Query routed to no category
    Refusal,
    /// A collaborator failed; the text describes the failure
    Failure,
}

impl ResponseOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseOrigin::Cache => "cache",
            ResponseOrigin::Fresh => "fresh",
            ResponseOrigin::Refusal => "refusal",
            ResponseOrigin::Failure => "failure",
        }
    }
}

/// Text answer plus the state it was produced in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResponse {
    pub text: String,
    pub origin: ResponseOrigin,
}

impl QueryResponse {
    pub fn cached(text: impl Into<String>) -> Self {
        Self::new(text, ResponseOrigin::Cache)
    }

    pub fn fresh(text: impl Into<String>) -> Self {
        Self::new(text, ResponseOrigin::Fresh)
    }

    pub fn refusal(text: impl Into<String>) -> Self {
        Self::new(text, ResponseOrigin::Refusal)
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self::new(text, ResponseOrigin::Failure)
    }

    fn new(text: impl Into<String>, origin: ResponseOrigin) -> Self {
        Self {
            text: text.into(),
            origin,
        }
    }

    pub fn is_from_cache(&self) -> bool {
        self.origin == ResponseOrigin::Cache
    }

    /// Single cache-write gate for the query flow.
    ///
    /// Only fresh answers are written. `legacy_marker_gate` additionally
    /// rejects fresh text containing a failure marker; that heuristic can
    /// reject legitimate answers (a headline mentioning an "Error") and is
    /// off unless configured.
    pub fn is_cacheable(&self, legacy_marker_gate: bool) -> bool {
        match self.origin {
            ResponseOrigin::Fresh => !(legacy_marker_gate && contains_failure_marker(&self.text)),
            ResponseOrigin::Cache | ResponseOrigin::Refusal | ResponseOrigin::Failure => false,
        }
    }
}

/// Case-sensitive check for "Error" or "Sorry" in a response text
pub fn contains_failure_marker(text: &str) -> bool {
    FAILURE_MARKERS.iter().any(|marker| text.contains(marker))
}

impl std::fmt::Display for QueryResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_from_cache() {
            write!(f, "{} {}", CACHE_MARKER, self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}
