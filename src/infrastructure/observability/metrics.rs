//! Metrics facade counters
//!
//! Counters are recorded through the `metrics` facade and are no-ops
//! until an application installs a recorder.

use metrics::counter;

/// Outcome of a semantic cache lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookupResult {
    Hit,
    Miss,
    /// The lookup failed and was treated as a miss
    Error,
}

impl CacheLookupResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheLookupResult::Hit => "hit",
            CacheLookupResult::Miss => "miss",
            CacheLookupResult::Error => "error",
        }
    }
}

pub fn record_cache_lookup(result: CacheLookupResult) {
    counter!("semantic_cache_lookups_total", "result" => result.as_str()).increment(1);
}

pub fn record_cache_write() {
    counter!("semantic_cache_writes_total").increment(1);
}

/// Record a handled query by the state it ended in (`cache`, `fresh`, ...)
pub fn record_query(outcome: &'static str) {
    counter!("queries_total", "outcome" => outcome).increment(1);
}

/// Record a tool invocation; `result` is `success` or a `ToolError` kind
pub fn record_tool_invocation(tool: &'static str, result: &'static str) {
    let labels = [("tool", tool.to_string()), ("result", result.to_string())];

    counter!("tool_invocations_total", &labels).increment(1);
}
