//! Observability infrastructure - Metrics

mod metrics;

pub use metrics::{
    record_cache_lookup, record_cache_write, record_query, record_tool_invocation,
    CacheLookupResult,
};
