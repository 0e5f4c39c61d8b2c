//! Query and response value types for the end-to-end query flow

mod text;
mod response;

pub use text::{Query, MAX_QUERY_CHARS};
pub use response::{contains_failure_marker, QueryResponse, ResponseOrigin, CACHE_MARKER};
