//! Infrastructure services

mod intent_router_service;
mod prompt_client;
mod query_service;
mod semantic_cache_service;

pub use intent_router_service::IntentRouter;
pub use prompt_client::PromptClient;
pub use query_service::{QueryService, QueryServiceConfig, REFUSAL_TEXT};
pub use semantic_cache_service::{CacheHit, SemanticCacheService};
