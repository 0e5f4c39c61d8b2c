//! End-to-end query handling
//!
//! Each query moves through cache check, routing and dispatch:
//!
//! ```text
//! CACHE_CHECK --hit--> Cache
//!      | miss
//!    ROUTE --unknown--> Refusal
//!      | weather / news
//!   DISPATCH --ok--> Fresh (cached)   --err--> Failure (not cached)
//! ```
//!
//! Faults never escape `handle`: they come back as `Failure` responses.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::{IntentRouter, PromptClient, SemanticCacheService};
use crate::domain::query::{Query, QueryResponse};
use crate::domain::semantic_cache::SemanticCacheStats;
use crate::domain::tool::{
    extract_argument_heuristic, normalize_extracted_argument, ToolError, ToolKind,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_query, record_tool_invocation};
use crate::infrastructure::tools::ToolSet;

pub const REFUSAL_TEXT: &str = "I'm sorry, I can only handle weather and news requests.";

const FAILURE_PREFIX: &str = "An error occurred while processing your request";

/// Behavioural switches for the query service
#[derive(Debug, Clone)]
pub struct QueryServiceConfig {
    /// Rewrite tool output into a friendly answer with the LLM
    pub synthesize_answer: bool,
    /// Bound on a single tool invocation
    pub tool_timeout: Duration,
    /// Also refuse to cache answers containing "Error" or "Sorry"
    pub legacy_marker_gate: bool,
}

impl Default for QueryServiceConfig {
    fn default() -> Self {
        Self {
            synthesize_answer: false,
            tool_timeout: Duration::from_secs(15),
            legacy_marker_gate: false,
        }
    }
}

impl QueryServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_synthesize_answer(mut self, enabled: bool) -> Self {
        self.synthesize_answer = enabled;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn with_legacy_marker_gate(mut self, enabled: bool) -> Self {
        self.legacy_marker_gate = enabled;
        self
    }
}

/// Orchestrates cache, router and tools for each query
#[derive(Debug)]
pub struct QueryService {
    cache: Arc<SemanticCacheService>,
    router: IntentRouter,
    llm: PromptClient,
    tools: ToolSet,
    config: QueryServiceConfig,
}

impl QueryService {
    pub fn new(
        cache: Arc<SemanticCacheService>,
        router: IntentRouter,
        llm: PromptClient,
        tools: ToolSet,
    ) -> Self {
        Self::with_config(cache, router, llm, tools, QueryServiceConfig::default())
    }

    pub fn with_config(
        cache: Arc<SemanticCacheService>,
        router: IntentRouter,
        llm: PromptClient,
        tools: ToolSet,
        config: QueryServiceConfig,
    ) -> Self {
        Self {
            cache,
            router,
            llm,
            tools,
            config,
        }
    }

    pub fn config(&self) -> &QueryServiceConfig {
        &self.config
    }

    /// Validate raw input and handle it; invalid input is a `Failure`
    pub async fn handle_text(&self, text: &str) -> QueryResponse {
        match Query::new(text) {
            Ok(query) => self.handle(&query).await,
            Err(e) => {
                record_query("failure");
                QueryResponse::failure(format!("{}: {}", FAILURE_PREFIX, e))
            }
        }
    }

    /// Answer a query
    pub async fn handle(&self, query: &Query) -> QueryResponse {
        let response = self.process(query).await;

        record_query(response.origin.as_str());
        info!(origin = response.origin.as_str(), "Query handled");

        response
    }

    async fn process(&self, query: &Query) -> QueryResponse {
        if let Some(hit) = self.cache.lookup(query).await {
            return QueryResponse::cached(hit.response);
        }

        let category = match self.router.try_classify(query.as_str()).await {
            Ok(category) => category,
            Err(e) => {
                error!(error = %e, "Intent classification failed");
                return QueryResponse::failure(format!("{}: {}", FAILURE_PREFIX, e));
            }
        };

        let Some(kind) = ToolKind::for_category(category) else {
            return QueryResponse::refusal(REFUSAL_TEXT);
        };

        let response = match self.dispatch(kind, query).await {
            Ok(answer) => QueryResponse::fresh(answer),
            Err(e) => {
                warn!(tool = kind.subject(), kind = e.kind(), error = %e, "Tool invocation failed");
                QueryResponse::failure(e.to_string())
            }
        };

        if response.is_cacheable(self.config.legacy_marker_gate) {
            self.cache.store(query, &response.text).await;
        } else {
            debug!(origin = response.origin.as_str(), "Response not cached");
        }

        response
    }

    async fn dispatch(&self, kind: ToolKind, query: &Query) -> Result<String, ToolError> {
        let argument = self.extract_argument(kind, query).await;
        let tool = self.tools.get(kind);

        debug!(tool = tool.descriptor().name, argument = %argument, "Invoking tool");

        let outcome = match tokio::time::timeout(self.config.tool_timeout, tool.invoke(&argument))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(ToolError::timeout(
                kind.subject(),
                self.config.tool_timeout.as_secs(),
            )),
        };

        let output = match outcome {
            Ok(output) => {
                record_tool_invocation(kind.subject(), "success");
                output
            }
            Err(e) => {
                record_tool_invocation(kind.subject(), e.kind());
                return Err(e);
            }
        };

        if !self.config.synthesize_answer {
            return Ok(output);
        }

        Ok(self.synthesize(kind, query, output).await)
    }

    /// Ask the LLM for the tool argument, falling back to the heuristic
    async fn extract_argument(&self, kind: ToolKind, query: &Query) -> String {
        let reply = self
            .llm
            .complete("argument extraction", kind.argument_prompt(query.as_str()))
            .await;

        match reply.map(|r| normalize_extracted_argument(&r)) {
            Ok(Some(argument)) => argument,
            Ok(None) => {
                debug!("LLM gave no usable argument, using heuristic extraction");
                extract_argument_heuristic(kind, query.as_str())
            }
            Err(e) => {
                warn!(error = %e, "Argument extraction failed, using heuristic extraction");
                extract_argument_heuristic(kind, query.as_str())
            }
        }
    }

    /// Rewrite tool output into the final answer; raw output on failure
    async fn synthesize(&self, kind: ToolKind, query: &Query, output: String) -> String {
        let prompt = kind.synthesis_prompt(query.as_str(), &output);

        match self.llm.complete("answer synthesis", prompt).await {
            Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
            Ok(_) => output,
            Err(e) => {
                warn!(error = %e, "Answer synthesis failed, returning tool output");
                output
            }
        }
    }

    pub async fn cache_stats(&self) -> Result<SemanticCacheStats, DomainError> {
        self.cache.stats().await
    }

    /// Flush the cache store; call once before exit
    pub async fn shutdown(&self) -> Result<(), DomainError> {
        info!("Shutting down query service");
        self.cache.flush().await
    }
}
