//! LLM-backed intent routing

use tracing::{info, warn};

use super::PromptClient;
use crate::domain::routing::{classification_prompt, Category};
use crate::domain::DomainError;

/// Classifies queries into a `Category` with one LLM call per query
#[derive(Debug, Clone)]
pub struct IntentRouter {
    client: PromptClient,
}

impl IntentRouter {
    pub fn new(client: PromptClient) -> Self {
        Self { client }
    }

    /// Classify `query`, surfacing collaborator faults.
    ///
    /// Any reply outside the routable set, including empty or multi-word
    /// replies, is `Category::Unknown`. Only a failed or timed out call is
    /// an error.
    pub async fn try_classify(&self, query: &str) -> Result<Category, DomainError> {
        if query.trim().is_empty() {
            return Ok(Category::Unknown);
        }

        let reply = self
            .client
            .complete("intent classification", classification_prompt(query))
            .await?;

        let category = Category::from_model_output(&reply);

        if category.is_routable() {
            info!(category = %category, "Query routed");
        } else {
            info!(reply = %reply.trim(), "Query not routable");
        }

        Ok(category)
    }

    /// Total classification: faults fall back to `Category::Unknown`
    pub async fn classify(&self, query: &str) -> Category {
        match self.try_classify(query).await {
            Ok(category) => category,
            Err(e) => {
                warn!(error = %e, "Intent classification failed, treating query as unknown");
                Category::Unknown
            }
        }
    }
}
