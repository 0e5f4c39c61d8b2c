//! Single-prompt LLM completions with a bounded wait

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::llm::{FinishReason, LlmProvider, LlmRequest};
use crate::domain::DomainError;

/// Sends one user prompt to the configured model and returns the reply text
#[derive(Debug, Clone)]
pub struct PromptClient {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl PromptClient {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
            max_tokens: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap the length of every reply
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run `prompt`; `operation` names the call in timeout errors
    pub async fn complete(&self, operation: &str, prompt: String) -> Result<String, DomainError> {
        let mut builder = LlmRequest::builder().user(prompt);
        if let Some(temperature) = self.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        let request = builder.build();

        let response = tokio::time::timeout(self.timeout, self.provider.chat(&self.model, request))
            .await
            .map_err(|_| DomainError::timeout(operation, self.timeout.as_secs()))??;

        let usage = response.usage.clone().unwrap_or_default();
        debug!(
            provider = self.provider.provider_name(),
            model = %self.model,
            operation = operation,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "LLM completion finished"
        );

        match response.finish_reason.as_ref() {
            Some(FinishReason::Length) => {
                warn!(operation = operation, max_tokens = ?self.max_tokens, "LLM reply was truncated")
            }
            Some(FinishReason::ContentFilter) => {
                warn!(operation = operation, "LLM reply was cut by the content filter")
            }
            Some(FinishReason::Error) => warn!(operation = operation, "LLM reported an error finish"),
            Some(FinishReason::Stop) | None => {}
        }

        Ok(response.content().to_string())
    }
}
