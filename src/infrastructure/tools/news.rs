//! GNews search adapter

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::domain::tool::{Tool, ToolDescriptor, ToolError, ToolKind};
use crate::infrastructure::llm::HttpClientTrait;

pub const DEFAULT_BASE_URL: &str = "https://gnews.io";
pub const API_KEY_ENV: &str = "GNEWS_API_KEY";
pub const DEFAULT_MAX_ARTICLES: usize = 3;

const SUBJECT: &str = "news";
const NO_NEWS: &str = "No news found.";

/// News tool backed by the GNews `/api/v4/search` endpoint
#[derive(Debug)]
pub struct NewsTool<C: HttpClientTrait> {
    client: C,
    api_key: Option<String>,
    base_url: String,
    language: String,
    max_articles: usize,
}

impl<C: HttpClientTrait> NewsTool<C> {
    pub fn new(client: C, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "en".to_string(),
            max_articles: DEFAULT_MAX_ARTICLES,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// At least one headline is always requested
    pub fn with_max_articles(mut self, max_articles: usize) -> Self {
        self.max_articles = max_articles.max(1);
        self
    }

    fn url(&self) -> String {
        format!("{}/api/v4/search", self.base_url)
    }

    fn format_headlines(&self, body: &Value) -> Result<String, ToolError> {
        let articles = match body.get("articles") {
            None | Some(Value::Null) => return Ok(NO_NEWS.to_string()),
            Some(Value::Array(articles)) => articles,
            Some(_) => return Err(ToolError::malformed(SUBJECT, "articles is not a list")),
        };

        if articles.is_empty() {
            return Ok(NO_NEWS.to_string());
        }

        let lines = articles
            .iter()
            .take(self.max_articles)
            .map(|article| {
                let title = article
                    .get("title")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::malformed(SUBJECT, "article without title"))?;
                let source = article
                    .pointer("/source/name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::malformed(SUBJECT, "article without source name"))?;

                Ok(format!("- {} ({})", title, source))
            })
            .collect::<Result<Vec<_>, ToolError>>()?;

        Ok(lines.join("\n"))
    }
}

/// Render the `errors` field of a GNews error body
fn describe_errors(body: &Value) -> String {
    match body.get("errors") {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Array(errors)) if !errors.is_empty() => errors
            .iter()
            .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        Some(Value::Object(errors)) if !errors.is_empty() => errors
            .values()
            .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
            .collect::<Vec<_>>()
            .join("; "),
        _ => "Unknown error".to_string(),
    }
}

#[async_trait]
impl<C: HttpClientTrait> Tool for NewsTool<C> {
    fn descriptor(&self) -> &ToolDescriptor {
        ToolKind::News.descriptor()
    }

    async fn invoke(&self, topic: &str) -> Result<String, ToolError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::missing_credential(SUBJECT, API_KEY_ENV))?;

        debug!(topic = %topic, "Fetching news headlines");

        let max = self.max_articles.to_string();
        let query = [
            ("q", topic),
            ("apikey", api_key),
            ("lang", self.language.as_str()),
            ("max", max.as_str()),
        ];

        let response = self
            .client
            .get_json(&self.url(), &query)
            .await
            .map_err(|e| ToolError::network(SUBJECT, e.to_string()))?;

        if !response.is_success() {
            return Err(ToolError::upstream(
                response.status,
                describe_errors(&response.body),
            ));
        }

        self.format_headlines(&response.body)
    }
}
