use std::time::Duration;

use serde::Deserialize;

use crate::domain::semantic_cache::SemanticCacheConfig;
use crate::infrastructure::llm::DEFAULT_BASE_URL as LLM_DEFAULT_BASE_URL;
use crate::infrastructure::tools::{
    DEFAULT_MAX_ARTICLES, NEWS_API_KEY_ENV, NEWS_DEFAULT_BASE_URL, WEATHER_API_KEY_ENV,
    WEATHER_DEFAULT_BASE_URL,
};

pub const LLM_API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const LLM_API_KEY_FALLBACK_ENV: &str = "OPENAI_API_KEY";

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub cache: SemanticCacheConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Chat model used for routing, argument extraction and synthesis
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Reply length cap sent with every completion; unset leaves it to the provider
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Overrides `GOOGLE_API_KEY` / `OPENAI_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Local feature hashing, no network
    #[default]
    Hashing,
    /// OpenAI-compatible `/embeddings` endpoint, authenticated like the LLM
    Openai,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default)]
    pub provider: EmbeddingProviderKind,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    #[serde(default = "default_units")]
    pub units: String,
    /// Overrides `OPENWEATHER_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    #[serde(default = "default_language")]
    pub language: String,
    /// Overrides `GNEWS_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub synthesize_answer: bool,
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

fn default_llm_base_url() -> String {
    LLM_DEFAULT_BASE_URL.to_string()
}

fn default_llm_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.5
}

fn default_embedding_dimensions() -> usize {
    256
}

fn default_weather_base_url() -> String {
    WEATHER_DEFAULT_BASE_URL.to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_news_base_url() -> String {
    NEWS_DEFAULT_BASE_URL.to_string()
}

fn default_max_articles() -> usize {
    DEFAULT_MAX_ARTICLES
}

fn default_language() -> String {
    "en".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    30
}

fn default_tool_timeout_secs() -> u64 {
    15
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: None,
            api_key: None,
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            base_url: default_llm_base_url(),
            model: None,
            dimensions: default_embedding_dimensions(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            units: default_units(),
            api_key: None,
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: default_news_base_url(),
            max_articles: default_max_articles(),
            language: default_language(),
            api_key: None,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            synthesize_answer: false,
            llm_timeout_secs: default_llm_timeout_secs(),
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

impl AgentConfig {
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}

/// Non-empty value of an environment variable
fn env_credential(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn configured(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject values that would make the cache or timeouts meaningless
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let threshold = self.cache.distance_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(config::ConfigError::Message(format!(
                "cache.distance_threshold must be a non-negative number, got {}",
                threshold
            )));
        }

        if self.cache.max_entries == Some(0) {
            return Err(config::ConfigError::Message(
                "cache.max_entries must be greater than zero when set".to_string(),
            ));
        }

        if self.agent.llm_timeout_secs == 0 || self.agent.tool_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "agent timeouts must be greater than zero".to_string(),
            ));
        }

        if self.llm.max_tokens == Some(0) {
            return Err(config::ConfigError::Message(
                "llm.max_tokens must be greater than zero when set".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(config::ConfigError::Message(
                "embedding.dimensions must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn weather_api_key(&self) -> Option<String> {
        configured(&self.weather.api_key).or_else(|| env_credential(WEATHER_API_KEY_ENV))
    }

    pub fn news_api_key(&self) -> Option<String> {
        configured(&self.news.api_key).or_else(|| env_credential(NEWS_API_KEY_ENV))
    }

    pub fn llm_api_key(&self) -> Option<String> {
        configured(&self.llm.api_key)
            .or_else(|| env_credential(LLM_API_KEY_ENV))
            .or_else(|| env_credential(LLM_API_KEY_FALLBACK_ENV))
    }

    /// Environment variables of credentials that are not available
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.weather_api_key().is_none() {
            missing.push(WEATHER_API_KEY_ENV);
        }
        if self.news_api_key().is_none() {
            missing.push(NEWS_API_KEY_ENV);
        }
        if self.llm_api_key().is_none() {
            missing.push(LLM_API_KEY_ENV);
        }

        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.llm.temperature, 0.5);
        assert_eq!(config.cache.distance_threshold, 0.5);
        assert_eq!(config.cache.max_entries, None);
        assert_eq!(config.llm.max_tokens, None);
        assert_eq!(config.news.max_articles, 3);
        assert_eq!(config.weather.units, "metric");
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::Hashing);
        assert!(!config.agent.synthesize_answer);
        assert_eq!(config.agent.tool_timeout(), Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let json = serde_json::json!({
            "cache": { "distance_threshold": 0.3, "metric": "cosine" },
            "agent": { "synthesize_answer": true },
            "logging": { "level": "debug", "format": "json" }
        });

        let config: AppConfig = serde_json::from_value(json).unwrap();

        assert_eq!(config.cache.distance_threshold, 0.3);
        assert_eq!(config.cache.metric.to_string(), "cosine");
        assert!(config.cache.path.is_some());
        assert!(config.agent.synthesize_answer);
        assert_eq!(config.agent.llm_timeout_secs, 30);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.cache.max_entries = Some(0);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.agent.tool_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.cache.distance_threshold = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.llm.max_tokens = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configured_keys_take_precedence() {
        let mut config = AppConfig::default();
        config.weather.api_key = Some("from-config".into());
        config.news.api_key = Some("  ".into());
        config.llm.api_key = Some("llm-key".into());

        assert_eq!(config.weather_api_key().as_deref(), Some("from-config"));
        assert_eq!(config.llm_api_key().as_deref(), Some("llm-key"));
        assert!(!config.missing_credentials().contains(&WEATHER_API_KEY_ENV));
    }
}
