//! Application configuration

mod app_config;

pub use app_config::{
    AgentConfig, AppConfig, EmbeddingProviderKind, EmbeddingSettings, LlmConfig, LogFormat,
    LoggingConfig, NewsConfig, WeatherConfig,
};
