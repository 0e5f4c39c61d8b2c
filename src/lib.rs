//! Semantic Agent
//!
//! Answers weather and news questions:
//! - Routes each query with an LLM classifier (weather / news / unknown)
//! - Fetches data through the OpenWeatherMap and GNews tool adapters
//! - Reuses answers for paraphrased questions through a semantic cache

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use config::EmbeddingProviderKind;
use domain::embedding::EmbeddingProvider;
use domain::semantic_cache::SemanticCache;
use domain::LlmProvider;
use infrastructure::{
    embedding::{HashingEmbeddingProvider, OpenAiEmbeddingProvider},
    llm::{HttpClient, OpenAiProvider},
    semantic_cache::{FileSemanticCache, InMemorySemanticCache},
    services::{IntentRouter, PromptClient, QueryService, QueryServiceConfig, SemanticCacheService},
    tools::{NewsTool, ToolSet, WeatherTool},
};
use tracing::{info, warn};

/// Build the query service and all of its collaborators from configuration
pub fn create_query_service(config: &AppConfig) -> anyhow::Result<QueryService> {
    let llm_client = HttpClient::with_timeout(config.agent.llm_timeout())?;
    let tool_client = HttpClient::with_timeout(config.agent.tool_timeout())?;
    let llm_api_key = config.llm_api_key().unwrap_or_default();

    let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::with_base_url(
        llm_client.clone(),
        llm_api_key.clone(),
        config.llm.base_url.clone(),
    ));

    let mut prompt_client = PromptClient::new(llm, config.llm.model.clone())
        .with_temperature(config.llm.temperature)
        .with_timeout(config.agent.llm_timeout());

    if let Some(max_tokens) = config.llm.max_tokens {
        prompt_client = prompt_client.with_max_tokens(max_tokens);
    }

    let embedding_provider: Arc<dyn EmbeddingProvider> = match config.embedding.provider {
        EmbeddingProviderKind::Hashing => {
            Arc::new(HashingEmbeddingProvider::new(config.embedding.dimensions)?)
        }
        EmbeddingProviderKind::Openai => Arc::new(OpenAiEmbeddingProvider::with_base_url(
            llm_client,
            llm_api_key,
            config.embedding.base_url.clone(),
        )),
    };

    let mut cache_service = SemanticCacheService::with_config(
        create_cache_store(config),
        embedding_provider,
        config.cache.clone(),
    )
    .with_embedding_timeout(config.agent.llm_timeout());

    if let Some(ref model) = config.embedding.model {
        cache_service = cache_service.with_embedding_model(model.clone());
    }

    let weather = WeatherTool::new(tool_client.clone(), config.weather_api_key())
        .with_base_url(config.weather.base_url.clone())
        .with_units(config.weather.units.clone());

    let news = NewsTool::new(tool_client, config.news_api_key())
        .with_base_url(config.news.base_url.clone())
        .with_language(config.news.language.clone())
        .with_max_articles(config.news.max_articles);

    let service_config = QueryServiceConfig::new()
        .with_synthesize_answer(config.agent.synthesize_answer)
        .with_tool_timeout(config.agent.tool_timeout())
        .with_legacy_marker_gate(config.cache.legacy_marker_gate);

    info!(
        model = %config.llm.model,
        embedding = ?config.embedding.provider,
        metric = %config.cache.metric,
        threshold = config.cache.distance_threshold,
        "Query service initialized"
    );

    Ok(QueryService::with_config(
        Arc::new(cache_service),
        IntentRouter::new(prompt_client.clone()),
        prompt_client,
        ToolSet::new(Arc::new(weather), Arc::new(news)),
        service_config,
    ))
}

/// Open the persisted cache store, falling back to memory if it cannot be opened
fn create_cache_store(config: &AppConfig) -> Arc<dyn SemanticCache> {
    let max_entries = config.cache.max_entries;

    if let Some(ref path) = config.cache.path {
        match FileSemanticCache::open(path, max_entries) {
            Ok(store) => return Arc::new(store),
            Err(e) => warn!(
                path = %path.display(),
                error = %e,
                "Cannot open semantic cache file, using an in-memory cache"
            ),
        }
    }

    match max_entries {
        Some(max) => Arc::new(InMemorySemanticCache::with_max_entries(max)),
        None => Arc::new(InMemorySemanticCache::new()),
    }
}
