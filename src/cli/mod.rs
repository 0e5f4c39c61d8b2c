//! CLI module for Semantic Agent
//!
//! Provides subcommands:
//! - `chat`: interactive session (default)
//! - `ask`: answer a single query and exit
//! - `cache-stats`: print semantic cache statistics

pub mod ask;
pub mod chat;
pub mod stats;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::services::QueryService;

/// Semantic Agent - weather and news answers with a semantic cache
#[derive(Parser)]
#[command(name = "semantic-agent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Interactive chat session (default mode)
    Chat,

    /// Answer one query and exit
    Ask(ask::AskArgs),

    /// Print semantic cache statistics
    CacheStats,
}

/// Load `.env` and configuration, install logging and build the service
pub(crate) fn bootstrap() -> anyhow::Result<(AppConfig, QueryService)> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let missing = config.missing_credentials();
    if !missing.is_empty() {
        warn!(missing = ?missing, "API keys are missing");
        eprintln!("Warning: API keys are missing: {}.", missing.join(", "));
        eprintln!("Please copy .env.example to .env and add your keys.");
    }

    let service = crate::create_query_service(&config)?;

    Ok((config, service))
}

/// Flush the service, logging rather than failing on errors
pub(crate) async fn shutdown(service: &QueryService) {
    if let Err(e) = service.shutdown().await {
        warn!(error = %e, "Failed to flush semantic cache on shutdown");
    }
}
