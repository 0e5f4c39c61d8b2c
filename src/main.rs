use clap::Parser;
use semantic_agent::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => cli::chat::run().await,
        Command::Ask(args) => cli::ask::run(args).await,
        Command::CacheStats => cli::stats::run().await,
    }
}
