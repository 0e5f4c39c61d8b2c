//! Ask command - answers a single query

use clap::Args;

use super::{bootstrap, shutdown};

/// Arguments for the ask command
#[derive(Args, Clone)]
pub struct AskArgs {
    /// The question to answer
    pub query: String,
}

/// Answer one query and print the response
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let (_, service) = bootstrap()?;

    let response = service.handle_text(&args.query).await;
    println!("{}", response);

    shutdown(&service).await;

    Ok(())
}
