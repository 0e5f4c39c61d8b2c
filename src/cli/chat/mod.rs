//! Chat command - interactive question/answer loop

use std::future::Future;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};

use super::{bootstrap, shutdown};
use crate::infrastructure::services::QueryService;

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "bye"];

const BANNER: &str = "--- Semantic Agent ---
I can help you with weather and news.
Queries are routed by intent and answers are cached semantically.
Type 'exit' to quit.";

/// Run the interactive session on stdin/stdout
pub async fn run() -> anyhow::Result<()> {
    let (_, service) = bootstrap()?;
    let mut stdout = std::io::stdout();

    writeln!(stdout, "{}", BANNER)?;

    let stdin = BufReader::new(tokio::io::stdin());
    run_until_exit(&service, stdin, &mut stdout, signal::ctrl_c()).await?;

    info!("Chat session ended");

    Ok(())
}

/// Run a session until it ends or `interrupt` fires, then flush the cache.
///
/// The flush happens even when the session fails on I/O.
pub async fn run_until_exit<R, W, F>(
    service: &QueryService,
    reader: R,
    out: &mut W,
    interrupt: F,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    F: Future,
{
    let finished = tokio::select! {
        result = run_session(service, reader, &mut *out) => Some(result),
        _ = interrupt => None,
    };

    let result = match finished {
        Some(result) => result,
        None => {
            info!("Received Ctrl+C, ending session");
            writeln!(out, "\nGoodbye!").map_err(anyhow::Error::from)
        }
    };

    shutdown(service).await;

    result
}

fn is_exit_word(input: &str) -> bool {
    EXIT_WORDS.iter().any(|w| input.eq_ignore_ascii_case(w))
}

/// Read queries line by line until an exit word or end of input
pub async fn run_session<R, W>(
    service: &QueryService,
    reader: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();

    loop {
        write!(out, "\nUser: ")?;
        out.flush()?;

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                writeln!(out, "\nGoodbye!")?;
                return Ok(());
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                warn!(error = %e, "Unreadable input line");
                writeln!(out, "An error occurred: {}", e)?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let input = line.trim();

        if input.is_empty() {
            continue;
        }

        if is_exit_word(input) {
            writeln!(out, "Goodbye!")?;
            return Ok(());
        }

        let response = service.handle_text(input).await;
        writeln!(out, "Agent: {}", response)?;
    }
}
