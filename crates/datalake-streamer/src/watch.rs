//! `watch` subcommand: a minimal dashboard that prints typed variables.

use anyhow::{Context, Result};
use clap::Args;
use datalake_core::{Variable, parse_message};
use datalake_logging::{LogFormat, LogLevel};
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// Options for `watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Streamer URL.
    #[arg(long, default_value = "ws://127.0.0.1:8765/ws")]
    url: String,

    /// Stop after this many variables.
    #[arg(long)]
    limit: Option<usize>,

    /// Print each variable as a JSON object instead of a table row.
    #[arg(long)]
    json: bool,
}

/// Connect, then print every variable received until the stream ends.
pub async fn run(args: WatchArgs) -> Result<()> {
    datalake_logging::init_subscriber(LogLevel::Warn, LogFormat::Pretty);

    let (mut ws, _) = connect_async(args.url.as_str())
        .await
        .with_context(|| format!("Failed to connect to {}", args.url))?;
    info!(url = %args.url, "connected");

    let mut seen = 0usize;
    while let Some(frame) = ws.next().await {
        let text = match frame.context("WebSocket read failed")? {
            Message::Text(text) => text,
            Message::Close(frame) => {
                debug!(?frame, "server closed the stream");
                break;
            }
            _ => continue,
        };

        let var = match parse_message(text.as_str()) {
            Ok(var) => var,
            Err(e) => {
                warn!(error = %e, "skipping unparseable frame");
                continue;
            }
        };
        println!("{}", render(&var, args.json)?);

        seen += 1;
        if args.limit.is_some_and(|limit| seen >= limit) {
            break;
        }
    }

    let _ = ws.close(None).await;
    Ok(())
}

/// One output line for `var`.
fn render(var: &Variable, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string(var).context("Failed to encode variable");
    }
    Ok(format!(
        "{:<24} {:<14} {}",
        var.name,
        var.value.kind(),
        var.value
    ))
}
