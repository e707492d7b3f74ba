//! # datalake-streamer
//!
//! Binary entry point: `serve` runs the `WebSocket` streamer, `watch` connects
//! to one and prints the variables it receives.

#![deny(unsafe_code)]

mod watch;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use datalake_server::metrics::install_recorder;
use datalake_server::{ServerConfig, StreamServer};
use datalake_settings::{DatalakeSettings, load_settings, load_settings_from_path};
use tracing::info;

/// Data lake variable streamer.
#[derive(Parser, Debug)]
#[command(name = "datalake-streamer", about = "Streams typed variables over WebSocket")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the streaming server (default).
    Serve(ServeArgs),
    /// Connect to a streamer and print what it sends.
    Watch(watch::WatchArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Settings file (defaults to `./datalake.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, `0` for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Do not install the Prometheus recorder; `/metrics` returns 404.
    #[arg(long)]
    no_metrics: bool,
}

impl ServeArgs {
    /// Settings file, then env, then command-line flags.
    fn resolve_settings(&self) -> Result<DatalakeSettings> {
        let mut settings = match &self.config {
            Some(path) => load_settings_from_path(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => load_settings().context("Failed to load settings from datalake.json")?,
        };
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    {
        Command::Serve(args) => serve(args).await,
        Command::Watch(args) => watch::run(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let settings = args.resolve_settings()?;
    datalake_logging::init_subscriber(settings.logging.level, settings.logging.format);

    let mut server = StreamServer::new(ServerConfig::from(&settings));
    if !args.no_metrics {
        let handle = install_recorder().context("Failed to install metrics recorder")?;
        server = server.with_metrics(handle);
    }

    let (addr, handle) = server
        .listen()
        .await
        .context("Failed to start data lake streamer")?;
    info!(
        %addr,
        tick_interval_ms = settings.stream.tick_interval_ms,
        cadence = ?settings.stream.cadence,
        prefix = %settings.stream.prefix,
        "streaming on ws://{addr}/ws"
    );

    shutdown_signal().await?;

    info!("Shutting down...");
    server.shutdown().drain(vec![handle], None).await;
    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term =
            signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.context("Failed to listen for ctrl-c")?,
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;
    Ok(())
}
