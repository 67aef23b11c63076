//! Scrollback entry point

mod cli;

use crate::cli::Cli;
use anyhow::{Context, Result};
use clap::Parser;
use scrollback::config::Config;
use scrollback::ingest::run_ingest;
use scrollback::query::QueryEngine;
use scrollback::server::{command_spec, run_http_server, CommandHandler, HttpState};
use scrollback::session::{ChatSession, WsSession};
use scrollback::storage::RingStore;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    run(cli.to_config()).await
}

async fn run(config: Config) -> Result<()> {
    let store = Arc::new(RingStore::new(config.bank_size));
    let engine = QueryEngine::new(store.clone());

    let (session, feeds) = WsSession::connect(&config.upstream_url, &config.token, &[command_spec()])
        .await
        .with_context(|| format!("Failed to connect to chat service: {}", config.upstream_url))?;
    let session: Arc<dyn ChatSession> = Arc::new(session);

    let ingest = tokio::spawn(run_ingest(store, feeds.messages));

    let handler = Arc::new(CommandHandler::new(
        engine.clone(),
        session,
        config.public_url.clone(),
        config.bot_name.clone(),
    ));
    let commands = tokio::spawn(handler.run(feeds.commands));

    info!(
        bank_size = config.bank_size,
        public_url = %config.public_url,
        "Scrollback starting"
    );

    let http = run_http_server(config.bind_addr, HttpState::new(engine), config.request_timeout);

    // The chat feed ending is fatal; there is no reconnect
    let result = tokio::select! {
        ended = ingest => {
            let reason = ended.context("Ingest task panicked")?;
            Err(anyhow::Error::new(reason).context("Chat stream ended"))
        }
        served = http => served.context("HTTP server failed"),
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping");
            Ok(())
        }
    };

    commands.abort();
    info!("Scrollback stopped");
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
