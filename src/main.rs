// proofview - Viewer for proof-session transcripts
//
// A proving agent writes one JSON transcript per session. This tool finds
// them, folds their event streams into steps and renders each proof as HTML,
// browsable through a local web UI.
//
// Architecture:
// - Discovery: lists proofs in a directory or over HTTP, newest first
// - Proof model: parses transcripts and reduces events into steps
// - Render: turns a proof into HTML plus the actions its controls trigger
// - Viewer: navigation, copy actions and expand state for the page on screen
// - Server (axum): serves the page and the JSON API its script calls

mod cli;
mod config;
mod discovery;
mod logging;
mod proof;
mod render;
mod server;
mod util;
mod viewer;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use discovery::ProofSource;
use std::sync::Arc;
use viewer::clipboard::SystemClipboard;
use viewer::Viewer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands run before logging so their output stays clean
    if let Some(Commands::Config { show, reset, path }) = &cli.command {
        return cli::handle_config(*show, *reset, *path);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    // Precedence: CLI flags > env vars > config file > defaults
    let mut config = Config::from_env()?;
    cli.apply_overrides(&mut config)?;

    // Keep the guard alive so file logs flush on exit
    let _log_guard = logging::init(&config.logging);

    tracing::debug!("Configuration: {:?}", config);

    match &cli.command {
        Some(Commands::List { .. }) => cli::run_list(&config).await,
        Some(Commands::Render { id, output, .. }) => {
            cli::run_render(&config, id, output.as_ref()).await
        }
        Some(Commands::Serve { .. }) | None => run_viewer(config).await,
        Some(Commands::Config { .. }) => Ok(()),
    }
}

async fn run_viewer(config: Config) -> Result<()> {
    let source = ProofSource::from_config(&config)?;
    tracing::info!(
        "Proofs from {} ({} index)",
        source.describe(),
        config.index.as_str()
    );

    let viewer = Viewer::new(
        source,
        Arc::new(SystemClipboard),
        config.copied_feedback_ms,
    );

    viewer.reload().await;
    tracing::info!("Discovered {} proofs", viewer.proof_list().proofs.len());

    server::serve(config.bind_addr, viewer).await
}
