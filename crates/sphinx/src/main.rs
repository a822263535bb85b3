//! # Sphinx - riddle gate server
//!
//! Serves the three riddle pages behind a reverse proxy and redirects
//! solvers to the configured destination.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sphinx::config::{AppConfig, Overrides};
use sphinx::routes;
use sphinx::state::AppState;
use sphinx::sweeper::sweeper_worker;

/// Sphinx - three-riddle gate
#[derive(Parser, Debug)]
#[command(name = "sphinx")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/sphinx.toml")]
    config: String,

    /// Listen address (overrides config)
    #[arg(short, long, env = "LISTEN_ADDR")]
    listen: Option<String>,

    /// Entry URL rejected visitors are sent to (overrides config)
    #[arg(long, env = "INDEX_URL")]
    index_url: Option<String>,

    /// Destination after the final riddle (overrides config)
    #[arg(long, env = "REDIR_URL")]
    redirect_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, default_value = "false")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("🦁 Starting Sphinx v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let overrides = Overrides {
        listen: args.listen.clone(),
        index_url: args.index_url.clone(),
        redirect_url: args.redirect_url.clone(),
    };
    let config = AppConfig::load(&args.config, &overrides)?;
    info!("📋 Configuration loaded from {}", args.config);

    // Create shutdown broadcast channel
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    // Initialize application state
    let state = AppState::new(config.clone())?;
    info!(
        cooldown_secs = config.cooldown_secs,
        final_token_ttl_secs = config.final_token_ttl_secs,
        "✅ Riddles loaded"
    );

    // Spawn sweeper for lapsed cooldowns and tokens
    let sweeper_shutdown = shutdown_tx.subscribe();
    tokio::spawn(sweeper_worker(
        state.cooldown.clone(),
        state.tokens.clone(),
        config.sweep_interval(),
        sweeper_shutdown,
    ));

    // Build router
    let app = routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("🚀 Sphinx listening on {}", config.listen_addr);

    // Handle graceful shutdown
    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("🛑 Shutdown signal received");
        let _ = shutdown_tx.send(());
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")?;

    info!("👋 Sphinx shutdown complete");
    Ok(())
}

/// Initialize structured logging with tracing
fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .context("Failed to initialize logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .try_init()
            .context("Failed to initialize logging")?;
    }

    Ok(())
}
