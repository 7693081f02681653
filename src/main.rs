use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kuclub_api::cli::Cli;
use kuclub_api::config::AppConfig;
use kuclub_api::database::Repository;
use kuclub_api::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up JWT_SECRET, CLIENT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    cli.apply(&mut config);

    if cli.check_config {
        println!("{}", config.summary());
        return Ok(());
    }

    info!("Starting KU Club API: {}", config.summary());
    if config.security.client_secret.is_none() {
        tracing::warn!("CLIENT_SECRET is not set, token issuance is disabled");
    }

    let repository = Repository::from_config(&config)
        .await
        .context("failed to initialize data source")?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, repository);
    let app = server::app(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("KU Club API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
