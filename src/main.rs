use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use user_registry::{
    api, config, logging,
    store::{UserApi, UserStore},
};

/// In-memory user registry served over HTTP.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Interface to bind (overrides `SERVER_HOST`).
    #[arg(long)]
    host: Option<String>,
    /// Port to bind (overrides `SERVER_PORT`).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config =
        config::init_config(cli.host, cli.port).context("failed to load configuration")?;
    logging::init_tracing();
    let addr = config.bind_addr().context("failed to resolve bind address")?;

    let store = Arc::new(UserStore::new());
    let app = api::create_router(store.clone());

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")?;

    let metrics = store.metrics_snapshot();
    tracing::info!(
        users = store.user_count().await,
        created = metrics.users_created,
        updated = metrics.users_updated,
        deleted = metrics.users_deleted,
        update_misses = metrics.update_misses,
        "Server stopped; in-memory users discarded"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
