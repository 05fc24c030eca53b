//! Dose tracker HTTP server.

use anyhow::Context;
use dose_tracker_core::DoseTracker;
use dose_tracker_server::{router, AppState, Settings};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load().context("failed to load configuration")?;
    let registry = settings.registry().context("invalid medicine table")?;
    info!(medicines = registry.len(), "medicine registry loaded");

    let tracker = DoseTracker::open(&settings.database.path, registry)
        .with_context(|| format!("failed to open database at {}", settings.database.path))?
        .with_session_ttl(settings.session_ttl());
    info!(path = %settings.database.path, "database ready");

    let app = router(AppState::new(tracker));

    let address = settings.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!(%address, "dose tracker listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
