//! Sacred QA table server: intentions and live QA logs

use anyhow::{Context, Result};
use sacred_qa::api::{tables_router, TablesState};
use sacred_qa::backend::{Backend, HttpBackend};
use sacred_qa::views::LiveLogView;
use sacred_qa::WebConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Sacred QA server v{}", env!("CARGO_PKG_VERSION"));

    // Optional config file path as the first argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Arc::new(WebConfig::load(config_path.as_deref())?);

    info!(
        backend_url = %config.backend_url,
        port = config.port,
        refresh_interval_secs = config.refresh_interval_secs,
        "Loaded configuration"
    );

    let backend: Arc<dyn Backend> = Arc::new(
        HttpBackend::new(config.backend_url.clone(), config.request_timeout())
            .context("Failed to create backend client")?,
    );

    let logs = Arc::new(LiveLogView::new(Arc::clone(&backend)));
    // Held for the life of the process; dropping it stops the loop
    let _refresh = logs.mount(config.refresh_interval());

    let state = Arc::new(TablesState {
        config: Arc::clone(&config),
        backend,
        logs,
    });
    let app = tables_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
