//! Sacred QA studio: sankalpa and question forms

use anyhow::{Context, Result};
use sacred_qa::api::{studio_router, StudioState};
use sacred_qa::backend::HttpBackend;
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

    info!("Starting Sacred QA studio v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Arc::new(WebConfig::load(config_path.as_deref())?);

    info!(
        backend_url = %config.backend_url,
        port = config.port,
        context_tag = %config.context_tag,
        "Loaded configuration"
    );

    let backend = HttpBackend::new(config.backend_url.clone(), config.request_timeout())
        .context("Failed to create backend client")?;

    let state = Arc::new(StudioState {
        config: Arc::clone(&config),
        backend: Arc::new(backend),
    });
    let app = studio_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
