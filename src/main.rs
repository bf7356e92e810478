// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::export_service::ExportService;
use crate::application::series_fetcher::SeriesFetcher;
use crate::infrastructure::config::{load_app_config, load_widgets_config};
use crate::infrastructure::http_repository::HttpSensorRepository;
use crate::presentation::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    let widgets_config = load_widgets_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpSensorRepository::new(
        app_config.api.base_url.clone(),
        Duration::from_secs(app_config.api.timeout_secs),
    )?);

    // Create services (application layer)
    let dashboard = DashboardService::start(
        repository.clone(),
        &widgets_config,
        &app_config.dashboard,
    )?;
    let export_service = ExportService::new(SeriesFetcher::new(repository));

    // Create application state
    let state = Arc::new(AppState {
        dashboard,
        export_service,
        streams: widgets_config.streams.clone(),
    });

    // Build router (presentation layer)
    let router = presentation::router(state.clone());

    // Start server
    let addr: SocketAddr = app_config.server.bind.parse()?;
    tracing::info!(
        "Starting sensor-dashboard on {} (sensor API {})",
        addr,
        app_config.api.base_url
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Release the refresh timers before exiting
    match Arc::try_unwrap(state) {
        Ok(state) => state.dashboard.shutdown(),
        Err(_) => tracing::warn!("Dashboard still shared at shutdown; refresh loops end with the runtime"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
