// Presentation layer - HTTP surface for the dashboard UI
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    export_csv, get_chart, get_dashboard, health_check, latest_readings, list_devices, list_streams,
    pan_chart, set_chart_range, set_device,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/streams", get(list_streams))
        .route("/devices", get(list_devices))
        .route("/dashboard", get(get_dashboard))
        .route("/charts/:id", get(get_chart))
        .route("/charts/:id/pan/:direction", post(pan_chart))
        .route("/charts/:id/range", put(set_chart_range))
        .route("/device/:device_id", put(set_device))
        .route("/latest", get(latest_readings))
        .route("/export", get(export_csv))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
