// HTTP request handlers
use crate::application::chart_panel::PanDirection;
use crate::application::export_service::ExportRequest;
use crate::domain::dashboard::{ChartView, DashboardView, SensorCard};
use crate::domain::device::Device;
use crate::domain::range::RangePreset;
use crate::infrastructure::http_response::csv_response;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub preset: RangePreset,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub device_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    /// Comma-separated stream names
    pub streams: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Streams available for export
pub async fn list_streams(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.streams.clone())
}

/// Devices that can be selected
pub async fn list_devices(State(state): State<Arc<AppState>>) -> Json<Vec<Device>> {
    Json(state.dashboard.devices().to_vec())
}

/// Every chart's current window
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.dashboard.dashboard().await)
}

pub async fn get_chart(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChartView>, StatusCode> {
    state
        .dashboard
        .chart_view(&id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn pan_chart(
    Path((id, direction)): Path<(String, PanDirection)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChartView>, StatusCode> {
    state
        .dashboard
        .pan(&id, direction)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Change a chart's range preset; the chart refreshes in the background
pub async fn set_chart_range(
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChartView>, StatusCode> {
    state
        .dashboard
        .set_range(&id, query.preset)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Switch every panel to another device
pub async fn set_device(
    Path(device_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Device>, StatusCode> {
    let device_id = device_id.trim();
    if device_id.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(Json(state.dashboard.set_device(device_id).await))
}

/// Latest value of every configured sensor
pub async fn latest_readings(State(state): State<Arc<AppState>>) -> Json<Vec<SensorCard>> {
    Json(state.dashboard.sensor_cards().await)
}

/// Download the selected streams as one CSV table
pub async fn export_csv(
    Query(query): Query<ExportQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let device_id = match query.device_id {
        Some(id) => id,
        None => state.dashboard.device().await.id,
    };
    let request = ExportRequest {
        device_id: Some(device_id),
        start: query.start,
        end: query.end,
        streams: query
            .streams
            .map(|s| s.split(',').map(str::to_string).collect())
            .unwrap_or_default(),
    };

    match state.export_service.export(&request).await {
        Ok(export) => {
            tracing::info!("Serving {} with {} rows", export.file_name, export.rows);
            match csv_response(export) {
                Ok(response) => response,
                Err(status) => status.into_response(),
            }
        }
        Err(e) => {
            tracing::warn!("Rejected export request: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
