// Application layer - Use cases over the sensor data API
pub mod chart_panel;
pub mod dashboard_service;
pub mod export_service;
pub mod joiner;
pub mod latest_panel;
pub mod refresh_loop;
pub mod sensor_repository;
pub mod series_fetcher;
