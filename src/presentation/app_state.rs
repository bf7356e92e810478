// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::export_service::ExportService;

pub struct AppState {
    pub dashboard: DashboardService,
    pub export_service: ExportService,
    /// Streams offered for export, in display order
    pub streams: Vec<String>,
}
