// HTTP response utilities for file downloads
use crate::application::export_service::CsvExport;
use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
};

/// Header listing streams that could not be fetched for an export
pub const FAILED_STREAMS_HEADER: &str = "x-failed-streams";

/// Build a CSV attachment response for a finished export
pub fn csv_response(export: CsvExport) -> Result<Response<Body>, StatusCode> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        export.file_name.replace('"', "")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"sensor-data.csv\""));

    let mut response_builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(header::CONTENT_DISPOSITION, disposition);

    if !export.failed_streams.is_empty() {
        match HeaderValue::from_str(&export.failed_streams.join(",")) {
            Ok(value) => response_builder = response_builder.header(FAILED_STREAMS_HEADER, value),
            Err(e) => tracing::warn!("Cannot report failed streams in header: {}", e),
        }
    }

    response_builder
        .body(Body::from(export.content))
        .map_err(|e| {
            tracing::error!("Response build error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export(file_name: &str, failed: &[&str]) -> CsvExport {
        CsvExport {
            file_name: file_name.to_string(),
            content: "timestamp,device_id".to_string(),
            rows: 0,
            failed_streams: failed.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_csv_attachment_headers() {
        let response = csv_response(export("sensor-data-D1-a-to-b.csv", &[])).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"sensor-data-D1-a-to-b.csv\""
        );
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        assert!(response.headers().get(FAILED_STREAMS_HEADER).is_none());
    }

    #[test]
    fn test_failed_streams_header() {
        let response = csv_response(export("x.csv", &["sensor_ec_reactor", "sensor_orp_reactor"])).unwrap();
        assert_eq!(
            response.headers()[FAILED_STREAMS_HEADER],
            "sensor_ec_reactor,sensor_orp_reactor"
        );
    }

    #[test]
    fn test_unprintable_file_name_falls_back() {
        let response = csv_response(export("sensor-data-\n.csv", &[])).unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"sensor-data.csv\""
        );
    }
}
