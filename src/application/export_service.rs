// Export service - Multi-stream CSV download for a device and date range
use crate::application::joiner::multi_join;
use crate::application::series_fetcher::SeriesFetcher;
use crate::domain::errors::ValidationError;
use crate::domain::range::TimeRange;
use crate::infrastructure::csv_export::render_csv;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Export form input, as entered by the user.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub device_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub streams: Vec<String>,
}

/// An export that passed validation; nothing has been fetched yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidExport {
    pub device_id: String,
    pub start: String,
    pub end: String,
    pub range: TimeRange,
    pub streams: Vec<String>,
}

impl ValidExport {
    pub fn file_name(&self) -> String {
        format!("sensor-data-{}-{}-to-{}.csv", self.device_id, self.start, self.end)
    }
}

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
    pub rows: usize,
    pub failed_streams: Vec<String>,
}

impl ExportRequest {
    /// Check user input. Offset-less dates are read in `tz`.
    pub fn validate<Tz: TimeZone>(&self, tz: &Tz) -> Result<ValidExport, ValidationError> {
        let device_id = non_empty(&self.device_id).ok_or(ValidationError::MissingDevice)?;
        let (start, end) = match (non_empty(&self.start), non_empty(&self.end)) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(ValidationError::MissingRange),
        };

        let mut streams: Vec<String> = Vec::new();
        for stream in self.streams.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            if !streams.iter().any(|s| s == stream) {
                streams.push(stream.to_string());
            }
        }
        if streams.is_empty() {
            return Err(ValidationError::NoStreams);
        }

        let range = TimeRange::new(parse_bound("start", start, tz)?, parse_bound("end", end, tz)?);

        Ok(ValidExport {
            device_id: device_id.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            range,
            streams,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bound<Tz: TimeZone>(
    field: &'static str,
    value: &str,
    tz: &Tz,
) -> Result<DateTime<Utc>, ValidationError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    // datetime-local inputs carry no offset
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ValidationError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

#[derive(Clone)]
pub struct ExportService {
    fetcher: SeriesFetcher,
}

impl ExportService {
    pub fn new(fetcher: SeriesFetcher) -> Self {
        Self { fetcher }
    }

    /// Validate, fetch every stream, join and render. Fetch failures of
    /// individual streams leave their column empty instead of failing the export.
    pub async fn export(&self, request: &ExportRequest) -> Result<CsvExport, ValidationError> {
        let export = request.validate(&Local)?;

        tracing::info!(
            "Exporting {} streams for {} from {} to {}",
            export.streams.len(),
            export.device_id,
            export.start,
            export.end
        );

        let results = self
            .fetcher
            .fetch_all(&export.streams, &export.device_id, &export.range)
            .await;
        let joined = multi_join(&export.device_id, results);

        if !joined.failed.is_empty() {
            tracing::warn!(
                "Export for {} is missing {} of {} streams",
                export.device_id,
                joined.failed.len(),
                export.streams.len()
            );
        }

        Ok(CsvExport {
            file_name: export.file_name(),
            content: render_csv(&joined.rows, &export.streams),
            rows: joined.rows.len(),
            failed_streams: joined.failed,
        })
    }
}
