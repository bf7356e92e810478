// HTTP repository for the sensor data API
use crate::application::sensor_repository::{LatestReadings, SensorRepository};
use crate::domain::errors::FetchError;
use crate::domain::range::TimeRange;
use crate::domain::reading::{normalize_latest, RawLatest, RawReading};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSensorRepository {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSensorRepository {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn build_filter_url(&self, stream: &str, device_id: &str, range: &TimeRange) -> String {
        format!(
            "{}/{}/filter?start={}&end={}&device_id={}",
            self.base_url,
            urlencoding::encode(stream),
            urlencoding::encode(&range.start_param()),
            urlencoding::encode(&range.end_param()),
            urlencoding::encode(device_id)
        )
    }

    fn build_latest_url(&self, device_id: &str) -> String {
        format!("{}/latest-all/{}", self.base_url, urlencoding::encode(device_id))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        response.json::<T>().await.map_err(request_error)
    }
}

fn request_error(e: reqwest::Error) -> FetchError {
    if e.is_decode() {
        FetchError::Decode(e.to_string())
    } else {
        FetchError::Request(e.to_string())
    }
}

/// Keep every entry with a usable value. The others are dropped so their
/// cards show as missing while the rest of the panel still renders.
fn latest_readings(device_id: &str, entries: HashMap<String, Value>) -> LatestReadings {
    entries
        .into_iter()
        .filter_map(|(stream, entry)| {
            let reading = serde_json::from_value::<RawLatest>(entry)
                .map_err(|e| e.to_string())
                .and_then(|raw| normalize_latest(raw).map_err(|e| e.to_string()));
            match reading {
                Ok(reading) => Some((stream, reading)),
                Err(e) => {
                    tracing::debug!("Skipping latest {} for {}: {}", stream, device_id, e);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl SensorRepository for HttpSensorRepository {
    async fn fetch_filtered(
        &self,
        stream: &str,
        device_id: &str,
        range: &TimeRange,
    ) -> Result<Vec<RawReading>, FetchError> {
        let url = self.build_filter_url(stream, device_id, range);
        let readings: Vec<RawReading> = self.get_json(&url).await?;
        tracing::debug!("Fetched {} records from {} for {}", readings.len(), stream, device_id);
        Ok(readings)
    }

    async fn latest_all(&self, device_id: &str) -> Result<LatestReadings, FetchError> {
        let url = self.build_latest_url(device_id);
        let entries: HashMap<String, Value> = self.get_json(&url).await?;
        Ok(latest_readings(device_id, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use chrono::{TimeZone, Utc};

    fn repository() -> HttpSensorRepository {
        HttpSensorRepository::new(
            "http://localhost:3000/api/sensor-data/".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn range() -> TimeRange {
        TimeRange::new(
            Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 5, 10, 23, 59, 59).unwrap(),
        )
    }

    /// Serve a canned sensor API on an ephemeral port and point a repository at it.
    async fn serve(app: Router) -> HttpSensorRepository {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        HttpSensorRepository::new(format!("http://{}/api/sensor-data", addr), Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_build_filter_url() {
        let url = repository().build_filter_url("sensor_co2_inflow", "Chlorella 40L", &range());

        assert_eq!(
            url,
            "http://localhost:3000/api/sensor-data/sensor_co2_inflow/filter\
             ?start=2025-05-01T00%3A00%3A00.000Z\
             &end=2025-05-10T23%3A59%3A59.000Z\
             &device_id=Chlorella%2040L"
        );
    }

    #[test]
    fn test_build_latest_url() {
        assert_eq!(
            repository().build_latest_url("Chlorella_40L_001"),
            "http://localhost:3000/api/sensor-data/latest-all/Chlorella_40L_001"
        );
    }

    #[test]
    fn test_latest_entries_fail_individually() {
        let body = r#"{
            "sensor_temp_inflow": { "value": 24.5, "unit": "°C" },
            "sensor_ph_reactor": { "value": null },
            "sensor_tds_reactor": { "value": "n/a", "unit": "ppm" },
            "sensor_orp_reactor": null,
            "sensor_ec_reactor": { "value": "1.2" }
        }"#;
        let entries: HashMap<String, Value> = serde_json::from_str(body).unwrap();
        let readings = latest_readings("D1", entries);

        assert_eq!(readings.len(), 2);
        assert_eq!(readings["sensor_temp_inflow"].value, 24.5);
        assert_eq!(readings["sensor_temp_inflow"].unit.as_deref(), Some("°C"));
        assert_eq!(readings["sensor_ec_reactor"].value, 1.2);
        assert!(!readings.contains_key("sensor_ph_reactor"));
        assert!(!readings.contains_key("sensor_orp_reactor"));
    }

    #[test]
    fn test_decode_filter_response() {
        let body = r#"[
            { "_id": "a1", "timestamp": "2025-05-01T00:00:00.000Z", "value": 412,
              "metadata": { "device_id": "Chlorella_40L_001", "location": "inflow",
                            "sensor_type": "co2", "unit": "ppm" } },
            { "_id": "a2", "timestamp": "2025-05-01T00:00:30.000Z" }
        ]"#;
        let readings: Vec<RawReading> = serde_json::from_str(body).unwrap();
        assert_eq!(readings.len(), 2);
        assert!(readings[1].value.is_null());
    }

    #[tokio::test]
    async fn test_fetch_against_live_server() {
        let app = Router::new()
            .route(
                "/api/sensor-data/sensor_ph_reactor/filter",
                get(|| async { r#"[{"timestamp":"2025-05-01T00:00:00.000Z","value":7.1}]"# }),
            )
            .route(
                "/api/sensor-data/latest-all/D1",
                get(|| async { r#"{"sensor_temp_inflow":{"value":24.5},"sensor_ph_reactor":{"value":null}}"# }),
            )
            .route(
                "/api/sensor-data/sensor_ec_reactor/filter",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database down") }),
            )
            .route(
                "/api/sensor-data/sensor_tds_reactor/filter",
                get(|| async { "<html>not json</html>" }),
            );
        let repo = serve(app).await;

        let readings = repo.fetch_filtered("sensor_ph_reactor", "D1", &range()).await.unwrap();
        assert_eq!(readings.len(), 1);

        let latest = repo.latest_all("D1").await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest["sensor_temp_inflow"].value, 24.5);

        assert_eq!(
            repo.fetch_filtered("sensor_ec_reactor", "D1", &range()).await,
            Err(FetchError::Status {
                status: 500,
                body: "database down".to_string()
            })
        );
        assert!(matches!(
            repo.fetch_filtered("sensor_tds_reactor", "D1", &range()).await,
            Err(FetchError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_a_request_error() {
        let repo = HttpSensorRepository::new("not a url".to_string(), Duration::from_secs(1)).unwrap();
        assert!(matches!(
            repo.latest_all("D1").await,
            Err(FetchError::Request(_))
        ));
    }
}
