// Series fetcher - One named stream for one device over one range
use crate::application::sensor_repository::SensorRepository;
use crate::domain::errors::FetchError;
use crate::domain::range::TimeRange;
use crate::domain::reading::normalize;
use crate::domain::telemetry::Point;
use futures::future::join_all;
use std::sync::Arc;

#[derive(Clone)]
pub struct SeriesFetcher {
    repository: Arc<dyn SensorRepository>,
}

impl SeriesFetcher {
    pub fn new(repository: Arc<dyn SensorRepository>) -> Self {
        Self { repository }
    }

    /// Normalized, unsorted points. Records that fail normalization are dropped.
    pub async fn fetch(
        &self,
        stream: &str,
        device_id: &str,
        range: &TimeRange,
    ) -> Result<Vec<Point>, FetchError> {
        let raws = self.repository.fetch_filtered(stream, device_id, range).await?;

        let total = raws.len();
        let points: Vec<Point> = raws
            .iter()
            .filter_map(|raw| match normalize(raw) {
                Ok(point) => Some(point),
                Err(e) => {
                    tracing::debug!("Dropping record from {}: {}", stream, e);
                    None
                }
            })
            .collect();

        if points.len() < total {
            tracing::debug!(
                "{} of {} records from {} for {} were unusable",
                total - points.len(),
                total,
                stream,
                device_id
            );
        }

        Ok(points)
    }

    /// Fetch several streams concurrently. Resolves only once every fetch has
    /// settled; results come back in the order of `streams`.
    pub async fn fetch_all(
        &self,
        streams: &[String],
        device_id: &str,
        range: &TimeRange,
    ) -> Vec<(String, Result<Vec<Point>, FetchError>)> {
        let fetches = streams.iter().map(|stream| async move {
            let result = self.fetch(stream, device_id, range).await;
            (stream.clone(), result)
        });
        join_all(fetches).await
    }
}
