// Repository trait for the sensor data API
use crate::domain::errors::FetchError;
use crate::domain::range::TimeRange;
use crate::domain::reading::{LatestReading, RawReading};
use async_trait::async_trait;
use std::collections::HashMap;

/// Latest reading per stream; streams with no data are absent.
pub type LatestReadings = HashMap<String, LatestReading>;

#[async_trait]
pub trait SensorRepository: Send + Sync {
    /// Every record of `stream` for `device_id` within `range`, in no particular order.
    /// An empty result is `Ok(vec![])`.
    async fn fetch_filtered(
        &self,
        stream: &str,
        device_id: &str,
        range: &TimeRange,
    ) -> Result<Vec<RawReading>, FetchError>;

    /// Latest reading of every stream for a device
    async fn latest_all(&self, device_id: &str) -> Result<LatestReadings, FetchError>;
}
