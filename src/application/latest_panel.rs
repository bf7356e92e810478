// Latest readings panel - One card per configured sensor, polled live
use crate::application::refresh_loop::Refreshable;
use crate::application::sensor_repository::{LatestReadings, SensorRepository};
use crate::domain::dashboard::{CardStatus, SensorCard};
use crate::domain::errors::FetchError;
use crate::infrastructure::config::TileConfig;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct LatestState {
    device_id: String,
    started: u64,
    readings: Option<LatestReadings>,
    loading: bool,
    failed: bool,
}

pub struct LatestPanel {
    repository: Arc<dyn SensorRepository>,
    tiles: Vec<TileConfig>,
    state: RwLock<LatestState>,
}

impl LatestPanel {
    pub fn new(repository: Arc<dyn SensorRepository>, tiles: Vec<TileConfig>, device_id: String) -> Self {
        Self {
            repository,
            tiles,
            state: RwLock::new(LatestState {
                device_id,
                ..Default::default()
            }),
        }
    }

    pub async fn set_device(&self, device_id: &str) {
        self.state.write().await.device_id = device_id.to_string();
    }

    async fn commit(&self, seq: u64, outcome: Result<LatestReadings, FetchError>) {
        let mut state = self.state.write().await;
        if seq != state.started {
            tracing::debug!("Discarding stale latest-readings cycle {}", seq);
            return;
        }

        state.loading = false;
        match outcome {
            Ok(readings) => {
                state.readings = Some(readings);
                state.failed = false;
            }
            Err(e) => {
                tracing::error!("Error fetching sensor data for {}: {}", state.device_id, e);
                state.failed = true;
            }
        }
    }

    pub async fn cards(&self) -> Vec<SensorCard> {
        let state = self.state.read().await;

        self.tiles
            .iter()
            .map(|tile| {
                let reading = state.readings.as_ref().and_then(|r| r.get(&tile.id));
                let status = if state.loading && state.readings.is_none() {
                    CardStatus::Loading
                } else if state.failed {
                    CardStatus::Error
                } else if reading.is_some() {
                    CardStatus::Ok
                } else {
                    CardStatus::Missing
                };
                let unit = reading
                    .and_then(|r| r.unit.clone())
                    .unwrap_or_else(|| tile.unit.clone());

                SensorCard {
                    id: tile.id.clone(),
                    title: tile.title.clone(),
                    color: tile.color.clone(),
                    value: if status == CardStatus::Ok { reading.map(|r| r.value) } else { None },
                    unit,
                    status,
                }
            })
            .collect()
    }
}

#[async_trait]
impl Refreshable for LatestPanel {
    fn name(&self) -> &str {
        "latest-readings"
    }

    async fn run_cycle(&self) {
        let (seq, device_id) = {
            let mut state = self.state.write().await;
            state.started += 1;
            state.loading = true;
            (state.started, state.device_id.clone())
        };

        let outcome = self.repository.latest_all(&device_id).await;
        self.commit(seq, outcome).await;
    }
}
