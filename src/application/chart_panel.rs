// Chart panel - Live, pannable chart over one or two streams
use crate::application::joiner::{dual_join, label_points};
use crate::application::refresh_loop::Refreshable;
use crate::application::series_fetcher::SeriesFetcher;
use crate::domain::dashboard::{
    dual_average, single_average, Average, ChartKind, ChartView, SeriesView,
};
use crate::domain::errors::{FetchError, FETCH_FAILED_MESSAGE};
use crate::domain::range::RangePreset;
use crate::domain::telemetry::{AlignedRecord, LabeledPoint};
use crate::domain::viewport::{Viewport, WindowInfo};
use crate::infrastructure::config::ChartConfig;
use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use tokio::sync::RwLock;

/// What a panel shows. Copied into every cycle so a cycle never reads
/// selection state that changes while it is in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub device_id: String,
    pub range: RangePreset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanDirection {
    Left,
    Right,
}

/// Ticket for one in-flight cycle.
#[derive(Debug, Clone)]
pub struct Cycle {
    pub seq: u64,
    pub selection: Selection,
}

/// Joined data produced by a cycle, ready to replace the viewport's dataset.
#[derive(Debug, Clone)]
pub enum CycleData {
    Single(Vec<LabeledPoint>),
    Double(Vec<AlignedRecord>),
}

#[derive(Debug)]
enum ChartData {
    Single(Viewport<LabeledPoint>),
    Double(Viewport<AlignedRecord>),
}

#[derive(Debug)]
struct PanelState {
    selection: Selection,
    started: u64,
    data: ChartData,
    loading: bool,
    error: Option<String>,
}

pub struct ChartPanel {
    config: ChartConfig,
    kind: ChartKind,
    streams: Vec<String>,
    fetcher: SeriesFetcher,
    state: RwLock<PanelState>,
}

impl ChartPanel {
    pub fn new(
        config: ChartConfig,
        fetcher: SeriesFetcher,
        device_id: String,
        window_size: usize,
    ) -> anyhow::Result<Self> {
        let (kind, expected) = match config.kind.as_str() {
            "single" => (ChartKind::Single, 1),
            "double" => (ChartKind::Double, 2),
            other => anyhow::bail!("chart {}: unknown kind {:?}", config.id, other),
        };
        if config.series.len() != expected {
            anyhow::bail!(
                "chart {}: a {} chart needs {} series, found {}",
                config.id,
                config.kind,
                expected,
                config.series.len()
            );
        }

        let data = match kind {
            ChartKind::Single => ChartData::Single(Viewport::new(window_size)),
            ChartKind::Double => ChartData::Double(Viewport::new(window_size)),
        };
        let selection = Selection {
            device_id,
            range: config.range.unwrap_or_default(),
        };
        let streams = config.series.iter().map(|s| s.id.clone()).collect();

        Ok(Self {
            config,
            kind,
            streams,
            fetcher,
            state: RwLock::new(PanelState {
                selection,
                started: 0,
                data,
                loading: false,
                error: None,
            }),
        })
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub async fn set_device(&self, device_id: &str) {
        self.state.write().await.selection.device_id = device_id.to_string();
    }

    pub async fn set_range(&self, range: RangePreset) {
        self.state.write().await.selection.range = range;
    }

    /// Claim the next sequence number and snapshot the selection.
    pub async fn begin_cycle(&self) -> Cycle {
        let mut state = self.state.write().await;
        state.started += 1;
        state.loading = true;
        Cycle {
            seq: state.started,
            selection: state.selection.clone(),
        }
    }

    /// Apply a finished cycle unless a newer one has started since.
    /// Returns whether the result was applied.
    pub async fn commit(&self, cycle: Cycle, outcome: Result<CycleData, FetchError>) -> bool {
        let mut state = self.state.write().await;
        if cycle.seq != state.started {
            tracing::debug!(
                "Discarding stale cycle {} for chart {} (latest is {})",
                cycle.seq,
                self.config.id,
                state.started
            );
            return false;
        }

        state.loading = false;
        match outcome {
            Ok(data) => {
                match (&mut state.data, data) {
                    (ChartData::Single(viewport), CycleData::Single(points)) => viewport.replace(points),
                    (ChartData::Double(viewport), CycleData::Double(records)) => viewport.replace(records),
                    _ => {
                        tracing::error!("Chart {} received data of the wrong shape", self.config.id);
                        return false;
                    }
                }
                state.error = None;
            }
            Err(e) => {
                tracing::error!("Error fetching chart data for {}: {}", self.config.id, e);
                state.error = Some(FETCH_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    async fn load(&self, selection: &Selection) -> Result<CycleData, FetchError> {
        let range = selection.range.resolve(Local::now());
        let device_id = selection.device_id.as_str();

        match self.kind {
            ChartKind::Single => {
                let points = self.fetcher.fetch(&self.streams[0], device_id, &range).await?;
                Ok(CycleData::Single(label_points(&points, &Local)))
            }
            ChartKind::Double => {
                let (primary, secondary) = futures::join!(
                    self.fetcher.fetch(&self.streams[0], device_id, &range),
                    self.fetcher.fetch(&self.streams[1], device_id, &range),
                );
                Ok(CycleData::Double(dual_join(&primary?, &secondary?, &Local)))
            }
        }
    }

    pub async fn pan(&self, direction: PanDirection) {
        let mut state = self.state.write().await;
        match (&mut state.data, direction) {
            (ChartData::Single(vp), PanDirection::Left) => vp.pan_left(),
            (ChartData::Single(vp), PanDirection::Right) => vp.pan_right(),
            (ChartData::Double(vp), PanDirection::Left) => vp.pan_left(),
            (ChartData::Double(vp), PanDirection::Right) => vp.pan_right(),
        }
    }

    pub async fn view(&self) -> ChartView {
        let state = self.state.read().await;
        let config = &self.config;

        let (categories, timestamps, series, average, window, colors): (
            Vec<String>,
            Vec<i64>,
            Vec<SeriesView>,
            Average,
            WindowInfo,
            Vec<String>,
        ) = match &state.data {
            ChartData::Single(vp) => {
                let visible = vp.window();
                (
                    visible.iter().map(|p| p.label.clone()).collect(),
                    visible.iter().map(|p| p.time_ms).collect(),
                    vec![SeriesView {
                        name: config.title.clone(),
                        data: visible.iter().map(|p| p.value).collect(),
                    }],
                    single_average(vp.data()),
                    vp.info(),
                    vec![config.color.clone()],
                )
            }
            ChartData::Double(vp) => {
                let visible = vp.window();
                (
                    visible.iter().map(|r| r.label.clone()).collect(),
                    visible.iter().map(|r| r.time_ms).collect(),
                    vec![
                        SeriesView {
                            name: self.series_name(0, "Inside"),
                            data: visible.iter().map(|r| r.value1).collect(),
                        },
                        SeriesView {
                            name: self.series_name(1, "Outside"),
                            data: visible.iter().map(|r| r.value2.value()).collect(),
                        },
                    ],
                    dual_average(vp.data()),
                    vp.info(),
                    vec![config.color.clone(), format!("{}88", config.color)],
                )
            }
        };

        ChartView {
            id: config.id.clone(),
            title: config.title.clone(),
            unit: config.unit.clone(),
            y_axis_title: config.y_axis_title.clone(),
            kind: self.kind,
            device_id: state.selection.device_id.clone(),
            range: state.selection.range,
            colors,
            categories,
            timestamps,
            series,
            average,
            window,
            loading: state.loading,
            error: state.error.clone(),
        }
    }

    fn series_name(&self, index: usize, fallback: &str) -> String {
        self.config
            .series
            .get(index)
            .and_then(|s| s.name.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[async_trait]
impl Refreshable for ChartPanel {
    fn name(&self) -> &str {
        self.id()
    }

    async fn run_cycle(&self) {
        let cycle = self.begin_cycle().await;
        let outcome = self.load(&cycle.selection).await;
        self.commit(cycle, outcome).await;
    }
}
