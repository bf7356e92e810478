// Dashboard service - Owns every live panel and its refresh loop
use crate::application::chart_panel::{ChartPanel, PanDirection};
use crate::application::latest_panel::LatestPanel;
use crate::application::refresh_loop::{spawn_refresh_loop, RefreshHandle};
use crate::application::sensor_repository::SensorRepository;
use crate::application::series_fetcher::SeriesFetcher;
use crate::domain::dashboard::{ChartView, DashboardView, SensorCard};
use crate::domain::device::Device;
use crate::domain::range::RangePreset;
use crate::infrastructure::config::{DashboardSettings, WidgetsConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

struct LiveChart {
    panel: Arc<ChartPanel>,
    refresh: RefreshHandle,
}

pub struct DashboardService {
    charts: Vec<LiveChart>,
    latest: Arc<LatestPanel>,
    latest_refresh: RefreshHandle,
    devices: Vec<Device>,
    device_id: RwLock<String>,
}

impl DashboardService {
    /// Build every configured panel and start its loop. Must run inside a tokio runtime.
    pub fn start(
        repository: Arc<dyn SensorRepository>,
        widgets: &WidgetsConfig,
        settings: &DashboardSettings,
    ) -> anyhow::Result<Self> {
        let period = Duration::from_secs(settings.refresh_interval_secs.max(1));
        let fetcher = SeriesFetcher::new(repository.clone());

        let mut charts = Vec::with_capacity(widgets.charts.len());
        for chart_config in &widgets.charts {
            if charts.iter().any(|c: &LiveChart| c.panel.id() == chart_config.id) {
                anyhow::bail!("duplicate chart id {}", chart_config.id);
            }
            let panel = Arc::new(ChartPanel::new(
                chart_config.clone(),
                fetcher.clone(),
                settings.default_device.clone(),
                settings.window_size,
            )?);
            let refresh = spawn_refresh_loop(panel.clone(), period);
            charts.push(LiveChart { panel, refresh });
        }

        let latest = Arc::new(LatestPanel::new(
            repository,
            widgets.tiles.clone(),
            settings.default_device.clone(),
        ));
        let latest_refresh = spawn_refresh_loop(latest.clone(), period);

        let mut devices: Vec<Device> = Vec::with_capacity(settings.devices.len() + 1);
        for id in std::iter::once(&settings.default_device).chain(&settings.devices) {
            if !devices.iter().any(|d| &d.id == id) {
                devices.push(Device::new(id.clone()));
            }
        }

        tracing::info!(
            "Dashboard started with {} charts for device {}",
            charts.len(),
            settings.default_device
        );

        Ok(Self {
            charts,
            latest,
            latest_refresh,
            devices,
            device_id: RwLock::new(settings.default_device.clone()),
        })
    }

    fn chart(&self, id: &str) -> Option<&LiveChart> {
        self.charts.iter().find(|c| c.panel.id() == id)
    }

    pub async fn device(&self) -> Device {
        Device::new(self.device_id.read().await.clone())
    }

    /// Configured device catalog, the default device first.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub async fn dashboard(&self) -> DashboardView {
        let mut charts = Vec::with_capacity(self.charts.len());
        for chart in &self.charts {
            charts.push(chart.panel.view().await);
        }
        let device = self.device().await;
        DashboardView {
            device_id: device.id,
            device_name: device.name,
            charts,
        }
    }

    pub async fn chart_view(&self, id: &str) -> Option<ChartView> {
        match self.chart(id) {
            Some(chart) => Some(chart.panel.view().await),
            None => None,
        }
    }

    pub async fn pan(&self, id: &str, direction: PanDirection) -> Option<ChartView> {
        let chart = self.chart(id)?;
        chart.panel.pan(direction).await;
        Some(chart.panel.view().await)
    }

    /// Switch a chart's range and refresh it right away.
    pub async fn set_range(&self, id: &str, range: RangePreset) -> Option<ChartView> {
        let chart = self.chart(id)?;
        chart.panel.set_range(range).await;
        chart.refresh.trigger();
        Some(chart.panel.view().await)
    }

    /// Point every panel at another device and refresh them all.
    pub async fn set_device(&self, device_id: &str) -> Device {
        *self.device_id.write().await = device_id.to_string();
        for chart in &self.charts {
            chart.panel.set_device(device_id).await;
            chart.refresh.trigger();
        }
        self.latest.set_device(device_id).await;
        self.latest_refresh.trigger();

        tracing::info!("Switched dashboard to device {}", device_id);
        Device::new(device_id.to_string())
    }

    pub async fn sensor_cards(&self) -> Vec<SensorCard> {
        self.latest.cards().await
    }

    /// Stop every refresh loop.
    pub fn shutdown(self) {
        tracing::info!("Stopping {} refresh loops", self.charts.len() + 1);
        drop(self);
    }
}
