use crate::domain::range::RangePreset;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Base of the sensor data routes, e.g. `http://localhost:3000/api/sensor-data`
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardSettings {
    pub default_device: String,
    /// Devices offered for selection
    #[serde(default = "default_devices")]
    pub devices: Vec<String>,
    pub refresh_interval_secs: u64,
    pub window_size: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            default_device: "Chlorella_40L_001".to_string(),
            devices: default_devices(),
            refresh_interval_secs: 30,
            window_size: 50,
        }
    }
}

fn default_devices() -> Vec<String> {
    vec!["Chlorella_40L_001".to_string(), "Chlorella_40L_002".to_string()]
}

fn default_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetsConfig {
    #[serde(default)]
    pub streams: Vec<String>,
    #[serde(default)]
    pub tiles: Vec<TileConfig>,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TileConfig {
    /// Stream name
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub unit: String,
    pub color: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub unit: String,
    pub color: String,
    pub y_axis_title: String,
    /// `single` or `double`
    pub kind: String,
    #[serde(default)]
    pub range: Option<RangePreset>,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    /// Stream name
    pub id: String,
    pub name: Option<String>,
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_widgets_config() -> anyhow::Result<WidgetsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/widgets"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
