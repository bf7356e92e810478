// Dashboard view models handed to the chart renderer
use super::range::RangePreset;
use super::telemetry::{AlignedRecord, LabeledPoint};
use super::viewport::WindowInfo;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Single,
    Double,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesView {
    pub name: String,
    pub data: Vec<f64>,
}

/// Full-dataset mean, already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Average {
    Single(String),
    Double {
        #[serde(rename = "in")]
        inside: String,
        #[serde(rename = "out")]
        outside: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub y_axis_title: String,
    pub kind: ChartKind,
    pub device_id: String,
    pub range: RangePreset,
    pub colors: Vec<String>,
    pub categories: Vec<String>,
    pub timestamps: Vec<i64>,
    pub series: Vec<SeriesView>,
    pub average: Average,
    pub window: WindowInfo,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Loading,
    Ok,
    Missing,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorCard {
    pub id: String,
    pub title: String,
    pub color: String,
    pub value: Option<f64>,
    pub unit: String,
    pub status: CardStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub device_id: String,
    pub device_name: String,
    pub charts: Vec<ChartView>,
}

pub fn single_average(points: &[LabeledPoint]) -> Average {
    Average::Single(mean_label(points.iter().map(|p| p.value), points.len(), 1))
}

/// Defaulted secondary values count as zero, matching what the chart draws.
pub fn dual_average(records: &[AlignedRecord]) -> Average {
    Average::Double {
        inside: mean_label(records.iter().map(|r| r.value1), records.len(), 0),
        outside: mean_label(records.iter().map(|r| r.value2.value()), records.len(), 0),
    }
}

fn mean_label(values: impl Iterator<Item = f64>, count: usize, decimals: usize) -> String {
    if count == 0 {
        return "0".to_string();
    }
    let mean = values.sum::<f64>() / count as f64;
    let scale = 10f64.powi(decimals as i32);
    // Halves round away from zero
    format!("{:.*}", decimals, (mean * scale).round() / scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::SecondaryValue;

    fn point(value: f64) -> LabeledPoint {
        LabeledPoint {
            time_ms: 0,
            label: "00:00".to_string(),
            value,
        }
    }

    fn record(value1: f64, value2: SecondaryValue) -> AlignedRecord {
        AlignedRecord {
            time_ms: 0,
            label: "00:00".to_string(),
            value1,
            value2,
        }
    }

    #[test]
    fn test_empty_averages() {
        assert_eq!(single_average(&[]), Average::Single("0".to_string()));
        assert_eq!(
            dual_average(&[]),
            Average::Double {
                inside: "0".to_string(),
                outside: "0".to_string()
            }
        );
    }

    #[test]
    fn test_single_average_one_decimal() {
        let points = [point(7.1), point(7.2), point(7.4)];
        assert_eq!(single_average(&points), Average::Single("7.2".to_string()));
        assert_eq!(single_average(&[point(0.25)]), Average::Single("0.3".to_string()));
        assert_eq!(single_average(&[point(20.0)]), Average::Single("20.0".to_string()));
    }

    #[test]
    fn test_dual_average_counts_defaulted_as_zero() {
        let records = [
            record(400.0, SecondaryValue::Present(300.0)),
            record(401.0, SecondaryValue::Defaulted),
        ];
        assert_eq!(
            dual_average(&records),
            Average::Double {
                inside: "401".to_string(),
                outside: "150".to_string()
            }
        );
    }

    #[test]
    fn test_average_serializes_like_the_ui_expects() {
        let json = serde_json::to_value(dual_average(&[])).unwrap();
        assert_eq!(json, serde_json::json!({ "in": "0", "out": "0" }));
        let json = serde_json::to_value(single_average(&[])).unwrap();
        assert_eq!(json, serde_json::json!("0"));
    }
}
