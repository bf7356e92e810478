// Raw sensor records as served by the document store, and their normalization
use super::errors::NormalizationError;
use super::telemetry::Point;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

/// One document from `GET /{stream}/filter`. Only the sample itself is kept;
/// `metadata` and store ids are ignored. `normalize` decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawReading {
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default)]
    pub value: Value,
}

#[cfg(test)]
impl RawReading {
    pub fn new(timestamp: Value, value: Value) -> Self {
        Self { timestamp, value }
    }
}

/// One entry of `GET /latest-all/{device_id}`, before its value is checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLatest {
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Latest usable reading of one stream.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestReading {
    pub value: f64,
    pub unit: Option<String>,
}

pub fn normalize(raw: &RawReading) -> Result<Point, NormalizationError> {
    let time_ms = parse_timestamp(&raw.timestamp)?;
    let value = parse_value(&raw.value)?;
    Ok(Point::new(time_ms, value))
}

/// Same value rules as `normalize`; an entry that fails them has no card value.
pub fn normalize_latest(raw: RawLatest) -> Result<LatestReading, NormalizationError> {
    let value = parse_value(&raw.value)?;
    Ok(LatestReading {
        value,
        unit: raw.unit,
    })
}

fn parse_timestamp(raw: &Value) -> Result<i64, NormalizationError> {
    match raw {
        Value::Null => Err(NormalizationError::MissingTimestamp),
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .ok_or_else(|| NormalizationError::InvalidTimestamp(n.to_string())),
        // Extended JSON, e.g. {"$date": "2025-05-01T00:00:00Z"}
        Value::Object(map) => match map.get("$date") {
            Some(inner) => parse_timestamp(inner),
            None => Err(NormalizationError::InvalidTimestamp(raw.to_string())),
        },
        other => Err(NormalizationError::InvalidTimestamp(other.to_string())),
    }
}

fn parse_timestamp_str(s: &str) -> Result<i64, NormalizationError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z") {
        return Ok(dt.timestamp_millis());
    }
    // Offset-less ISO strings and date-only strings are read as UTC
    [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%MZ",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    .or_else(|| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    })
    .map(|naive| naive.and_utc().timestamp_millis())
    .ok_or_else(|| NormalizationError::InvalidTimestamp(s.to_string()))
}

fn parse_value(raw: &Value) -> Result<f64, NormalizationError> {
    let value = match raw {
        Value::Null => return Err(NormalizationError::MissingValue),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => return Err(NormalizationError::MissingValue),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| NormalizationError::NonNumericValue(raw.to_string()))
}
