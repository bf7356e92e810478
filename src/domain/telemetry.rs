// Telemetry data domain models
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use std::collections::HashMap;
use std::fmt::Display;

/// One normalized sample of a stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub time_ms: i64,
    pub value: f64,
}

impl Point {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// A single-stream point carrying its minute label for the chart x-axis.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledPoint {
    pub time_ms: i64,
    pub label: String,
    pub value: f64,
}

/// Value taken from the secondary stream of a dual join.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SecondaryValue {
    Present(f64),
    /// No secondary point at the primary timestamp; charts render it as zero.
    Defaulted,
}

impl SecondaryValue {
    pub fn value(&self) -> f64 {
        match self {
            SecondaryValue::Present(v) => *v,
            SecondaryValue::Defaulted => 0.0,
        }
    }
}

/// Primary and secondary values paired on the primary's exact timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRecord {
    pub time_ms: i64,
    pub label: String,
    pub value1: f64,
    pub value2: SecondaryValue,
}

/// One export row: every stream value observed at a single timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub time_ms: i64,
    pub device_id: String,
    pub values: HashMap<String, f64>,
}

impl WideRow {
    pub fn new(time_ms: i64, device_id: String) -> Self {
        Self {
            time_ms,
            device_id,
            values: HashMap::new(),
        }
    }

    pub fn value(&self, stream: &str) -> Option<f64> {
        self.values.get(stream).copied()
    }
}

/// Coarse `HH:MM` label (24h clock) of a timestamp in the given zone.
pub fn minute_label<Tz>(time_ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_millis_opt(time_ms).single() {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => String::new(),
    }
}

/// ISO-8601 UTC rendering with millisecond precision, e.g. `2025-05-01T10:00:00.000Z`.
pub fn iso_millis(time_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(time_ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_minute_label() {
        // 2025-05-01T10:07:42Z
        let ts = 1_746_094_062_000;
        assert_eq!(minute_label(ts, &Utc), "10:07");

        let bangkok = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(minute_label(ts, &bangkok), "17:07");
    }

    #[test]
    fn test_iso_millis() {
        assert_eq!(iso_millis(1000), "1970-01-01T00:00:01.000Z");
        assert_eq!(iso_millis(1_746_094_062_123), "2025-05-01T10:07:42.123Z");
    }

    #[test]
    fn test_secondary_value() {
        assert_eq!(SecondaryValue::Defaulted.value(), 0.0);
        assert_eq!(SecondaryValue::Present(0.0).value(), 0.0);
        assert_ne!(SecondaryValue::Present(0.0), SecondaryValue::Defaulted);
        assert_eq!(SecondaryValue::Present(4.5).value(), 4.5);
    }
}
