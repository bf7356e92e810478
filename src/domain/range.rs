// Time range presets offered by chart panels
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Inclusive query range handed to the sensor API. Not validated: an inverted
/// range is passed through as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn start_param(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn end_param(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Range selector values. Day presets are calendar-aligned in local time;
/// the others slide back from "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RangePreset {
    #[default]
    Today,
    Yesterday,
    ThreeDays,
    Week,
    Month,
}

impl RangePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangePreset::Today => "today",
            RangePreset::Yesterday => "yesterday",
            RangePreset::ThreeDays => "3 days",
            RangePreset::Week => "week",
            RangePreset::Month => "month",
        }
    }

    /// Resolve against `now`, using `now`'s zone for calendar days.
    pub fn resolve<Tz: TimeZone>(&self, now: DateTime<Tz>) -> TimeRange {
        match self {
            RangePreset::Today => whole_day(&now.timezone(), now.date_naive()),
            RangePreset::Yesterday => {
                let day = now.date_naive().pred_opt().unwrap_or(now.date_naive());
                whole_day(&now.timezone(), day)
            }
            RangePreset::ThreeDays => sliding(now, 3),
            RangePreset::Week => sliding(now, 7),
            RangePreset::Month => sliding(now, 30),
        }
    }
}

fn sliding<Tz: TimeZone>(now: DateTime<Tz>, days: i64) -> TimeRange {
    let end = now.with_timezone(&Utc);
    TimeRange::new(end - Duration::days(days), end)
}

fn whole_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> TimeRange {
    let start = day.and_hms_milli_opt(0, 0, 0, 0).unwrap_or_default();
    let end = day.and_hms_milli_opt(23, 59, 59, 999).unwrap_or_default();
    TimeRange::new(local_to_utc(tz, start), local_to_utc(tz, end))
}

fn local_to_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        // Wall-clock time skipped by a DST jump
        None => naive.and_utc(),
    }
}

impl std::fmt::Display for RangePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RangePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "today" => Ok(RangePreset::Today),
            "yesterday" => Ok(RangePreset::Yesterday),
            "3 days" | "3days" => Ok(RangePreset::ThreeDays),
            "week" => Ok(RangePreset::Week),
            "month" => Ok(RangePreset::Month),
            other => Err(format!(
                "unknown range preset: {}, expected today, yesterday, 3 days, week, or month",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for RangePreset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for RangePreset {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
