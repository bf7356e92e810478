// Timestamp joins - pairing streams for charts and widening them for export
use crate::domain::errors::FetchError;
use crate::domain::telemetry::{
    minute_label, AlignedRecord, LabeledPoint, Point, SecondaryValue, WideRow,
};
use chrono::TimeZone;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// Label every point and order by label text. The sort is stable, so points
/// sharing a minute keep their fetch order.
pub fn label_points<Tz>(points: &[Point], tz: &Tz) -> Vec<LabeledPoint>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut labeled: Vec<LabeledPoint> = points
        .iter()
        .map(|p| LabeledPoint {
            time_ms: p.time_ms,
            label: minute_label(p.time_ms, tz),
            value: p.value,
        })
        .collect();
    labeled.sort_by(|a, b| a.label.cmp(&b.label));
    labeled
}

/// Pair each primary point with the secondary point at the exact same
/// timestamp. Secondary points without a primary counterpart are dropped;
/// primary points without one get `SecondaryValue::Defaulted`.
///
/// Ordered lexically by minute label like `label_points`, not by timestamp.
pub fn dual_join<Tz>(primary: &[Point], secondary: &[Point], tz: &Tz) -> Vec<AlignedRecord>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let lookup: HashMap<i64, f64> = secondary.iter().map(|p| (p.time_ms, p.value)).collect();

    let mut records: Vec<AlignedRecord> = primary
        .iter()
        .map(|p| AlignedRecord {
            time_ms: p.time_ms,
            label: minute_label(p.time_ms, tz),
            value1: p.value,
            value2: lookup
                .get(&p.time_ms)
                .map_or(SecondaryValue::Defaulted, |v| SecondaryValue::Present(*v)),
        })
        .collect();
    records.sort_by(|a, b| a.label.cmp(&b.label));
    records
}

#[derive(Debug, Default)]
pub struct MultiJoin {
    /// Ascending by raw timestamp
    pub rows: Vec<WideRow>,
    /// Streams whose fetch failed, in selection order
    pub failed: Vec<String>,
}

/// Widen any number of streams into one row per distinct timestamp.
///
/// Streams are applied in the given order; a failed stream is recorded and
/// skipped without affecting the others.
pub fn multi_join(
    device_id: &str,
    streams: Vec<(String, Result<Vec<Point>, FetchError>)>,
) -> MultiJoin {
    let mut rows: BTreeMap<i64, WideRow> = BTreeMap::new();
    let mut failed = Vec::new();

    for (stream, result) in streams {
        let points = match result {
            Ok(points) => points,
            Err(e) => {
                tracing::warn!("Error fetching data from {}: {}", stream, e);
                failed.push(stream);
                continue;
            }
        };

        for point in points {
            rows.entry(point.time_ms)
                .or_insert_with(|| WideRow::new(point.time_ms, device_id.to_string()))
                .values
                .insert(stream.clone(), point.value);
        }
    }

    MultiJoin {
        rows: rows.into_values().collect(),
        failed,
    }
}
