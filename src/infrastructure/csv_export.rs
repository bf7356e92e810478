// CSV rendering for wide export rows
use crate::domain::telemetry::{iso_millis, WideRow};

/// One CSV cell. Text is always quoted, numbers never are.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Text(String),
    Number(f64),
    Empty,
}

impl Field {
    fn render(&self) -> String {
        match self {
            Field::Text(s) => format!("\"{}\"", s.replace('"', "\"\"")),
            Field::Number(n) => format_number(*n),
            Field::Empty => String::new(),
        }
    }
}

/// Shortest round-trip text of a number, switching to exponent notation
/// outside `[1e-6, 1e21)` the way browsers print numbers. Negative zero prints as `0`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if magnitude.is_finite() && (magnitude >= 1e21 || magnitude < 1e-6) {
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        }
    } else {
        n.to_string()
    }
}

/// Header `timestamp,device_id,<streams...>` then one line per row, joined by `\n`.
/// Streams missing from a row render as empty fields.
pub fn render_csv(rows: &[WideRow], streams: &[String]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);

    let mut header = vec!["timestamp".to_string(), "device_id".to_string()];
    header.extend(streams.iter().cloned());
    lines.push(header.join(","));

    for row in rows {
        let mut fields = vec![
            Field::Text(iso_millis(row.time_ms)),
            Field::Text(row.device_id.clone()),
        ];
        fields.extend(
            streams
                .iter()
                .map(|stream| row.value(stream).map_or(Field::Empty, Field::Number)),
        );
        lines.push(fields.iter().map(Field::render).collect::<Vec<_>>().join(","));
    }

    lines.join("\n")
}
