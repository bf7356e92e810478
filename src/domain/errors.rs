// Error taxonomy shared across layers
use thiserror::Error;

/// Why a raw record could not become a point. The record is dropped, never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizationError {
    #[error("record has no timestamp")]
    MissingTimestamp,
    #[error("unparseable timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("record has no value")]
    MissingValue,
    #[error("non-numeric value: {0}")]
    NonNumericValue(String),
}

/// Failure talking to the sensor data API. Transport details arrive as text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("sensor API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Missing or malformed user input, rejected before any fetch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Please select a device")]
    MissingDevice,
    #[error("Please select both start and end dates")]
    MissingRange,
    #[error("Please select at least one collection to download")]
    NoStreams,
    #[error("Invalid {field} date: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

/// Text shown to users when a panel could not load its data.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data";
