// Domain layer - Pure types and functions, no I/O
pub mod dashboard;
pub mod device;
pub mod errors;
pub mod range;
pub mod reading;
pub mod telemetry;
pub mod viewport;
