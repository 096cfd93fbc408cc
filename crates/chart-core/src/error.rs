// File: crates/chart-core/src/error.rs
// Summary: Error type shared by the scale, time-axis and rendering pipeline.

use thiserror::Error;

use crate::types::Side;

pub type Result<T> = std::result::Result<T, ChartError>;

/// Fatal problems that abort a render before anything is drawn.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChartError {
    #[error("Incorrect value for field \"{field}\": {value}.")]
    InvalidInterval { field: &'static str, value: String },

    #[error("Y axis MAX value must be greater than Y axis MIN value ({side:?} axis: min {min}, max {max}).")]
    InvalidScale { side: Side, min: f64, max: f64 },

    #[error("Invalid work period: {0}")]
    InvalidWorkPeriod(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid chart size {width}x{height}")]
    InvalidSize { width: i64, height: i64 },

    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    #[error("Unknown time zone: {0}")]
    InvalidTimezone(String),
}
