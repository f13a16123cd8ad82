use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the pattern engine and its configuration.
///
/// Sensor failures have no variant: a failing channel degrades to "no
/// reading" instead.
#[derive(Debug, Error)]
pub enum Error {
    /// No scenario with this name is configured
    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),

    /// Pattern name not in the pattern library
    #[error("unknown pattern `{0}`")]
    UnknownPattern(String),

    /// Color profile referenced but not configured
    #[error("unknown color profile `{0}`")]
    UnknownColorProfile(String),

    /// Cycle time is zero, negative or not finite
    #[error("scenario `{name}` has non-positive cycle time {cycle_time}")]
    InvalidCycleTime { name: String, cycle_time: f32 },

    /// Surface grids are malformed or reuse an address
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// Calibration file cannot be read or has too few rows
    #[error("calibration file {path} is missing or corrupt: {reason}")]
    CalibrationFileMissingOrCorrupt { path: PathBuf, reason: String },

    /// Calibration file cannot be written
    #[error("cannot write calibration file {path}: {source}")]
    CalibrationWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while reading or writing a cache file
    #[error("pattern cache {path}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file cannot be read or parsed
    #[error("configuration: {0}")]
    Config(String),

    /// Render requested before any scenario was activated
    #[error("no scenario is active")]
    NotActive,
}

pub type Result<T> = core::result::Result<T, Error>;
