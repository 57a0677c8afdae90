//! Telemetry errors.

use thiserror::Error;

/// Why logging could not be set up.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("log subscriber not installed: {0}")]
    LoggingInit(String),

    /// The filter directive does not parse.
    #[error("bad log filter directive {0}")]
    InvalidFilter(String),
}
