//! Structured logging and engine metrics for Lyra.
//!
//! - **Logging**: a `tracing-subscriber` registry with an `EnvFilter` and a
//!   JSON or pretty formatter ([`init_logging`])
//! - **Metrics**: counters and histograms through the `metrics` facade
//!   ([`metrics`])
//!
//! Lyra performs no network I/O, so no exporter is bundled. Hosts install
//! whichever `metrics` recorder they like and call
//! [`metrics::describe_metrics`] once it is in place.

#![doc(html_root_url = "https://docs.rs/lyra-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
