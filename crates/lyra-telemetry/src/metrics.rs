//! Engine metrics.
//!
//! Recorded through the `metrics` facade. Lyra installs no exporter; without
//! a recorder every call here is a no-op, so hosts choose where the numbers go.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `lyra_requests_total` | Counter | `outcome`, `stage` | Requests handled by the engine |
//! | `lyra_request_duration_seconds` | Histogram | `outcome` | Time spent inside `handle` |
//! | `lyra_pipe_rejections_total` | Counter | `pipe` | Requests stopped by a pipe |
//! | `lyra_route_recomputations_total` | Counter | - | Route cache misses |

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Requests counter name.
pub const REQUESTS_TOTAL: &str = "lyra_requests_total";

/// Request duration histogram name.
pub const REQUEST_DURATION_SECONDS: &str = "lyra_request_duration_seconds";

/// Pipe rejections counter name.
pub const PIPE_REJECTIONS_TOTAL: &str = "lyra_pipe_rejections_total";

/// Route recomputation counter name.
pub const ROUTE_RECOMPUTATIONS_TOTAL: &str = "lyra_route_recomputations_total";

/// How a request left the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// `send_response` was called.
    Response,
    /// `send_error` was called.
    Error,
    /// A configuration fault was returned.
    Fatal,
}

impl Outcome {
    /// Returns the label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Response => "response",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

/// Registers descriptions for every Lyra metric with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of requests handled by the engine");
    describe_histogram!(REQUEST_DURATION_SECONDS, "Time spent driving one request through the engine");
    describe_counter!(PIPE_REJECTIONS_TOTAL, "Requests rejected by a request pipe");
    describe_counter!(ROUTE_RECOMPUTATIONS_TOTAL, "Container route tables recomputed after invalidation");
}

/// Records a finished request.
///
/// `stage` names where the request ended: `pipe`, `handler` or `dispatch`.
pub fn record_request(outcome: Outcome, stage: &'static str, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "outcome" => outcome.as_str(),
        "stage" => stage
    )
    .increment(1);

    histogram!(REQUEST_DURATION_SECONDS, "outcome" => outcome.as_str()).record(duration.as_secs_f64());
}

/// Records a pipe rejection.
pub fn record_pipe_rejection(pipe: &str) {
    counter!(PIPE_REJECTIONS_TOTAL, "pipe" => pipe.to_string()).increment(1);
}

/// Records a route table recomputation.
pub fn record_route_recomputation() {
    counter!(ROUTE_RECOMPUTATIONS_TOTAL).increment(1);
}
