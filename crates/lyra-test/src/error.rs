//! Test error types.

use lyra_core::{ApiError, MaestroError};
use thiserror::Error;

/// Errors that can occur while dispatching through a [`TestAdapter`](crate::TestAdapter).
#[derive(Error, Debug)]
pub enum TestError {
    /// The adapter has not been given a request handler yet.
    #[error("adapter has no request handler; start the engine first")]
    NotStarted,

    /// No route in the adapter's table matches.
    #[error("no route for {url}")]
    RouteNotFound {
        /// The requested URL.
        url: String,
    },

    /// The engine finished without calling either callback.
    #[error("engine returned without calling send_response or send_error")]
    NoCallback,

    /// The engine reported a configuration fault.
    #[error("engine fault: {0}")]
    Fatal(#[from] MaestroError),

    /// An error was sent where a response was expected.
    #[error("expected a response, got error {0}")]
    UnexpectedError(ApiError),

    /// A response was sent where an error was expected.
    #[error("expected an error, got a response")]
    UnexpectedResponse,

    /// Payload deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
