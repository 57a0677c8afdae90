//! Captured engine output.

use lyra_core::{ApiError, ApiResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TestError;

/// Which callback the engine called.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// `send_response` was called.
    Response(ApiResponse),
    /// `send_error` was called.
    Error(ApiError),
}

/// The result of one dispatch with helper methods for assertions.
#[derive(Debug, Clone)]
pub struct TestResponse {
    outcome: Dispatched,
    callbacks: usize,
}

impl TestResponse {
    /// Wraps a captured outcome.
    #[must_use]
    pub const fn new(outcome: Dispatched, callbacks: usize) -> Self {
        Self { outcome, callbacks }
    }

    /// Returns the captured outcome.
    #[must_use]
    pub const fn outcome(&self) -> &Dispatched {
        &self.outcome
    }

    /// How many callbacks the engine invoked. Always 1 for a well-behaved engine.
    #[must_use]
    pub const fn callbacks(&self) -> usize {
        self.callbacks
    }

    /// Returns true if `send_response` was called.
    #[must_use]
    pub const fn is_response(&self) -> bool {
        matches!(self.outcome, Dispatched::Response(_))
    }

    /// Returns true if `send_error` was called.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.outcome, Dispatched::Error(_))
    }

    /// Returns the response, if one was sent.
    #[must_use]
    pub const fn response(&self) -> Option<&ApiResponse> {
        match &self.outcome {
            Dispatched::Response(r) => Some(r),
            Dispatched::Error(_) => None,
        }
    }

    /// Returns the error, if one was sent.
    #[must_use]
    pub const fn error(&self) -> Option<&ApiError> {
        match &self.outcome {
            Dispatched::Error(e) => Some(e),
            Dispatched::Response(_) => None,
        }
    }

    /// Status of whichever value was sent.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match &self.outcome {
            Dispatched::Response(r) => r.status,
            Dispatched::Error(e) => e.status(),
        }
    }

    /// Returns the response payload, if a response was sent.
    #[must_use]
    pub fn payload(&self) -> Option<&Value> {
        self.response().map(|r| &r.payload)
    }

    /// Deserializes the response payload.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        let response = self.expect_response()?;
        Ok(serde_json::from_value(response.payload.clone())?)
    }

    /// Returns the response or fails with the error that was sent instead.
    pub fn expect_response(&self) -> Result<&ApiResponse, TestError> {
        match &self.outcome {
            Dispatched::Response(r) => Ok(r),
            Dispatched::Error(e) => Err(TestError::UnexpectedError(e.clone())),
        }
    }

    /// Returns the error or fails if a response was sent instead.
    pub fn expect_error(&self) -> Result<&ApiError, TestError> {
        match &self.outcome {
            Dispatched::Error(e) => Ok(e),
            Dispatched::Response(_) => Err(TestError::UnexpectedResponse),
        }
    }
}
