//! Canonical response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Exit code of a successful default response.
pub const EXIT_OK: &str = "OK";

/// Status used when a resolver returns a bare value.
pub const DEFAULT_STATUS: u16 = 201;

/// An out-of-band instruction addressed to a named adapter.
///
/// The engine carries commands through untouched; what an adapter does with
/// them is up to the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterCommand {
    /// Name of the adapter the command is for.
    pub adapter: String,
    /// Command name.
    pub command: String,
    /// Command arguments.
    #[serde(default)]
    pub args: Value,
}

impl AdapterCommand {
    /// Creates a command with no arguments.
    #[must_use]
    pub fn new(adapter: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            adapter: adapter.into(),
            command: command.into(),
            args: Value::Null,
        }
    }

    /// Sets the command arguments.
    #[must_use]
    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }
}

/// The canonical response produced by the pipeline.
///
/// # Example
///
/// ```
/// use lyra_core::ApiResponse;
/// use serde_json::json;
///
/// let response = ApiResponse::ok(json!(42));
/// assert_eq!(response.exit_code, "OK");
/// assert_eq!(response.status, 201);
/// assert!(response.commands.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Application exit code.
    pub exit_code: String,
    /// Response payload.
    pub payload: Value,
    /// Transport status (HTTP semantics).
    pub status: u16,
    /// Commands for adapters.
    #[serde(default)]
    pub commands: Vec<AdapterCommand>,
}

impl ApiResponse {
    /// Wraps a bare value as the default success response.
    #[must_use]
    pub fn ok(payload: Value) -> Self {
        Self {
            exit_code: EXIT_OK.to_string(),
            payload,
            status: DEFAULT_STATUS,
            commands: Vec::new(),
        }
    }

    /// Creates a response with explicit fields.
    #[must_use]
    pub fn new(exit_code: impl Into<String>, status: u16, payload: Value) -> Self {
        Self {
            exit_code: exit_code.into(),
            payload,
            status,
            commands: Vec::new(),
        }
    }

    /// Replaces the status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Appends an adapter command.
    #[must_use]
    pub fn with_command(mut self, command: AdapterCommand) -> Self {
        self.commands.push(command);
        self
    }

    /// Returns the commands addressed to `adapter`.
    pub fn commands_for<'a>(&'a self, adapter: &'a str) -> impl Iterator<Item = &'a AdapterCommand> {
        self.commands.iter().filter(move |c| c.adapter == adapter)
    }
}
