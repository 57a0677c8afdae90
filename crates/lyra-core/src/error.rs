//! Error types for Lyra.
//!
//! Lyra distinguishes two error channels:
//!
//! - [`ApiError`] is an *application-level error value*. Pipes, proxies,
//!   resolvers and validation policies return it as data; it flows through
//!   every pipeline stage until it reaches the adapter's `send_error`.
//! - [`MaestroError`] is a *fatal configuration fault*: a missing request
//!   handler, an endpoint that cannot be called, mutation of a running engine.
//!   These are never sent to a client; they surface to whoever wired the
//!   engine.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::ParamOrigin;

/// Result of any stage that may fail with an application-level error.
///
/// `Outcome<()>` is the "success marker" returned by pipes and policies.
pub type Outcome<T> = Result<T, ApiError>;

/// Result type alias for fatal engine faults.
pub type MaestroResult<T> = Result<T, MaestroError>;

/// Classification of application-level errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A parameter failed schema or custom validation.
    Validation,
    /// Missing or invalid credentials.
    Unauthorized,
    /// The caller is not allowed to perform the operation.
    Forbidden,
    /// The addressed resource does not exist.
    NotFound,
    /// The operation requires payment.
    PaymentRequired,
    /// Concurrent modification or business-rule conflict.
    Conflict,
    /// Well-formed but semantically rejected input.
    Unprocessable,
    /// Unexpected failure inside an endpoint.
    Internal,
    /// Application-defined error.
    Custom,
}

impl ErrorKind {
    /// Returns the default HTTP status for this kind.
    #[must_use]
    pub const fn default_status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal | Self::Custom => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable default code for this kind.
    #[must_use]
    pub const fn default_code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::PaymentRequired => "PAYMENT_REQUIRED",
            Self::Conflict => "CONFLICT",
            Self::Unprocessable => "UNPROCESSABLE",
            Self::Internal => "INTERNAL_ERROR",
            Self::Custom => "APPLICATION_ERROR",
        }
    }
}

/// An application-level error value.
///
/// `ApiError` is plain data: it is cloned, compared and serialised freely.
/// Adapters map it to their transport using [`ApiError::status`] or
/// [`ApiError::to_envelope`].
///
/// # Example
///
/// ```
/// use lyra_core::{ApiError, ErrorKind, ParamOrigin};
///
/// let err = ApiError::validation("must be a positive integer")
///     .at(ParamOrigin::Query, "limit");
///
/// assert_eq!(err.kind(), ErrorKind::Validation);
/// assert_eq!(err.status(), 400);
/// assert_eq!(err.property(), Some("limit"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ApiError {
    kind: ErrorKind,
    code: String,
    message: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<ParamOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ApiError {
    /// Creates an error of the given kind with its default code and status.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.default_code().to_string(),
            message: message.into(),
            status: kind.default_status().as_u16(),
            origin: None,
            property: None,
            details: None,
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates a payment required error.
    #[must_use]
    pub fn payment_required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PaymentRequired, message)
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Creates an unprocessable-input error.
    #[must_use]
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unprocessable, message)
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Creates an application-defined error with an explicit code and status.
    #[must_use]
    pub fn custom(code: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            status,
            ..Self::new(ErrorKind::Custom, message)
        }
    }

    /// Replaces the machine-readable code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Replaces the status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Locates the error on a request parameter.
    #[must_use]
    pub fn at(mut self, origin: ParamOrigin, property: impl Into<String>) -> Self {
        self.origin = Some(origin);
        self.property = Some(property.into());
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the machine-readable code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the transport status (HTTP semantics).
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Returns the parameter origin this error refers to, if any.
    #[must_use]
    pub const fn origin(&self) -> Option<&ParamOrigin> {
        self.origin.as_ref()
    }

    /// Returns the property name this error refers to, if any.
    #[must_use]
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    /// Returns attached details, if any.
    #[must_use]
    pub const fn details(&self) -> Option<&serde_json::Value> {
        self.details.as_ref()
    }

    /// Renders the error as a serialisable envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: self.clone(),
        }
    }
}

/// Serialisable error envelope handed to clients by adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ApiError,
}

/// Fatal configuration faults.
///
/// These indicate a misconfigured system, not a bad request. They are returned
/// from engine configuration calls, from `start()`, and from `handle()` when a
/// request hits a wiring problem that no client could fix.
#[derive(Error, Debug)]
pub enum MaestroError {
    /// The engine has no request handler to dispatch resolved routes.
    #[error("request flow not defined: {0}")]
    RequestFlowNotDefined(String),

    /// A route's resolver could not be turned into a callable.
    #[error("route {route} endpoint '{resolver}' is not callable")]
    EndpointNotCallable {
        /// URL of the offending route.
        route: String,
        /// The unresolved resolver reference.
        resolver: String,
    },

    /// `start()` was called on a running engine.
    #[error("engine already started")]
    AlreadyStarted,

    /// A configuration call was made on a running engine.
    #[error("engine is running; {0} is only allowed while configuring")]
    EngineRunning(&'static str),

    /// A resolver produced a chain of deferred results deeper than allowed.
    #[error("resolver output still deferred after {depth} unwraps")]
    UnwrapDepthExceeded {
        /// The configured unwrap limit.
        depth: usize,
    },

    /// An adapter failed to accept the engine wiring.
    #[error("adapter {adapter} failed: {message}")]
    Adapter {
        /// Adapter name.
        adapter: String,
        /// Failure description.
        message: String,
    },

    /// The container tree rejected a structural change.
    #[error(transparent)]
    Container(#[from] ContainerError),
}

/// Structural errors raised by the container tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// The id does not name a container in this tree.
    #[error("unknown container #{0}")]
    UnknownContainer(usize),

    /// Attaching would make a container its own ancestor.
    #[error("container #{child} cannot be attached below its own descendant #{parent}")]
    Cycle {
        /// Intended parent.
        parent: usize,
        /// Intended child.
        child: usize,
    },

    /// The container already has a different parent.
    #[error("container #{child} is already attached to #{parent}")]
    AlreadyAttached {
        /// Current parent.
        parent: usize,
        /// Container being attached.
        child: usize,
    },
}
