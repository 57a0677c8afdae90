//! Canonical request types.
//!
//! Adapters translate transport calls into an [`ApiRequest`]: parameters
//! grouped by [`ParamOrigin`], each origin a name → JSON value map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for one request easy to
/// correlate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a request parameter came from.
///
/// Serialised as a lowercase string; unknown names round-trip through
/// [`ParamOrigin::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParamOrigin {
    /// Path segment parameters (`/users/{id}`).
    Path,
    /// Query string parameters.
    Query,
    /// Decoded body fields.
    Body,
    /// Transport headers.
    Header,
    /// Cookies.
    Cookie,
    /// Adapter-specific origin.
    Custom(String),
}

impl ParamOrigin {
    /// Returns the origin's name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Body => "body",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for ParamOrigin {
    fn from(value: &str) -> Self {
        match value {
            "path" => Self::Path,
            "query" => Self::Query,
            "body" => Self::Body,
            "header" => Self::Header,
            "cookie" => Self::Cookie,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for ParamOrigin {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ParamOrigin> for String {
    fn from(origin: ParamOrigin) -> Self {
        origin.as_str().to_string()
    }
}

impl fmt::Display for ParamOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one origin, in insertion order.
pub type OriginParams = IndexMap<String, Value>;

/// The canonical request handed to the pipeline.
///
/// # Example
///
/// ```
/// use lyra_core::{ApiRequest, ParamOrigin};
/// use serde_json::json;
///
/// let request = ApiRequest::new()
///     .with_param(ParamOrigin::Path, "id", json!("42"))
///     .with_param(ParamOrigin::Query, "verbose", json!(true));
///
/// assert_eq!(request.get(&ParamOrigin::Path, "id"), Some(&json!("42")));
/// assert_eq!(request.origins().count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    request_id: RequestId,
    params: IndexMap<ParamOrigin, OriginParams>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    metadata: IndexMap<String, String>,
}

impl ApiRequest {
    /// Creates an empty request with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty request with a known request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            ..Self::default()
        }
    }

    /// Builder-style [`ApiRequest::set`].
    #[must_use]
    pub fn with_param(mut self, origin: ParamOrigin, name: impl Into<String>, value: Value) -> Self {
        self.set(origin, name, value);
        self
    }

    /// Builder-style metadata insertion.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns all parameters of one origin.
    #[must_use]
    pub fn by_origin(&self, origin: &ParamOrigin) -> Option<&OriginParams> {
        self.params.get(origin)
    }

    /// Returns the origins present on this request, in insertion order.
    pub fn origins(&self) -> impl Iterator<Item = &ParamOrigin> {
        self.params.keys()
    }

    /// Returns one parameter.
    #[must_use]
    pub fn get(&self, origin: &ParamOrigin, name: &str) -> Option<&Value> {
        self.params.get(origin).and_then(|params| params.get(name))
    }

    /// Returns one parameter mutably.
    pub fn get_mut(&mut self, origin: &ParamOrigin, name: &str) -> Option<&mut Value> {
        self.params
            .get_mut(origin)
            .and_then(|params| params.get_mut(name))
    }

    /// Sets a parameter, returning the previous value.
    pub fn set(&mut self, origin: ParamOrigin, name: impl Into<String>, value: Value) -> Option<Value> {
        self.params.entry(origin).or_default().insert(name.into(), value)
    }

    /// Removes a parameter, preserving the order of the remaining ones.
    pub fn remove(&mut self, origin: &ParamOrigin, name: &str) -> Option<Value> {
        self.params
            .get_mut(origin)
            .and_then(|params| params.shift_remove(name))
    }

    /// Returns a metadata entry.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Sets a metadata entry.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }
}
