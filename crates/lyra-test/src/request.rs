//! Request builder for tests.

use lyra_core::{ApiRequest, ParamOrigin};
use serde_json::Value;

/// Fluent builder for [`ApiRequest`]s.
///
/// # Example
///
/// ```
/// use lyra_core::ParamOrigin;
/// use lyra_test::TestRequest;
/// use serde_json::json;
///
/// let request = TestRequest::new()
///     .path("id", json!("7"))
///     .query("expand", json!(true))
///     .build();
///
/// assert_eq!(request.get(&ParamOrigin::Path, "id"), Some(&json!("7")));
/// ```
#[derive(Debug, Default)]
pub struct TestRequest {
    inner: ApiRequest,
}

impl TestRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter under any origin.
    #[must_use]
    pub fn param(mut self, origin: ParamOrigin, name: impl Into<String>, value: Value) -> Self {
        self.inner.set(origin, name, value);
        self
    }

    /// Adds a path parameter.
    #[must_use]
    pub fn path(self, name: impl Into<String>, value: Value) -> Self {
        self.param(ParamOrigin::Path, name, value)
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn query(self, name: impl Into<String>, value: Value) -> Self {
        self.param(ParamOrigin::Query, name, value)
    }

    /// Adds a body property.
    #[must_use]
    pub fn body(self, name: impl Into<String>, value: Value) -> Self {
        self.param(ParamOrigin::Body, name, value)
    }

    /// Adds a header parameter.
    #[must_use]
    pub fn header(self, name: impl Into<String>, value: Value) -> Self {
        self.param(ParamOrigin::Header, name, value)
    }

    /// Adds request metadata.
    #[must_use]
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner.set_metadata(key, value);
        self
    }

    /// Finishes the request.
    #[must_use]
    pub fn build(self) -> ApiRequest {
        self.inner
    }
}

impl From<TestRequest> for ApiRequest {
    fn from(request: TestRequest) -> Self {
        request.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_origins_in_order() {
        let request = TestRequest::new()
            .body("name", json!("Ada"))
            .header("x-tenant", json!("acme"))
            .metadata("adapter", "memory")
            .build();

        let origins: Vec<_> = request.origins().cloned().collect();
        assert_eq!(origins, vec![ParamOrigin::Body, ParamOrigin::Header]);
        assert_eq!(request.metadata("adapter"), Some("memory"));
    }
}
