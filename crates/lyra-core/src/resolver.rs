//! Route resolvers.
//!
//! A [`Resolver`] produces the business result for a route. It may return a
//! bare value (wrapped as a default response by the engine), a full
//! [`ApiResponse`], or a [`Resolved::Deferred`] future that the engine keeps
//! awaiting until a concrete value appears.

use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::Outcome;
use crate::future::BoxFuture;
use crate::request::ApiRequest;
use crate::response::ApiResponse;

/// What a resolver produced.
pub enum Resolved {
    /// A bare payload.
    Value(Value),
    /// A fully shaped response.
    Response(ApiResponse),
    /// A further computation that must be awaited.
    Deferred(BoxFuture<'static, Outcome<Resolved>>),
}

impl Resolved {
    /// Wraps a future as a deferred result.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Outcome<Resolved>> + Send + 'static,
    {
        Self::Deferred(Box::pin(future))
    }

    /// Returns true if this result still has to be awaited.
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Response(r) => f.debug_tuple("Response").field(r).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<Value> for Resolved {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<ApiResponse> for Resolved {
    fn from(response: ApiResponse) -> Self {
        Self::Response(response)
    }
}

/// Produces the result of a route.
pub trait Resolver: Send + Sync + 'static {
    /// Resolves a request.
    fn resolve(&self, request: ApiRequest) -> BoxFuture<'_, Outcome<Resolved>>;
}

/// Shared handle to a resolver.
pub type SharedResolver = Arc<dyn Resolver>;

/// A resolver built from an async closure.
///
/// The closure may return anything convertible into [`Resolved`], so plain
/// `serde_json::Value`s and [`ApiResponse`]s both work.
///
/// ```
/// use lyra_core::{ApiRequest, FnResolver, Outcome};
/// use serde_json::{json, Value};
///
/// let resolver = FnResolver::new(|_request: ApiRequest| async move {
///     Outcome::<Value>::Ok(json!(42))
/// });
/// # let _ = resolver;
/// ```
pub struct FnResolver<F> {
    func: F,
}

impl<F> FnResolver<F> {
    /// Creates a resolver from a closure.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F, Fut, R> Resolver for FnResolver<F>
where
    F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<R>> + Send + 'static,
    R: Into<Resolved> + 'static,
{
    fn resolve(&self, request: ApiRequest) -> BoxFuture<'_, Outcome<Resolved>> {
        let fut = (self.func)(request);
        Box::pin(async move { fut.await.map(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiError;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_resolver_value() {
        let resolver = FnResolver::new(|_r: ApiRequest| async move { Outcome::<Value>::Ok(json!(42)) });

        match resolver.resolve(ApiRequest::new()).await {
            Ok(Resolved::Value(v)) => assert_eq!(v, json!(42)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fn_resolver_response() {
        let resolver = FnResolver::new(|_r: ApiRequest| async move {
            Outcome::Ok(ApiResponse::new("CREATED", 200, json!("x")))
        });

        match resolver.resolve(ApiRequest::new()).await {
            Ok(Resolved::Response(r)) => assert_eq!(r.exit_code, "CREATED"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fn_resolver_error() {
        let resolver = FnResolver::new(|_r: ApiRequest| async move {
            Outcome::<Value>::Err(ApiError::not_found("gone"))
        });

        let err = resolver.resolve(ApiRequest::new()).await.unwrap_err();
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_deferred_debug() {
        let deferred = Resolved::deferred(async { Ok(Resolved::Value(json!(1))) });
        assert!(deferred.is_deferred());
        assert_eq!(format!("{deferred:?}"), "Deferred(..)");
    }
}
