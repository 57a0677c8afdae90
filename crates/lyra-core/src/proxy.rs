//! Request and response proxies.
//!
//! A proxy transforms a request before resolution or a response after it.
//! Proxies attached to containers are composed onto every route below them:
//! request proxies run root-to-leaf, response proxies run leaf-to-root.
//!
//! Returning `Err(ApiError)` short-circuits the remaining proxies and becomes
//! the request's final error.

use std::future::Future;
use std::sync::Arc;

use crate::error::Outcome;
use crate::future::BoxFuture;
use crate::request::ApiRequest;
use crate::response::ApiResponse;

/// Transforms a request before it reaches the resolver.
///
/// # Example
///
/// ```
/// use lyra_core::{ApiRequest, BoxFuture, Outcome, ParamOrigin, RequestProxy};
/// use serde_json::json;
///
/// struct TagTenant;
///
/// impl RequestProxy for TagTenant {
///     fn name(&self) -> &str {
///         "tag-tenant"
///     }
///
///     fn apply(&self, mut request: ApiRequest) -> BoxFuture<'_, Outcome<ApiRequest>> {
///         Box::pin(async move {
///             request.set(ParamOrigin::Header, "x-tenant", json!("acme"));
///             Ok(request)
///         })
///     }
/// }
/// ```
pub trait RequestProxy: Send + Sync + 'static {
    /// Returns a name for logs.
    fn name(&self) -> &str;

    /// Transforms the request.
    fn apply(&self, request: ApiRequest) -> BoxFuture<'_, Outcome<ApiRequest>>;
}

/// Transforms a response produced by the resolver.
pub trait ResponseProxy: Send + Sync + 'static {
    /// Returns a name for logs.
    fn name(&self) -> &str;

    /// Transforms the response.
    fn apply(&self, response: ApiResponse) -> BoxFuture<'_, Outcome<ApiResponse>>;
}

/// Shared handle to a request proxy. Membership is by pointer identity.
pub type SharedRequestProxy = Arc<dyn RequestProxy>;

/// Shared handle to a response proxy. Membership is by pointer identity.
pub type SharedResponseProxy = Arc<dyn ResponseProxy>;

/// A request proxy built from an async closure.
///
/// ```
/// use lyra_core::{ApiRequest, FnRequestProxy, Outcome, RequestProxy};
///
/// let proxy = FnRequestProxy::new("noop", |request: ApiRequest| async move {
///     Outcome::Ok(request)
/// });
/// assert_eq!(proxy.name(), "noop");
/// ```
pub struct FnRequestProxy<F> {
    name: String,
    func: F,
}

impl<F> FnRequestProxy<F> {
    /// Creates a named request proxy.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F, Fut> RequestProxy for FnRequestProxy<F>
where
    F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<ApiRequest>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, request: ApiRequest) -> BoxFuture<'_, Outcome<ApiRequest>> {
        Box::pin((self.func)(request))
    }
}

/// A response proxy built from an async closure.
pub struct FnResponseProxy<F> {
    name: String,
    func: F,
}

impl<F> FnResponseProxy<F> {
    /// Creates a named response proxy.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F, Fut> ResponseProxy for FnResponseProxy<F>
where
    F: Fn(ApiResponse) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<ApiResponse>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, response: ApiResponse) -> BoxFuture<'_, Outcome<ApiResponse>> {
        Box::pin((self.func)(response))
    }
}

/// Returns true if `list` already holds this exact proxy instance.
pub fn contains_proxy<T: ?Sized>(list: &[Arc<T>], proxy: &Arc<T>) -> bool {
    list.iter().any(|p| Arc::ptr_eq(p, proxy))
}
