//! Resolver dispatch.
//!
//! A [`RequestHandler`] takes a request that passed every pipe and turns it
//! into a final response or error. [`DefaultRequestHandler`] runs, in order:
//!
//! 1. the route's request proxies, root to leaf
//! 2. the bound resolver
//! 3. deferred results, awaited until a concrete value appears
//! 4. wrapping bare values as `{ "OK", 201, payload, [] }`
//! 5. the route's response proxies, leaf to root
//!
//! Application errors from any step end the request as `Ok(Err(error))`.
//! Configuration faults come back as `Err(MaestroError)`.

use std::fmt;

use lyra_config::DEFAULT_MAX_UNWRAP_DEPTH;
use lyra_core::{
    ApiRequest, ApiResponse, BoxFuture, MaestroError, MaestroResult, Outcome, ProxiedRoute,
    Resolved, SharedRequestProxy, SharedResponseProxy,
};
use tracing::debug;

/// The resolver-dispatch step of the engine.
pub trait RequestHandler: Send + Sync + 'static {
    /// Resolves one request.
    fn handle<'a>(
        &'a self,
        route: &'a ProxiedRoute,
        request: ApiRequest,
    ) -> BoxFuture<'a, MaestroResult<Outcome<ApiResponse>>>;
}

/// A request handler built from a closure.
pub struct FnRequestHandler<F> {
    func: F,
}

impl<F> FnRequestHandler<F>
where
    F: for<'a> Fn(&'a ProxiedRoute, ApiRequest) -> BoxFuture<'a, MaestroResult<Outcome<ApiResponse>>>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new closure handler.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> RequestHandler for FnRequestHandler<F>
where
    F: for<'a> Fn(&'a ProxiedRoute, ApiRequest) -> BoxFuture<'a, MaestroResult<Outcome<ApiResponse>>>
        + Send
        + Sync
        + 'static,
{
    fn handle<'a>(
        &'a self,
        route: &'a ProxiedRoute,
        request: ApiRequest,
    ) -> BoxFuture<'a, MaestroResult<Outcome<ApiResponse>>> {
        (self.func)(route, request)
    }
}

impl<F> fmt::Debug for FnRequestHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRequestHandler").finish_non_exhaustive()
    }
}

/// The standard proxy → resolver → proxy flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultRequestHandler {
    max_unwrap_depth: usize,
}

impl DefaultRequestHandler {
    /// Creates a handler allowing 32 chained deferred results.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_max_unwrap_depth(DEFAULT_MAX_UNWRAP_DEPTH)
    }

    /// Creates a handler with a custom deferred-result bound.
    #[must_use]
    pub const fn with_max_unwrap_depth(max_unwrap_depth: usize) -> Self {
        Self { max_unwrap_depth }
    }

    /// How many chained deferred results a resolver may return.
    #[must_use]
    pub const fn max_unwrap_depth(&self) -> usize {
        self.max_unwrap_depth
    }
}

impl Default for DefaultRequestHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestHandler for DefaultRequestHandler {
    fn handle<'a>(
        &'a self,
        route: &'a ProxiedRoute,
        request: ApiRequest,
    ) -> BoxFuture<'a, MaestroResult<Outcome<ApiResponse>>> {
        Box::pin(async move {
            let request_id = request.request_id();

            let request = match apply_request_proxies(&route.request_proxies, request).await {
                Ok(request) => request,
                Err(error) => return Ok(Err(error)),
            };

            let resolver = route.resolver.callable().ok_or_else(|| {
                MaestroError::EndpointNotCallable {
                    route: route.url.clone(),
                    resolver: route.resolver_name(),
                }
            })?;

            debug!(request_id = %request_id, route = %route.url, "invoking resolver");
            let resolved = match resolver.resolve(request).await {
                Ok(resolved) => resolved,
                Err(error) => return Ok(Err(error)),
            };

            let response = match unwrap_resolved(resolved, self.max_unwrap_depth).await? {
                Ok(response) => response,
                Err(error) => return Ok(Err(error)),
            };

            Ok(apply_response_proxies(&route.response_proxies, response).await)
        })
    }
}

async fn apply_request_proxies(
    proxies: &[SharedRequestProxy],
    mut request: ApiRequest,
) -> Outcome<ApiRequest> {
    for proxy in proxies {
        request = proxy.apply(request).await.map_err(|error| {
            debug!(proxy = proxy.name(), error = %error, "request proxy short-circuited");
            error
        })?;
    }
    Ok(request)
}

async fn apply_response_proxies(
    proxies: &[SharedResponseProxy],
    mut response: ApiResponse,
) -> Outcome<ApiResponse> {
    for proxy in proxies.iter().rev() {
        response = proxy.apply(response).await.map_err(|error| {
            debug!(proxy = proxy.name(), error = %error, "response proxy short-circuited");
            error
        })?;
    }
    Ok(response)
}

/// Awaits deferred results until a value or response appears.
async fn unwrap_resolved(
    mut resolved: Resolved,
    max_depth: usize,
) -> MaestroResult<Outcome<ApiResponse>> {
    let mut depth = 0;
    loop {
        resolved = match resolved {
            Resolved::Value(payload) => return Ok(Ok(ApiResponse::ok(payload))),
            Resolved::Response(response) => return Ok(Ok(response)),
            Resolved::Deferred(_) if depth >= max_depth => {
                return Err(MaestroError::UnwrapDepthExceeded { depth });
            }
            Resolved::Deferred(future) => {
                depth += 1;
                match future.await {
                    Ok(next) => next,
                    Err(error) => return Ok(Err(error)),
                }
            }
        };
    }
}
