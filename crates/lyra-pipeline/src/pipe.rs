//! The request pipe seam.
//!
//! Pipes are named gates that run, in order, before a route's resolver. Each
//! one may inspect or mutate the request. Returning `Err(ApiError)` stops the
//! request: no further pipe runs and the resolver is never invoked.

use std::fmt;
use std::sync::Arc;

use lyra_core::{ApiRequest, BoxFuture, Outcome, ProxiedRoute};

/// A pre-resolution gate.
///
/// # Example
///
/// ```
/// use lyra_core::{ApiError, ApiRequest, BoxFuture, Outcome, ParamOrigin, ProxiedRoute};
/// use lyra_pipeline::RequestPipe;
///
/// struct RequireTenant;
///
/// impl RequestPipe for RequireTenant {
///     fn name(&self) -> &str {
///         "require-tenant"
///     }
///
///     fn pipe<'a>(
///         &'a self,
///         _route: &'a ProxiedRoute,
///         request: &'a mut ApiRequest,
///     ) -> BoxFuture<'a, Outcome<()>> {
///         Box::pin(async move {
///             match request.get(&ParamOrigin::Header, "x-tenant") {
///                 Some(_) => Ok(()),
///                 None => Err(ApiError::unauthorized("tenant header missing")),
///             }
///         })
///     }
/// }
/// ```
pub trait RequestPipe: Send + Sync + 'static {
    /// Unique name, used by `remove_pipe` and in logs.
    fn name(&self) -> &str;

    /// Runs the gate. `Ok(())` lets the request continue.
    fn pipe<'a>(
        &'a self,
        route: &'a ProxiedRoute,
        request: &'a mut ApiRequest,
    ) -> BoxFuture<'a, Outcome<()>>;
}

/// A shared, type-erased pipe.
pub type NamedPipe = Arc<dyn RequestPipe>;

/// A pipe built from a closure.
///
/// ```
/// use lyra_pipeline::FnPipe;
///
/// let pipe = FnPipe::new("noop", |_route, _request| Box::pin(async { Ok(()) }));
/// assert_eq!(lyra_pipeline::RequestPipe::name(&pipe), "noop");
/// ```
pub struct FnPipe<F> {
    name: String,
    func: F,
}

impl<F> FnPipe<F>
where
    F: for<'a> Fn(&'a ProxiedRoute, &'a mut ApiRequest) -> BoxFuture<'a, Outcome<()>>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new closure pipe.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> RequestPipe for FnPipe<F>
where
    F: for<'a> Fn(&'a ProxiedRoute, &'a mut ApiRequest) -> BoxFuture<'a, Outcome<()>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn pipe<'a>(
        &'a self,
        route: &'a ProxiedRoute,
        request: &'a mut ApiRequest,
    ) -> BoxFuture<'a, Outcome<()>> {
        (self.func)(route, request)
    }
}

impl<F> fmt::Debug for FnPipe<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPipe").field("name", &self.name).finish()
    }
}
