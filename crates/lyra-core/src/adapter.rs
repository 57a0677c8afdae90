//! The adapter boundary.
//!
//! Adapters translate a transport's calls into [`ApiRequest`]s, hand them to
//! the engine through a [`HandleFn`], and translate the resulting
//! [`ApiResponse`] or [`ApiError`] back into the transport's representation.

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::error::{ApiError, MaestroResult};
use crate::future::BoxFuture;
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::route::{ProxiedRoute, RouteTable};

/// Runtime tag identifying an adapter implementation.
///
/// Containers restrict which adapters serve their routes by listing kinds.
/// Equality is by [`TypeId`]; the type name is only kept for diagnostics.
#[derive(Clone, Copy)]
pub struct AdapterKind {
    id: TypeId,
    name: &'static str,
}

impl AdapterKind {
    /// Returns the kind of the adapter type `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for AdapterKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AdapterKind {}

impl std::hash::Hash for AdapterKind {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AdapterKind").field(&self.name).finish()
    }
}

/// Callback delivering a successful response to the transport.
pub type SendResponse = Box<dyn FnOnce(ApiResponse) + Send>;

/// Callback delivering an error value to the transport.
pub type SendError = Box<dyn FnOnce(ApiError) + Send>;

/// The engine's entry point as seen by adapters.
///
/// Exactly one of the two callbacks is invoked when the returned future
/// resolves to `Ok(())`. On `Err`, neither is invoked: the error is a wiring
/// fault and belongs to whoever configured the engine.
pub type HandleFn = Arc<
    dyn Fn(ProxiedRoute, ApiRequest, SendResponse, SendError) -> BoxFuture<'static, MaestroResult<()>>
        + Send
        + Sync,
>;

/// Errors an adapter may report while being wired or started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// `start()` was called before a request handler was set.
    #[error("no request handler set")]
    NoHandler,

    /// The adapter cannot serve the given routes.
    #[error("invalid route table: {0}")]
    InvalidRoutes(String),

    /// Any other start-up failure.
    #[error("{0}")]
    Start(String),
}

/// A transport binding.
pub trait Adapter: Send + Sync + 'static {
    /// Returns the registration name. Names are unique within an engine.
    fn name(&self) -> &str;

    /// Returns this adapter's kind.
    fn kind(&self) -> AdapterKind;

    /// Returns further kinds this adapter counts as, e.g. a generic
    /// "http" marker shared by several concrete adapters.
    fn also_kinds(&self) -> Vec<AdapterKind> {
        Vec::new()
    }

    /// Returns true if the adapter is of `kind` or declares it.
    fn is_kind(&self, kind: &AdapterKind) -> bool {
        self.kind() == *kind || self.also_kinds().contains(kind)
    }

    /// Wires the engine's callback.
    fn set_request_handler(&mut self, handle: HandleFn);

    /// Hands over the routes this adapter serves.
    fn add_api_container(&mut self, routes: RouteTable);

    /// Starts accepting transport input.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] when the adapter cannot start.
    fn start(&mut self) -> Result<(), AdapterError>;

    /// Stops accepting transport input.
    ///
    /// Called by the engine on adapters it already started when a later
    /// adapter fails to start. Must be safe to call on a stopped adapter.
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Http;
    struct Grpc;
    struct HttpMarker;

    struct Fixed {
        kind: AdapterKind,
        extra: Vec<AdapterKind>,
    }

    impl Adapter for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn kind(&self) -> AdapterKind {
            self.kind
        }

        fn also_kinds(&self) -> Vec<AdapterKind> {
            self.extra.clone()
        }

        fn set_request_handler(&mut self, _handle: HandleFn) {}

        fn add_api_container(&mut self, _routes: RouteTable) {}

        fn start(&mut self) -> Result<(), AdapterError> {
            Ok(())
        }

        fn stop(&mut self) {}
    }

    #[test]
    fn test_kind_equality_is_by_type() {
        assert_eq!(AdapterKind::of::<Http>(), AdapterKind::of::<Http>());
        assert_ne!(AdapterKind::of::<Http>(), AdapterKind::of::<Grpc>());
        assert!(AdapterKind::of::<Http>().name().ends_with("Http"));
    }

    #[test]
    fn test_is_kind_includes_declared_kinds() {
        let adapter = Fixed {
            kind: AdapterKind::of::<Http>(),
            extra: vec![AdapterKind::of::<HttpMarker>()],
        };

        assert!(adapter.is_kind(&AdapterKind::of::<Http>()));
        assert!(adapter.is_kind(&AdapterKind::of::<HttpMarker>()));
        assert!(!adapter.is_kind(&AdapterKind::of::<Grpc>()));
    }
}
