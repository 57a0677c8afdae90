//! Route descriptors.
//!
//! Controllers declare [`RouteDef`]s. When a container composes its route
//! table, every definition is bound into a [`ProxiedRoute`]: the resolver is
//! resolved against its owning controller once, then each ancestor container
//! prefixes the URL and prepends its proxies as the route travels up the tree.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::controller::Controller;
use crate::proxy::{SharedRequestProxy, SharedResponseProxy};
use crate::resolver::{Resolver, SharedResolver};
use crate::schema::ParamSchema;

/// How a route names its resolver.
#[derive(Clone)]
pub enum ResolverRef {
    /// A direct callable.
    Callable(SharedResolver),
    /// The name of a method on the owning controller.
    Method(String),
}

impl ResolverRef {
    /// Wraps a resolver.
    pub fn callable(resolver: impl Resolver) -> Self {
        Self::Callable(Arc::new(resolver))
    }
}

impl From<&str> for ResolverRef {
    fn from(name: &str) -> Self {
        Self::Method(name.to_string())
    }
}

impl From<String> for ResolverRef {
    fn from(name: String) -> Self {
        Self::Method(name)
    }
}

impl From<SharedResolver> for ResolverRef {
    fn from(resolver: SharedResolver) -> Self {
        Self::Callable(resolver)
    }
}

impl fmt::Debug for ResolverRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Method(name) => f.debug_tuple("Method").field(name).finish(),
        }
    }
}

/// A route as declared by a controller.
///
/// ```
/// use lyra_core::{ParamOrigin, ParamSchema, PropertySchema, RouteDef};
///
/// let def = RouteDef::new("/users/{id}", "get_user")
///     .method("GET")
///     .schema_policy("prevent-execution")
///     .schema(ParamSchema::new().property(
///         ParamOrigin::Path,
///         "id",
///         PropertySchema::integer().required(),
///     ));
///
/// assert_eq!(def.url, "/users/{id}");
/// ```
#[derive(Clone)]
pub struct RouteDef {
    /// URL relative to the controller's container.
    pub url: String,
    /// Transport verb tag, if the route is verb-specific.
    pub method: Option<String>,
    /// The resolver reference.
    pub resolver: ResolverRef,
    /// Route-local request proxies.
    pub request_proxies: Vec<SharedRequestProxy>,
    /// Route-local response proxies.
    pub response_proxies: Vec<SharedResponseProxy>,
    /// Policy applied to missing required parameters.
    pub parameter_policy: Option<String>,
    /// Policy applied to schema validation failures.
    pub schema_policy: Option<String>,
    /// Declared parameters.
    pub schema: Option<Arc<ParamSchema>>,
}

impl RouteDef {
    /// Declares a route.
    pub fn new(url: impl Into<String>, resolver: impl Into<ResolverRef>) -> Self {
        Self {
            url: url.into(),
            method: None,
            resolver: resolver.into(),
            request_proxies: Vec::new(),
            response_proxies: Vec::new(),
            parameter_policy: None,
            schema_policy: None,
            schema: None,
        }
    }

    /// Sets the verb tag.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Appends a route-local request proxy.
    #[must_use]
    pub fn request_proxy(mut self, proxy: SharedRequestProxy) -> Self {
        self.request_proxies.push(proxy);
        self
    }

    /// Appends a route-local response proxy.
    #[must_use]
    pub fn response_proxy(mut self, proxy: SharedResponseProxy) -> Self {
        self.response_proxies.push(proxy);
        self
    }

    /// Selects the parameter validation policy.
    #[must_use]
    pub fn parameter_policy(mut self, policy: impl Into<String>) -> Self {
        self.parameter_policy = Some(policy.into());
        self
    }

    /// Selects the schema validation policy.
    #[must_use]
    pub fn schema_policy(mut self, policy: impl Into<String>) -> Self {
        self.schema_policy = Some(policy.into());
        self
    }

    /// Declares the parameter schema.
    #[must_use]
    pub fn schema(mut self, schema: ParamSchema) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }
}

impl fmt::Debug for RouteDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDef")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// A resolver after binding against its controller.
#[derive(Clone)]
pub enum BoundResolver {
    /// Callable and ready.
    Ready(SharedResolver),
    /// The named method does not exist on the controller.
    Unbound(String),
}

impl BoundResolver {
    /// Returns the callable, if bound.
    #[must_use]
    pub fn callable(&self) -> Option<&SharedResolver> {
        match self {
            Self::Ready(resolver) => Some(resolver),
            Self::Unbound(_) => None,
        }
    }

    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Ready(a), Self::Ready(b)) => Arc::ptr_eq(a, b),
            (Self::Unbound(a), Self::Unbound(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for BoundResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Ready(..)"),
            Self::Unbound(name) => f.debug_tuple("Unbound").field(name).finish(),
        }
    }
}

/// A fully composed route: prefixed URL, bound resolver and the complete
/// proxy chains of every ancestor container.
#[derive(Clone)]
pub struct ProxiedRoute {
    /// Composed URL.
    pub url: String,
    /// Transport verb tag, if any.
    pub method: Option<String>,
    /// Name of the owning controller.
    pub controller: Option<String>,
    /// The bound resolver.
    pub resolver: BoundResolver,
    /// Request proxies, root container first.
    pub request_proxies: Vec<SharedRequestProxy>,
    /// Response proxies, root container first.
    pub response_proxies: Vec<SharedResponseProxy>,
    /// Policy applied to missing required parameters.
    pub parameter_policy: Option<String>,
    /// Policy applied to schema validation failures.
    pub schema_policy: Option<String>,
    /// Declared parameters.
    pub schema: Option<Arc<ParamSchema>>,
}

impl ProxiedRoute {
    /// Binds a controller's route definition.
    ///
    /// Method references are looked up on the controller now, so a missing
    /// method is visible as [`BoundResolver::Unbound`] before any request.
    pub fn bind(def: RouteDef, controller: Option<&dyn Controller>) -> Self {
        let resolver = match def.resolver {
            ResolverRef::Callable(resolver) => BoundResolver::Ready(resolver),
            ResolverRef::Method(name) => match controller.and_then(|c| c.method(&name)) {
                Some(resolver) => BoundResolver::Ready(resolver),
                None => {
                    warn!(
                        route = %def.url,
                        controller = controller.map(Controller::name),
                        method = %name,
                        "route names a method its controller does not have"
                    );
                    BoundResolver::Unbound(name)
                }
            },
        };

        Self {
            url: def.url,
            method: def.method,
            controller: controller.map(|c| c.name().to_string()),
            resolver,
            request_proxies: def.request_proxies,
            response_proxies: def.response_proxies,
            parameter_policy: def.parameter_policy,
            schema_policy: def.schema_policy,
            schema: def.schema,
        }
    }

    /// Returns a printable name of the resolver.
    #[must_use]
    pub fn resolver_name(&self) -> String {
        match &self.resolver {
            BoundResolver::Ready(_) => "<callable>".to_string(),
            BoundResolver::Unbound(name) => name.clone(),
        }
    }
}

impl PartialEq for ProxiedRoute {
    fn eq(&self, other: &Self) -> bool {
        fn same_list<T: ?Sized>(a: &[Arc<T>], b: &[Arc<T>]) -> bool {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
        }

        self.url == other.url
            && self.method == other.method
            && self.controller == other.controller
            && self.resolver.same(&other.resolver)
            && same_list(&self.request_proxies, &other.request_proxies)
            && same_list(&self.response_proxies, &other.response_proxies)
            && self.parameter_policy == other.parameter_policy
            && self.schema_policy == other.schema_policy
            && self.schema == other.schema
    }
}

impl fmt::Debug for ProxiedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request: Vec<_> = self.request_proxies.iter().map(|p| p.name().to_string()).collect();
        let response: Vec<_> = self.response_proxies.iter().map(|p| p.name().to_string()).collect();
        f.debug_struct("ProxiedRoute")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("controller", &self.controller)
            .field("resolver", &self.resolver)
            .field("request_proxies", &request)
            .field("response_proxies", &response)
            .field("parameter_policy", &self.parameter_policy)
            .field("schema_policy", &self.schema_policy)
            .finish_non_exhaustive()
    }
}

/// An immutable snapshot of a route table handed to adapters.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Arc<[ProxiedRoute]>,
}

impl RouteTable {
    /// Freezes a list of routes.
    #[must_use]
    pub fn new(routes: Vec<ProxiedRoute>) -> Self {
        Self {
            routes: routes.into(),
        }
    }

    /// Returns the first route with this URL.
    #[must_use]
    pub fn find(&self, url: &str) -> Option<&ProxiedRoute> {
        self.routes.iter().find(|r| r.url == url)
    }

    /// Returns the first route with this URL whose verb tag matches.
    ///
    /// Routes without a verb tag match any method.
    #[must_use]
    pub fn find_with_method(&self, method: &str, url: &str) -> Option<&ProxiedRoute> {
        self.routes.iter().find(|r| {
            r.url == url
                && r.method
                    .as_deref()
                    .map_or(true, |m| m.eq_ignore_ascii_case(method))
        })
    }

    /// Iterates over the routes in table order.
    pub fn iter(&self) -> impl Iterator<Item = &ProxiedRoute> {
        self.routes.iter()
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl From<Vec<ProxiedRoute>> for RouteTable {
    fn from(routes: Vec<ProxiedRoute>) -> Self {
        Self::new(routes)
    }
}
