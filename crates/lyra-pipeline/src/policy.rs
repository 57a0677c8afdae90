//! The validation policy vault.
//!
//! When a property fails validation, a [`ValidationPolicy`] decides what
//! happens next: `Ok(())` keeps validating the remaining properties, `Err`
//! aborts the request with that error. Routes pick a policy by name; the
//! [`PolicyVault`] maps names to policies and falls back to
//! `prevent-execution` when a route names none or names one that is not
//! registered.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use lyra_config::DEFAULT_POLICY;
use lyra_core::{ApiError, ApiRequest, BoxFuture, Outcome, ParamOrigin, ProxiedRoute};
use parking_lot::RwLock;
use tracing::warn;

/// Name of the policy that continues silently past failures.
pub const DONT_VALIDATE: &str = "dont-validate";

/// Name of the policy that logs failures and continues.
pub const LOG_AND_CONTINUE: &str = "log-and-continue";

/// One failed property, as seen by a policy.
#[derive(Debug)]
pub struct PropertyFailure<'a> {
    /// The route being validated.
    pub route: &'a ProxiedRoute,
    /// The request being validated.
    pub request: &'a ApiRequest,
    /// Where the property came from.
    pub origin: &'a ParamOrigin,
    /// The property name.
    pub property: &'a str,
    /// Why it failed.
    pub error: ApiError,
}

/// Decides whether a property failure aborts the request.
pub trait ValidationPolicy: Send + Sync + 'static {
    /// `Ok(())` continues validation; `Err` aborts with that error.
    fn decide<'a>(&'a self, failure: PropertyFailure<'a>) -> BoxFuture<'a, Outcome<()>>;
}

/// A shared, type-erased policy.
pub type SharedPolicy = Arc<dyn ValidationPolicy>;

/// A policy built from a synchronous closure.
///
/// ```
/// use lyra_core::ApiError;
/// use lyra_pipeline::{FnPolicy, PolicyVault, PropertyFailure};
///
/// let vault = PolicyVault::new();
/// vault.register(
///     "reject-with-422",
///     FnPolicy::new(|failure: PropertyFailure<'_>| {
///         Err(ApiError::unprocessable(failure.error.message()))
///     }),
/// );
/// assert!(vault.get("reject-with-422").is_some());
/// ```
pub struct FnPolicy<F> {
    func: F,
}

impl<F> FnPolicy<F>
where
    F: Fn(PropertyFailure<'_>) -> Outcome<()> + Send + Sync + 'static,
{
    /// Creates a new closure policy.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> ValidationPolicy for FnPolicy<F>
where
    F: Fn(PropertyFailure<'_>) -> Outcome<()> + Send + Sync + 'static,
{
    fn decide<'a>(&'a self, failure: PropertyFailure<'a>) -> BoxFuture<'a, Outcome<()>> {
        let result = (self.func)(failure);
        Box::pin(async move { result })
    }
}

/// Aborts on the first failure with the property's own error.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreventExecution;

impl ValidationPolicy for PreventExecution {
    fn decide<'a>(&'a self, failure: PropertyFailure<'a>) -> BoxFuture<'a, Outcome<()>> {
        Box::pin(async move { Err(failure.error) })
    }
}

/// Ignores failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct DontValidate;

impl ValidationPolicy for DontValidate {
    fn decide<'a>(&'a self, _failure: PropertyFailure<'a>) -> BoxFuture<'a, Outcome<()>> {
        Box::pin(async { Ok(()) })
    }
}

/// Logs failures at `warn` and continues.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAndContinue;

impl ValidationPolicy for LogAndContinue {
    fn decide<'a>(&'a self, failure: PropertyFailure<'a>) -> BoxFuture<'a, Outcome<()>> {
        warn!(
            request_id = %failure.request.request_id(),
            route = %failure.route.url,
            origin = %failure.origin,
            property = failure.property,
            error = %failure.error,
            "property failed validation, continuing"
        );
        Box::pin(async { Ok(()) })
    }
}

/// Named validation policies.
///
/// Shared between the engine and its validation pipes, so policies may be
/// registered after the pipes were built.
pub struct PolicyVault {
    policies: RwLock<IndexMap<String, SharedPolicy>>,
    fallback: SharedPolicy,
}

impl PolicyVault {
    /// Creates a vault holding the built-in policies:
    /// `prevent-execution`, `dont-validate` and `log-and-continue`.
    #[must_use]
    pub fn new() -> Self {
        let vault = Self::empty();
        vault.register(DEFAULT_POLICY, PreventExecution);
        vault.register(DONT_VALIDATE, DontValidate);
        vault.register(LOG_AND_CONTINUE, LogAndContinue);
        vault
    }

    /// Creates a vault with no registered policies.
    ///
    /// Every lookup through [`resolve`](Self::resolve) then prevents execution.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            policies: RwLock::new(IndexMap::new()),
            fallback: Arc::new(PreventExecution),
        }
    }

    /// Registers a policy, returning the one it replaced.
    pub fn register(&self, name: impl Into<String>, policy: impl ValidationPolicy) -> Option<SharedPolicy> {
        self.register_shared(name, Arc::new(policy))
    }

    /// Registers an already shared policy.
    pub fn register_shared(&self, name: impl Into<String>, policy: SharedPolicy) -> Option<SharedPolicy> {
        self.policies.write().insert(name.into(), policy)
    }

    /// Removes a policy by name.
    pub fn remove(&self, name: &str) -> Option<SharedPolicy> {
        self.policies.write().shift_remove(name)
    }

    /// Looks up a policy by exact name.
    pub fn get(&self, name: &str) -> Option<SharedPolicy> {
        self.policies.read().get(name).cloned()
    }

    /// Returns true if a policy is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.policies.read().contains_key(name)
    }

    /// Picks the policy a route asked for.
    ///
    /// `None` selects `prevent-execution`. Unknown names log a warning and
    /// fall back to it as well.
    pub fn resolve(&self, name: Option<&str>) -> SharedPolicy {
        let name = name.unwrap_or(DEFAULT_POLICY);
        if let Some(policy) = self.get(name) {
            return policy;
        }
        warn!(
            policy = name,
            fallback = DEFAULT_POLICY,
            "unknown validation policy"
        );
        self.get(DEFAULT_POLICY)
            .unwrap_or_else(|| self.fallback.clone())
    }

    /// Registered policy names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.policies.read().keys().cloned().collect()
    }
}

impl Default for PolicyVault {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PolicyVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyVault")
            .field("policies", &self.names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_core::{FnResolver, ResolverRef, RouteDef};
    use serde_json::Value;

    fn route() -> ProxiedRoute {
        let resolver = FnResolver::new(|_r: ApiRequest| async move { Outcome::<Value>::Ok(Value::Null) });
        ProxiedRoute::bind(RouteDef::new("/users", ResolverRef::callable(resolver)), None)
    }

    async fn decide(policy: &SharedPolicy) -> Outcome<()> {
        let route = route();
        let request = ApiRequest::new();
        policy
            .decide(PropertyFailure {
                route: &route,
                request: &request,
                origin: &ParamOrigin::Query,
                property: "page",
                error: ApiError::validation("page must be a number"),
            })
            .await
    }

    #[test]
    fn test_builtin_names() {
        let vault = PolicyVault::new();
        assert_eq!(
            vault.names(),
            vec!["prevent-execution", "dont-validate", "log-and-continue"]
        );
    }

    #[tokio::test]
    async fn test_prevent_execution_returns_property_error() {
        let vault = PolicyVault::new();
        let err = decide(&vault.resolve(None)).await.unwrap_err();
        assert_eq!(err.message(), "page must be a number");
    }

    #[tokio::test]
    async fn test_continuing_policies() {
        let vault = PolicyVault::new();
        assert!(decide(&vault.resolve(Some(DONT_VALIDATE))).await.is_ok());
        assert!(decide(&vault.resolve(Some(LOG_AND_CONTINUE))).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_policy_falls_back_to_default() {
        let vault = PolicyVault::new();
        assert!(decide(&vault.resolve(Some("no-such-policy"))).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_vault_still_prevents_execution() {
        let vault = PolicyVault::empty();
        assert!(vault.names().is_empty());
        assert!(decide(&vault.resolve(Some(DONT_VALIDATE))).await.is_err());
    }

    #[tokio::test]
    async fn test_register_replaces_and_remove() {
        let vault = PolicyVault::new();
        let previous = vault.register(DEFAULT_POLICY, DontValidate);
        assert!(previous.is_some());
        assert!(decide(&vault.resolve(None)).await.is_ok());

        assert!(vault.remove(DEFAULT_POLICY).is_some());
        assert!(vault.remove(DEFAULT_POLICY).is_none());
        assert!(!vault.contains(DEFAULT_POLICY));
        assert!(decide(&vault.resolve(None)).await.is_err());
    }

    #[tokio::test]
    async fn test_fn_policy_sees_failure() {
        let policy: SharedPolicy = Arc::new(FnPolicy::new(|failure: PropertyFailure<'_>| {
            assert_eq!(failure.property, "page");
            assert_eq!(failure.route.url, "/users");
            Err(ApiError::unprocessable(format!("{} rejected", failure.origin)))
        }));

        let err = decide(&policy).await.unwrap_err();
        assert_eq!(err.message(), "query rejected");
        assert_eq!(err.status(), 422);
    }
}
