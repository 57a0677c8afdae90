//! The `schema-enforcer` pipe.

use std::sync::Arc;

use lyra_config::{DEFAULT_POLICY, SCHEMA_ENFORCER};
use lyra_core::{ApiError, ApiRequest, BoxFuture, Outcome, ProxiedRoute};

use crate::pipe::RequestPipe;
use crate::policy::{PolicyVault, PropertyFailure};

/// Error code for a missing required property.
pub const MISSING_PROPERTY: &str = "MISSING_PROPERTY";

/// Checks that every required property is present.
///
/// Missing properties are handed to the route's `parameter_policy` (or this
/// pipe's default) in schema declaration order.
#[derive(Debug, Clone)]
pub struct SchemaEnforcer {
    vault: Arc<PolicyVault>,
    default_policy: String,
}

impl SchemaEnforcer {
    /// Creates the pipe with `prevent-execution` as its default policy.
    pub fn new(vault: Arc<PolicyVault>) -> Self {
        Self {
            vault,
            default_policy: DEFAULT_POLICY.to_string(),
        }
    }

    /// Sets the policy used when a route names none.
    #[must_use]
    pub fn with_default_policy(mut self, policy: impl Into<String>) -> Self {
        self.default_policy = policy.into();
        self
    }
}

impl RequestPipe for SchemaEnforcer {
    fn name(&self) -> &str {
        SCHEMA_ENFORCER
    }

    fn pipe<'a>(
        &'a self,
        route: &'a ProxiedRoute,
        request: &'a mut ApiRequest,
    ) -> BoxFuture<'a, Outcome<()>> {
        Box::pin(async move {
            let Some(schema) = route.schema.as_deref() else {
                return Ok(());
            };
            let request: &ApiRequest = request;
            let policy_name = route
                .parameter_policy
                .as_deref()
                .unwrap_or(&self.default_policy);

            for (origin, name, property) in schema.iter() {
                if !property.required || request.get(origin, name).is_some() {
                    continue;
                }

                let error = ApiError::validation(format!("missing required {origin} property '{name}'"))
                    .with_code(MISSING_PROPERTY)
                    .at(origin.clone(), name);

                self.vault
                    .resolve(Some(policy_name))
                    .decide(PropertyFailure {
                        route,
                        request,
                        origin,
                        property: name,
                        error,
                    })
                    .await?;
            }

            Ok(())
        })
    }
}
