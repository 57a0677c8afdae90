//! The `property-validator` pipe.

use std::sync::Arc;

use lyra_config::{DEFAULT_POLICY, PROPERTY_VALIDATOR};
use lyra_core::{ApiRequest, BoxFuture, Outcome, ProxiedRoute};
use tracing::debug;

use super::kinds::check_kind;
use crate::pipe::RequestPipe;
use crate::policy::{PolicyVault, PropertyFailure};

/// Validates every present property that has a schema entry.
///
/// Origins and properties are visited in request order. Each property gets
/// the kind check and then its custom validator; the kind error wins when
/// both fail. Failures go to the route's `schema_policy` (or this pipe's
/// default), and the first policy that returns an error ends the pipe with
/// it. Properties without a schema entry are ignored.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    vault: Arc<PolicyVault>,
    default_policy: String,
}

impl SchemaValidator {
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

impl RequestPipe for SchemaValidator {
    fn name(&self) -> &str {
        PROPERTY_VALIDATOR
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
            let policy_name = route.schema_policy.as_deref().unwrap_or(&self.default_policy);

            for origin in request.origins() {
                let (Some(params), Some(declared)) = (request.by_origin(origin), schema.origin(origin))
                else {
                    continue;
                };

                for (name, value) in params {
                    let Some(property) = declared.properties.get(name) else {
                        continue;
                    };

                    let kind_check = check_kind(property.kind, value);
                    let custom_check = match &property.validator {
                        Some(validator) => validator.validate(value).await,
                        None => Ok(()),
                    };

                    let error = match (kind_check, custom_check) {
                        (Err(error), _) | (Ok(()), Err(error)) => error,
                        (Ok(()), Ok(())) => continue,
                    };
                    let error = if error.origin().is_none() {
                        error.at(origin.clone(), name.clone())
                    } else {
                        error
                    };

                    debug!(
                        request_id = %request.request_id(),
                        route = %route.url,
                        origin = %origin,
                        property = %name,
                        policy = policy_name,
                        "property failed validation"
                    );

                    let policy = self.vault.resolve(Some(policy_name));
                    policy
                        .decide(PropertyFailure {
                            route,
                            request,
                            origin,
                            property: name,
                            error,
                        })
                        .await?;
                }
            }

            Ok(())
        })
    }
}
