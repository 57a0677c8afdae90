//! The `request-caster` pipe.

use lyra_config::REQUEST_CASTER;
use lyra_core::{ApiRequest, BoxFuture, Outcome, ProxiedRoute};

use super::kinds::cast;
use crate::pipe::RequestPipe;

/// Casts string values to the kind their schema declares.
///
/// `"42"` becomes `42` for integer and number properties, `"true"` becomes
/// `true` for booleans. Values that do not cast are left as they are; this
/// pipe never rejects a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestCaster;

impl RequestCaster {
    /// Creates the pipe.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl RequestPipe for RequestCaster {
    fn name(&self) -> &str {
        REQUEST_CASTER
    }

    fn pipe<'a>(
        &'a self,
        route: &'a ProxiedRoute,
        request: &'a mut ApiRequest,
    ) -> BoxFuture<'a, Outcome<()>> {
        if let Some(schema) = route.schema.as_deref() {
            for (origin, name, property) in schema.iter() {
                if let Some(value) = request.get_mut(origin, name) {
                    if let Some(typed) = cast(property.kind, value) {
                        *value = typed;
                    }
                }
            }
        }
        Box::pin(async { Ok(()) })
    }
}
