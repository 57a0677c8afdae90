//! Controllers: the leaves of the container tree.

use crate::resolver::SharedResolver;
use crate::route::RouteDef;

/// A leaf that produces routes.
///
/// Route definitions may point at a resolver directly or name a method on the
/// controller. Named methods are looked up through [`Controller::method`] once,
/// when the routes are composed into a container's table.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use lyra_core::{ApiRequest, Controller, FnResolver, Outcome, RouteDef, SharedResolver};
/// use serde_json::{json, Value};
///
/// struct Health;
///
/// impl Controller for Health {
///     fn name(&self) -> &str {
///         "health"
///     }
///
///     fn routes(&self) -> Vec<RouteDef> {
///         vec![RouteDef::new("/health", "check")]
///     }
///
///     fn method(&self, name: &str) -> Option<SharedResolver> {
///         match name {
///             "check" => Some(Arc::new(FnResolver::new(|_r: ApiRequest| async move {
///                 Outcome::<Value>::Ok(json!("up"))
///             }))),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Controller: Send + Sync + 'static {
    /// Returns the controller name, used in logs and on composed routes.
    fn name(&self) -> &str;

    /// Returns the routes this controller serves.
    fn routes(&self) -> Vec<RouteDef>;

    /// Looks up a named method.
    fn method(&self, name: &str) -> Option<SharedResolver> {
        let _ = name;
        None
    }
}
