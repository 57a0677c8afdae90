//! Built-in request pipes.
//!
//! | Name | Pipe | Purpose |
//! |------|------|---------|
//! | `property-validator` | [`SchemaValidator`] | Kind and custom checks per present property |
//! | `schema-enforcer` | [`SchemaEnforcer`] | Required properties must be present |
//! | `request-caster` | [`RequestCaster`] | Cast string values to their declared kind |

mod kinds;
mod request_caster;
mod schema_enforcer;
mod schema_validator;

pub use kinds::{cast, check_kind};
pub use request_caster::RequestCaster;
pub use schema_enforcer::SchemaEnforcer;
pub use schema_validator::SchemaValidator;
