//! Container tree and route composer for Lyra.
//!
//! Containers group controllers, child containers and proxy chains under a
//! shared base URL. [`ContainerTree::all_routes`] flattens a subtree into a
//! list of [`ProxiedRoute`](lyra_core::ProxiedRoute)s: each URL prefixed by
//! every ancestor's base URL and each proxy chain prefixed by every
//! ancestor's proxies.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lyra_container::ContainerTree;
//! use lyra_core::{ApiRequest, Controller, FnResolver, Outcome, RouteDef};
//! use serde_json::{json, Value};
//!
//! struct Health;
//!
//! impl Controller for Health {
//!     fn name(&self) -> &str {
//!         "health"
//!     }
//!
//!     fn routes(&self) -> Vec<RouteDef> {
//!         let check = FnResolver::new(|_r: ApiRequest| async move {
//!             Outcome::<Value>::Ok(json!("up"))
//!         });
//!         vec![RouteDef::new("/health", lyra_core::ResolverRef::callable(check))]
//!     }
//! }
//!
//! let mut tree = ContainerTree::new();
//! let api = tree.create("/api");
//! tree.add_controller(api, Arc::new(Health)).unwrap();
//!
//! let routes = tree.all_routes(api).unwrap();
//! assert_eq!(routes[0].url, "/api/health");
//! ```

#![doc(html_root_url = "https://docs.rs/lyra-container/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod node;
mod tree;

pub use node::ContainerId;
pub use tree::ContainerTree;
