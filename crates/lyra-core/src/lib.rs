//! # Lyra Core
//!
//! Core types and traits for the Lyra request-orchestration framework.
//!
//! This crate provides the shapes every other Lyra crate speaks:
//!
//! - [`ApiRequest`] / [`ApiResponse`] - Canonical request and response
//! - [`ApiError`] - Application-level error value, returned as data
//! - [`MaestroError`] - Fatal configuration faults
//! - [`RouteDef`] / [`ProxiedRoute`] - Declared and composed routes
//! - [`Controller`], [`Resolver`], [`RequestProxy`], [`ResponseProxy`] - Pluggable seams
//! - [`Adapter`] - Transport boundary

#![doc(html_root_url = "https://docs.rs/lyra-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod adapter;
mod controller;
mod error;
mod future;
mod proxy;
mod request;
mod resolver;
mod response;
pub mod route;
pub mod schema;
mod url;

pub use adapter::{Adapter, AdapterError, AdapterKind, HandleFn, SendError, SendResponse};
pub use controller::Controller;
pub use error::{
    ApiError, ContainerError, ErrorEnvelope, ErrorKind, MaestroError, MaestroResult, Outcome,
};
pub use future::BoxFuture;
pub use proxy::{
    contains_proxy, FnRequestProxy, FnResponseProxy, RequestProxy, ResponseProxy,
    SharedRequestProxy, SharedResponseProxy,
};
pub use request::{ApiRequest, OriginParams, ParamOrigin, RequestId};
pub use resolver::{FnResolver, Resolved, Resolver, SharedResolver};
pub use response::{AdapterCommand, ApiResponse, DEFAULT_STATUS, EXIT_OK};
pub use route::{BoundResolver, ProxiedRoute, ResolverRef, RouteDef, RouteTable};
pub use schema::{
    AsyncPropertyValidator, FnPropertyValidator, OriginSchema, ParamSchema, PropertyKind,
    PropertySchema, PropertyValidator,
};
pub use url::{join_all, join_url};
