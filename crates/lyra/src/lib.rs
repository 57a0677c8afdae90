//! # Lyra
//!
//! **Transport-agnostic request orchestration**
//!
//! Lyra sits between transports and business code:
//!
//! - **Container tree** – controllers grouped under URL prefixes, with
//!   request and response proxies inherited from every ancestor
//! - **Maestro** – the engine that runs pipes, proxies and resolvers
//! - **Validation policies** – named decisions on what a failing property
//!   means for the request
//! - **Adapters** – transports plug in through a single trait and never see
//!   the pipeline
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use lyra::prelude::*;
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
//!         let check: SharedResolver = Arc::new(FnResolver::new(|_r: ApiRequest| async move {
//!             Outcome::<Value>::Ok(json!("up"))
//!         }));
//!         vec![RouteDef::new("/health", check)]
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), MaestroError> {
//! let mut maestro = Maestro::from_config(&LyraConfig::default());
//! maestro.use_in_maestro(Arc::new(Health) as Arc<dyn Controller>)?;
//!
//! let route = maestro.routes()?.remove(0);
//! maestro
//!     .handle(
//!         route,
//!         ApiRequest::new(),
//!         Box::new(|response: ApiResponse| assert_eq!(response.payload, json!("up"))),
//!         Box::new(|error: ApiError| panic!("unexpected {error}")),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! Adapter → Pipes → Request proxies → Resolver
//!                                        ↓
//! Adapter ← Response proxies (reverse) ←─┘
//! ```

#![doc(html_root_url = "https://docs.rs/lyra/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use lyra_core as core;

// Re-export the container tree
pub use lyra_container as container;

// Re-export the engine
pub use lyra_pipeline as pipeline;

// Re-export configuration
pub use lyra_config as config;

// Re-export telemetry
pub use lyra_telemetry as telemetry;

use lyra_config::{LogFormat, LoggingConfig, LyraConfig};
use lyra_telemetry::{LogConfig, TelemetryResult};

/// Converts the logging section of a [`LyraConfig`] into a [`LogConfig`].
///
/// JSON output keeps file and line info off; pretty output turns it on.
#[must_use]
pub fn log_config(logging: &LoggingConfig) -> LogConfig {
    let json_format = logging.format == LogFormat::Json;
    LogConfig {
        enabled: logging.enabled,
        level: logging.level.clone(),
        json_format,
        span_events: false,
        file_line_info: !json_format,
        include_target: true,
    }
}

/// Installs the global log subscriber described by `config`.
///
/// Call once at process start, before building the engine.
///
/// # Errors
///
/// Fails if the level directive does not parse or a subscriber is
/// already installed.
pub fn init_from_config(config: &LyraConfig) -> TelemetryResult<()> {
    lyra_telemetry::init_logging(&log_config(&config.logging))
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use lyra::prelude::*;
///
/// let maestro = Maestro::new();
/// assert_eq!(maestro.state(), EngineState::Configuring);
/// ```
pub mod prelude {
    pub use lyra_core::{
        Adapter, AdapterError, AdapterKind, ApiError, ApiRequest, ApiResponse, Controller,
        ErrorKind, FnRequestProxy, FnResolver, FnResponseProxy, HandleFn, MaestroError,
        MaestroResult, Outcome, ParamOrigin, ParamSchema, PropertySchema, ProxiedRoute,
        Resolved, ResolverRef, RouteDef, RouteTable, SharedRequestProxy, SharedResolver,
        SharedResponseProxy,
    };

    pub use lyra_container::{ContainerId, ContainerTree};

    pub use lyra_pipeline::{
        DefaultRequestHandler, EngineState, FnPipe, FnPolicy, Maestro, NamedPipe,
        PolicyVault, PropertyFailure, RequestHandler, RequestPipe, UseInMaestro,
        ValidationPolicy,
    };

    pub use lyra_config::{ConfigLoader, LyraConfig};
}
