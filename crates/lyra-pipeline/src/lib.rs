//! # Lyra Pipeline
//!
//! The request pipeline engine of the Lyra framework.
//!
//! ```text
//! adapter ─► handle(route, request)
//!              │
//!              ├─ pipes, in order          (first error → send_error)
//!              ├─ request proxies          (root → leaf)
//!              ├─ resolver                 (deferred results unwrapped)
//!              ├─ default wrap             ("OK", 201, payload, [])
//!              ├─ response proxies         (leaf → root)
//!              └─ send_response | send_error
//! ```
//!
//! - [`Maestro`] - the engine: container tree, pipes, handler, adapters
//! - [`RequestPipe`] - pre-resolution gates; built-ins live in [`pipes`]
//! - [`RequestHandler`] - the resolver-dispatch step
//! - [`PolicyVault`] - named decisions for failed property validation

#![doc(html_root_url = "https://docs.rs/lyra-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod handler;
mod maestro;
mod pipe;
pub mod pipes;
mod policy;

pub use handler::{DefaultRequestHandler, FnRequestHandler, RequestHandler};
pub use maestro::{EngineState, Maestro, UseInMaestro};
pub use pipe::{FnPipe, NamedPipe, RequestPipe};
pub use policy::{
    DontValidate, FnPolicy, LogAndContinue, PolicyVault, PreventExecution, PropertyFailure,
    SharedPolicy, ValidationPolicy, DONT_VALIDATE, LOG_AND_CONTINUE,
};
