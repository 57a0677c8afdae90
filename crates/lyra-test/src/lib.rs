//! # Lyra Test
//!
//! Test utilities for the Lyra framework: an in-memory [`TestAdapter`] that
//! plugs into an engine like any transport would, and lets tests dispatch
//! requests against the route table it was given at start.
//!
//! ## Example
//!
//! ```ignore
//! use lyra_test::{TestAdapter, TestRequest};
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_get_user() {
//!     let adapter = TestAdapter::new("memory");
//!     maestro.add_adapter(adapter.clone())?;
//!     maestro.start()?;
//!
//!     let response = adapter
//!         .dispatch("/users", TestRequest::new().path("id", json!(7)).build())
//!         .await
//!         .unwrap();
//!
//!     assert!(response.is_response());
//!     assert_eq!(response.status(), 201);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/lyra-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod adapter;
mod error;
mod request;
mod response;

pub use adapter::TestAdapter;
pub use error::TestError;
pub use request::TestRequest;
pub use response::{Dispatched, TestResponse};
