//! Future aliases shared by every pipeline seam.

use std::future::Future;
use std::pin::Pin;

/// A boxed, sendable future.
///
/// Proxies, pipes, resolvers and validators return this so they can be held
/// as trait objects.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
