//! Arena records.

use std::fmt;
use std::sync::Arc;

use lyra_core::{AdapterKind, Controller, ProxiedRoute, SharedRequestProxy, SharedResponseProxy};
use parking_lot::Mutex;

/// Stable identifier of a container inside a [`ContainerTree`](crate::ContainerTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub(crate) usize);

impl ContainerId {
    /// Returns the arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Composed routes as of a given generation.
#[derive(Debug)]
pub(crate) struct RouteCache {
    pub(crate) generation: u64,
    pub(crate) routes: Vec<ProxiedRoute>,
}

pub(crate) struct ContainerNode {
    pub(crate) base_url: String,
    pub(crate) parent: Option<ContainerId>,
    pub(crate) children: Vec<ContainerId>,
    pub(crate) controllers: Vec<Arc<dyn Controller>>,
    pub(crate) request_proxies: Vec<SharedRequestProxy>,
    pub(crate) response_proxies: Vec<SharedResponseProxy>,
    /// `None` and `Some(empty)` both accept every adapter.
    pub(crate) targeted: Option<Vec<AdapterKind>>,
    pub(crate) generation: u64,
    pub(crate) cache: Mutex<Option<RouteCache>>,
}

impl ContainerNode {
    pub(crate) fn new(base_url: String) -> Self {
        Self {
            base_url,
            parent: None,
            children: Vec::new(),
            controllers: Vec::new(),
            request_proxies: Vec::new(),
            response_proxies: Vec::new(),
            targeted: None,
            generation: 0,
            cache: Mutex::new(None),
        }
    }

    pub(crate) fn cached(&self) -> Option<Vec<ProxiedRoute>> {
        self.cache
            .lock()
            .as_ref()
            .filter(|c| c.generation == self.generation)
            .map(|c| c.routes.clone())
    }

    pub(crate) fn store(&self, routes: Vec<ProxiedRoute>) {
        *self.cache.lock() = Some(RouteCache {
            generation: self.generation,
            routes,
        });
    }

    pub(crate) fn has_targets(&self) -> bool {
        self.targeted.as_ref().is_some_and(|t| !t.is_empty())
    }
}

impl fmt::Debug for ContainerNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let controllers: Vec<_> = self.controllers.iter().map(|c| c.name().to_string()).collect();
        f.debug_struct("ContainerNode")
            .field("base_url", &self.base_url)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("controllers", &controllers)
            .field("request_proxies", &self.request_proxies.len())
            .field("response_proxies", &self.response_proxies.len())
            .field("targeted", &self.targeted)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
