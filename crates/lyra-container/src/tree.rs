//! The container tree.
//!
//! Containers live in an arena owned by [`ContainerTree`] and refer to each
//! other by [`ContainerId`]. Every node carries a generation counter; any
//! mutation bumps the generation of the node and of every ancestor, and a
//! node's cached route list is only reused while its stored generation still
//! matches. Stale caches are recomputed lazily on the next read.

use std::sync::Arc;

use lyra_core::{
    contains_proxy, join_url, Adapter, AdapterKind, ContainerError, Controller, ProxiedRoute,
    SharedRequestProxy, SharedResponseProxy,
};
use lyra_telemetry::metrics;
use tracing::{debug, error};

use crate::node::{ContainerId, ContainerNode};

type Result<T> = std::result::Result<T, ContainerError>;

/// Arena of containers.
///
/// # Example
///
/// ```
/// use lyra_container::ContainerTree;
///
/// let mut tree = ContainerTree::new();
/// let api = tree.create("/api");
/// let v1 = tree.create("v1");
/// tree.add_child_container(api, v1).unwrap();
///
/// assert_eq!(tree.parent(v1).unwrap(), Some(api));
/// assert!(tree.all_routes(api).unwrap().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct ContainerTree {
    nodes: Vec<ContainerNode>,
}

impl ContainerTree {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached container with the given base URL.
    pub fn create(&mut self, base_url: impl Into<String>) -> ContainerId {
        let id = ContainerId(self.nodes.len());
        self.nodes.push(ContainerNode::new(base_url.into()));
        id
    }

    /// Returns the number of containers in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena holds no containers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if `id` names a container of this arena.
    #[must_use]
    pub fn contains(&self, id: ContainerId) -> bool {
        id.0 < self.nodes.len()
    }

    fn node(&self, id: ContainerId) -> Result<&ContainerNode> {
        self.nodes
            .get(id.0)
            .ok_or(ContainerError::UnknownContainer(id.0))
    }

    fn node_mut(&mut self, id: ContainerId) -> Result<&mut ContainerNode> {
        self.nodes
            .get_mut(id.0)
            .ok_or(ContainerError::UnknownContainer(id.0))
    }

    /// Bumps the generation of `id` and every ancestor.
    fn touch(&mut self, id: ContainerId) {
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(cid) = current {
            let Some(node) = self.nodes.get_mut(cid.0) else {
                break;
            };
            node.generation += 1;
            current = node.parent;
            steps += 1;
            if steps > self.nodes.len() {
                error!(container = %id, "parent chain does not terminate");
                break;
            }
        }
    }

    // ---- introspection -------------------------------------------------

    /// Returns the container's base URL.
    pub fn base_url(&self, id: ContainerId) -> Result<&str> {
        Ok(&self.node(id)?.base_url)
    }

    /// Returns the parent, if the container is attached.
    pub fn parent(&self, id: ContainerId) -> Result<Option<ContainerId>> {
        Ok(self.node(id)?.parent)
    }

    /// Returns the child containers in attachment order.
    pub fn children(&self, id: ContainerId) -> Result<&[ContainerId]> {
        Ok(&self.node(id)?.children)
    }

    /// Returns the controllers in registration order.
    pub fn controllers(&self, id: ContainerId) -> Result<&[Arc<dyn Controller>]> {
        Ok(&self.node(id)?.controllers)
    }

    /// Returns the container's own request proxies.
    pub fn request_proxies(&self, id: ContainerId) -> Result<&[SharedRequestProxy]> {
        Ok(&self.node(id)?.request_proxies)
    }

    /// Returns the container's own response proxies.
    pub fn response_proxies(&self, id: ContainerId) -> Result<&[SharedResponseProxy]> {
        Ok(&self.node(id)?.response_proxies)
    }

    /// Returns the container's generation counter.
    pub fn generation(&self, id: ContainerId) -> Result<u64> {
        Ok(self.node(id)?.generation)
    }

    /// Returns true if the next [`all_routes`](Self::all_routes) call on this
    /// container is served from cache.
    pub fn is_cached(&self, id: ContainerId) -> Result<bool> {
        let node = self.node(id)?;
        let fresh = node
            .cache
            .lock()
            .as_ref()
            .is_some_and(|c| c.generation == node.generation);
        Ok(fresh)
    }

    /// Returns true if `ancestor` is `id` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: ContainerId, id: ContainerId) -> Result<bool> {
        self.node(ancestor)?;
        let mut current = Some(id);
        let mut steps = 0;
        while let Some(cid) = current {
            if cid == ancestor {
                return Ok(true);
            }
            current = self.node(cid)?.parent;
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
        }
        Ok(false)
    }

    // ---- mutation ------------------------------------------------------

    /// Changes the base URL.
    pub fn set_base_url(&mut self, id: ContainerId, base_url: impl Into<String>) -> Result<()> {
        let base_url = base_url.into();
        let node = self.node_mut(id)?;
        if node.base_url != base_url {
            node.base_url = base_url;
            self.touch(id);
        }
        Ok(())
    }

    /// Adds a controller. Returns false if this instance is already a member.
    pub fn add_controller(&mut self, id: ContainerId, controller: Arc<dyn Controller>) -> Result<bool> {
        let node = self.node_mut(id)?;
        if node.controllers.iter().any(|c| Arc::ptr_eq(c, &controller)) {
            return Ok(false);
        }
        node.controllers.push(controller);
        self.touch(id);
        Ok(true)
    }

    /// Removes a controller. Returns false if it was not a member.
    pub fn remove_controller(&mut self, id: ContainerId, controller: &Arc<dyn Controller>) -> Result<bool> {
        let node = self.node_mut(id)?;
        let Some(pos) = node.controllers.iter().position(|c| Arc::ptr_eq(c, controller)) else {
            return Ok(false);
        };
        node.controllers.remove(pos);
        self.touch(id);
        Ok(true)
    }

    /// Attaches `child` below `parent`.
    ///
    /// Returns false if `child` is already a child of `parent`.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::Cycle`] if `child` is `parent` or one of its ancestors
    /// - [`ContainerError::AlreadyAttached`] if `child` has another parent
    /// - [`ContainerError::UnknownContainer`] for ids outside the arena
    pub fn add_child_container(&mut self, parent: ContainerId, child: ContainerId) -> Result<bool> {
        self.node(parent)?;
        let current = self.node(child)?.parent;

        if current == Some(parent) {
            return Ok(false);
        }
        if self.is_ancestor(child, parent)? {
            return Err(ContainerError::Cycle {
                parent: parent.0,
                child: child.0,
            });
        }
        if let Some(other) = current {
            return Err(ContainerError::AlreadyAttached {
                parent: other.0,
                child: child.0,
            });
        }

        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.touch(parent);
        Ok(true)
    }

    /// Detaches `child` from `parent`. Returns false if it was not a child.
    ///
    /// The detached container stays in the arena and can be attached again.
    pub fn remove_child_container(&mut self, parent: ContainerId, child: ContainerId) -> Result<bool> {
        self.node(child)?;
        let node = self.node_mut(parent)?;
        let Some(pos) = node.children.iter().position(|c| *c == child) else {
            return Ok(false);
        };
        node.children.remove(pos);
        self.node_mut(child)?.parent = None;
        self.touch(parent);
        Ok(true)
    }

    /// Appends a request proxy. Returns false if already present.
    pub fn add_request_proxy(&mut self, id: ContainerId, proxy: SharedRequestProxy) -> Result<bool> {
        let node = self.node_mut(id)?;
        if contains_proxy(&node.request_proxies, &proxy) {
            return Ok(false);
        }
        node.request_proxies.push(proxy);
        self.touch(id);
        Ok(true)
    }

    /// Removes a request proxy. Returns false if it was not present.
    pub fn remove_request_proxy(&mut self, id: ContainerId, proxy: &SharedRequestProxy) -> Result<bool> {
        let node = self.node_mut(id)?;
        let Some(pos) = node.request_proxies.iter().position(|p| Arc::ptr_eq(p, proxy)) else {
            return Ok(false);
        };
        node.request_proxies.remove(pos);
        self.touch(id);
        Ok(true)
    }

    /// Appends a response proxy. Returns false if already present.
    pub fn add_response_proxy(&mut self, id: ContainerId, proxy: SharedResponseProxy) -> Result<bool> {
        let node = self.node_mut(id)?;
        if contains_proxy(&node.response_proxies, &proxy) {
            return Ok(false);
        }
        node.response_proxies.push(proxy);
        self.touch(id);
        Ok(true)
    }

    /// Removes a response proxy. Returns false if it was not present.
    pub fn remove_response_proxy(&mut self, id: ContainerId, proxy: &SharedResponseProxy) -> Result<bool> {
        let node = self.node_mut(id)?;
        let Some(pos) = node.response_proxies.iter().position(|p| Arc::ptr_eq(p, proxy)) else {
            return Ok(false);
        };
        node.response_proxies.remove(pos);
        self.touch(id);
        Ok(true)
    }

    // ---- adapter targeting ---------------------------------------------

    /// Restricts the adapters allowed to serve this container's routes.
    ///
    /// An empty list leaves the container open to every adapter.
    pub fn set_targeted_adapters(
        &mut self,
        id: ContainerId,
        kinds: impl IntoIterator<Item = AdapterKind>,
    ) -> Result<()> {
        self.node_mut(id)?.targeted = Some(kinds.into_iter().collect());
        self.touch(id);
        Ok(())
    }

    /// Clears any adapter restriction.
    pub fn remove_targeted_adapters(&mut self, id: ContainerId) -> Result<()> {
        if self.node_mut(id)?.targeted.take().is_some() {
            self.touch(id);
        }
        Ok(())
    }

    /// Returns true if a non-empty restriction is set.
    pub fn has_targeted_adapters(&self, id: ContainerId) -> Result<bool> {
        Ok(self.node(id)?.has_targets())
    }

    /// Returns true if `adapter` may serve this container's routes.
    pub fn accepts_adapter(&self, id: ContainerId, adapter: &dyn Adapter) -> Result<bool> {
        let node = self.node(id)?;
        Ok(match &node.targeted {
            Some(kinds) if !kinds.is_empty() => kinds.iter().any(|k| adapter.is_kind(k)),
            _ => true,
        })
    }

    // ---- composition ---------------------------------------------------

    /// Prefixes a route with this container's base URL and proxies.
    ///
    /// The input is left untouched.
    pub fn transform_route(&self, id: ContainerId, route: &ProxiedRoute) -> Result<ProxiedRoute> {
        Ok(compose(self.node(id)?, route))
    }

    /// Returns the composed routes of this container and everything below it.
    ///
    /// Controller routes come first, then every child's routes in attachment
    /// order. The result is cached until the next mutation of this container
    /// or any descendant; callers receive a copy.
    pub fn all_routes(&self, id: ContainerId) -> Result<Vec<ProxiedRoute>> {
        self.collect(id, 0)
    }

    fn collect(&self, id: ContainerId, depth: usize) -> Result<Vec<ProxiedRoute>> {
        let node = self.node(id)?;
        if let Some(routes) = node.cached() {
            return Ok(routes);
        }
        if depth > self.nodes.len() {
            error!(container = %id, "container nesting exceeds arena size");
            return Ok(Vec::new());
        }

        let mut routes = Vec::new();
        for controller in &node.controllers {
            routes.extend(
                controller
                    .routes()
                    .into_iter()
                    .map(|def| ProxiedRoute::bind(def, Some(controller.as_ref()))),
            );
        }
        for child in &node.children {
            routes.extend(self.collect(*child, depth + 1)?);
        }

        let routes: Vec<_> = routes.iter().map(|r| compose(node, r)).collect();
        debug!(
            container = %id,
            generation = node.generation,
            routes = routes.len(),
            "recomputed route table"
        );
        metrics::record_route_recomputation();
        node.store(routes.clone());
        Ok(routes)
    }

    /// Drops the cache of this container and every descendant.
    pub fn delete_cached_routes(&self, id: ContainerId) -> Result<()> {
        let mut stack = vec![id];
        let mut visited = 0;
        while let Some(cid) = stack.pop() {
            let node = self.node(cid)?;
            *node.cache.lock() = None;
            stack.extend(node.children.iter().copied());
            visited += 1;
            if visited > self.nodes.len() {
                error!(container = %id, "container nesting exceeds arena size");
                break;
            }
        }
        Ok(())
    }

    /// Returns the routes served by `adapter`.
    ///
    /// Subtrees whose container rejects the adapter contribute nothing.
    pub fn routes_for_adapter(&self, id: ContainerId, adapter: &dyn Adapter) -> Result<Vec<ProxiedRoute>> {
        self.collect_for(id, adapter, 0)
    }

    fn collect_for(&self, id: ContainerId, adapter: &dyn Adapter, depth: usize) -> Result<Vec<ProxiedRoute>> {
        if !self.accepts_adapter(id, adapter)? {
            return Ok(Vec::new());
        }
        if !self.subtree_has_targets(id)? {
            return self.all_routes(id);
        }
        if depth > self.nodes.len() {
            return Ok(Vec::new());
        }

        let node = self.node(id)?;
        let mut routes = Vec::new();
        for controller in &node.controllers {
            routes.extend(
                controller
                    .routes()
                    .into_iter()
                    .map(|def| ProxiedRoute::bind(def, Some(controller.as_ref()))),
            );
        }
        for child in &node.children {
            routes.extend(self.collect_for(*child, adapter, depth + 1)?);
        }
        Ok(routes.iter().map(|r| compose(node, r)).collect())
    }

    fn subtree_has_targets(&self, id: ContainerId) -> Result<bool> {
        let mut stack = vec![id];
        let mut visited = 0;
        while let Some(cid) = stack.pop() {
            let node = self.node(cid)?;
            if node.has_targets() {
                return Ok(true);
            }
            stack.extend(node.children.iter().copied());
            visited += 1;
            if visited > self.nodes.len() {
                break;
            }
        }
        Ok(false)
    }
}

fn compose(node: &ContainerNode, route: &ProxiedRoute) -> ProxiedRoute {
    let mut request_proxies = node.request_proxies.clone();
    request_proxies.extend(route.request_proxies.iter().cloned());
    let mut response_proxies = node.response_proxies.clone();
    response_proxies.extend(route.response_proxies.iter().cloned());

    ProxiedRoute {
        url: join_url(&node.base_url, &route.url),
        request_proxies,
        response_proxies,
        ..route.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_core::{
        AdapterError, ApiRequest, ApiResponse, FnRequestProxy, FnResolver, FnResponseProxy,
        HandleFn, Outcome, RouteDef, RouteTable, SharedResolver,
    };
    use serde_json::{json, Value};

    struct Static {
        name: &'static str,
        urls: Vec<&'static str>,
    }

    impl Controller for Static {
        fn name(&self) -> &str {
            self.name
        }

        fn routes(&self) -> Vec<RouteDef> {
            let resolver: SharedResolver = Arc::new(FnResolver::new(|_r: ApiRequest| async move {
                Outcome::<Value>::Ok(json!(null))
            }));
            self.urls
                .iter()
                .map(|u| RouteDef::new(*u, resolver.clone()))
                .collect()
        }
    }

    fn controller(name: &'static str, urls: &[&'static str]) -> Arc<dyn Controller> {
        Arc::new(Static {
            name,
            urls: urls.to_vec(),
        })
    }

    fn proxy(name: &str) -> SharedRequestProxy {
        Arc::new(FnRequestProxy::new(name, |r: ApiRequest| async move { Outcome::Ok(r) }))
    }

    fn response_proxy(name: &str) -> SharedResponseProxy {
        Arc::new(FnResponseProxy::new(name, |r: ApiResponse| async move { Outcome::Ok(r) }))
    }

    struct Http;
    struct Grpc;

    struct Fixed(AdapterKind);

    impl Adapter for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn kind(&self) -> AdapterKind {
            self.0
        }
        fn set_request_handler(&mut self, _handle: HandleFn) {}
        fn add_api_container(&mut self, _routes: RouteTable) {}
        fn start(&mut self) -> std::result::Result<(), AdapterError> {
            Ok(())
        }
        fn stop(&mut self) {}
    }

    fn urls(routes: &[ProxiedRoute]) -> Vec<&str> {
        routes.iter().map(|r| r.url.as_str()).collect()
    }

    #[test]
    fn test_base_url_prefix() {
        let mut tree = ContainerTree::new();
        let root = tree.create("/a");
        tree.add_controller(root, controller("c", &["/b"])).unwrap();

        assert_eq!(tree.all_routes(root).unwrap()[0].url, "/a/b");
    }

    #[test]
    fn test_controllers_before_children() {
        let mut tree = ContainerTree::new();
        let root = tree.create("/api");
        let child = tree.create("v1");
        tree.add_child_container(root, child).unwrap();
        tree.add_controller(child, controller("inner", &["/users"])).unwrap();
        tree.add_controller(root, controller("outer", &["/health"])).unwrap();

        let routes = tree.all_routes(root).unwrap();
        assert_eq!(urls(&routes), vec!["/api/health", "/api/v1/users"]);
    }

    #[test]
    fn test_cache_returns_equal_copies() {
        let mut tree = ContainerTree::new();
        let root = tree.create("/");
        tree.add_controller(root, controller("c", &["/x", "/y"])).unwrap();

        let first = tree.all_routes(root).unwrap();
        assert!(tree.is_cached(root).unwrap());
        let second = tree.all_routes(root).unwrap();

        assert_eq!(first, second);
        assert_ne!(first.as_ptr(), second.as_ptr());
    }

    #[test]
    fn test_duplicate_controller_is_ignored() {
        let mut tree = ContainerTree::new();
        let root = tree.create("");
        let c = controller("c", &["/x"]);

        assert!(tree.add_controller(root, c.clone()).unwrap());
        assert!(!tree.add_controller(root, c.clone()).unwrap());
        assert_eq!(tree.controllers(root).unwrap().len(), 1);
    }

    #[test]
    fn test_remove_non_member_keeps_generation() {
        let mut tree = ContainerTree::new();
        let root = tree.create("");
        let child = tree.create("/c");
        let stranger = tree.create("/s");
        tree.add_child_container(root, child).unwrap();
        tree.add_request_proxy(child, proxy("kept")).unwrap();
        tree.add_response_proxy(child, response_proxy("kept")).unwrap();

        assert!(tree.all_routes(root).unwrap().is_empty());
        let root_before = tree.generation(root).unwrap();
        let child_before = tree.generation(child).unwrap();

        assert!(!tree.remove_controller(child, &controller("c", &[])).unwrap());
        assert!(!tree.remove_request_proxy(child, &proxy("p")).unwrap());
        assert!(!tree.remove_response_proxy(child, &response_proxy("p")).unwrap());
        assert!(!tree.remove_child_container(child, stranger).unwrap());
        assert!(!tree.remove_child_container(root, stranger).unwrap());

        assert_eq!(tree.generation(child).unwrap(), child_before);
        assert_eq!(tree.generation(root).unwrap(), root_before);
        assert!(tree.is_cached(root).unwrap());
        assert_eq!(tree.request_proxies(child).unwrap().len(), 1);
        assert_eq!(tree.response_proxies(child).unwrap().len(), 1);
        assert_eq!(tree.children(root).unwrap(), &[child]);
        assert_eq!(tree.parent(stranger).unwrap(), None);
    }

    #[test]
    fn test_mutation_below_invalidates_ancestors() {
        let mut tree = ContainerTree::new();
        let root = tree.create("/r");
        let mid = tree.create("m");
        let leaf = tree.create("l");
        tree.add_child_container(root, mid).unwrap();
        tree.add_child_container(mid, leaf).unwrap();

        assert!(tree.all_routes(root).unwrap().is_empty());
        assert!(tree.is_cached(root).unwrap());

        tree.add_controller(leaf, controller("c", &["/x"])).unwrap();
        assert!(!tree.is_cached(root).unwrap());
        assert_eq!(urls(&tree.all_routes(root).unwrap()), vec!["/r/m/l/x"]);
    }

    #[test]
    fn test_delete_cached_routes_clears_descendants() {
        let mut tree = ContainerTree::new();
        let root = tree.create("");
        let a = tree.create("a");
        let b = tree.create("b");
        tree.add_child_container(root, a).unwrap();
        tree.add_child_container(root, b).unwrap();

        tree.all_routes(root).unwrap();
        assert!(tree.is_cached(a).unwrap() && tree.is_cached(b).unwrap());

        tree.delete_cached_routes(root).unwrap();
        for id in [root, a, b] {
            assert!(!tree.is_cached(id).unwrap());
        }
    }

    #[test]
    fn test_proxy_order_root_first() {
        let mut tree = ContainerTree::new();
        let root = tree.create("");
        let child = tree.create("c");
        tree.add_child_container(root, child).unwrap();
        tree.add_request_proxy(root, proxy("p1")).unwrap();
        tree.add_request_proxy(child, proxy("p2")).unwrap();
        tree.add_controller(child, controller("c", &["/x"])).unwrap();

        let route = &tree.all_routes(root).unwrap()[0];
        let names: Vec<_> = route.request_proxies.iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["p1", "p2"]);
    }

    #[test]
    fn test_transform_route_is_pure() {
        let mut tree = ContainerTree::new();
        let root = tree.create("/base");
        tree.add_request_proxy(root, proxy("p")).unwrap();

        let route = ProxiedRoute::bind(RouteDef::new("/x", "m"), None);
        let out = tree.transform_route(root, &route).unwrap();

        assert_eq!(out.url, "/base/x");
        assert_eq!(out.request_proxies.len(), 1);
        assert_eq!(route.url, "/x");
        assert!(route.request_proxies.is_empty());
    }

    #[test]
    fn test_structural_errors() {
        let mut tree = ContainerTree::new();
        let a = tree.create("a");
        let b = tree.create("b");
        let c = tree.create("c");
        tree.add_child_container(a, b).unwrap();

        assert_eq!(
            tree.add_child_container(a, a),
            Err(ContainerError::Cycle { parent: 0, child: 0 })
        );
        assert_eq!(
            tree.add_child_container(b, a),
            Err(ContainerError::Cycle { parent: 1, child: 0 })
        );
        assert_eq!(
            tree.add_child_container(c, b),
            Err(ContainerError::AlreadyAttached { parent: 0, child: 1 })
        );
        assert!(!tree.add_child_container(a, b).unwrap());
        assert_eq!(
            tree.base_url(ContainerId(9)),
            Err(ContainerError::UnknownContainer(9))
        );
    }

    #[test]
    fn test_detached_container_can_be_reattached() {
        let mut tree = ContainerTree::new();
        let a = tree.create("a");
        let b = tree.create("b");
        let c = tree.create("c");
        tree.add_controller(c, controller("c", &["x"])).unwrap();
        tree.add_child_container(a, c).unwrap();

        assert!(tree.remove_child_container(a, c).unwrap());
        assert!(tree.all_routes(a).unwrap().is_empty());

        tree.add_child_container(b, c).unwrap();
        assert_eq!(urls(&tree.all_routes(b).unwrap()), vec!["b/c/x"]);
    }

    #[test]
    fn test_adapter_targeting() {
        let mut tree = ContainerTree::new();
        let root = tree.create("");
        let http = Fixed(AdapterKind::of::<Http>());
        let grpc = Fixed(AdapterKind::of::<Grpc>());

        assert!(tree.accepts_adapter(root, &http).unwrap());
        assert!(tree.accepts_adapter(root, &grpc).unwrap());

        tree.set_targeted_adapters(root, [AdapterKind::of::<Http>()]).unwrap();
        assert!(tree.has_targeted_adapters(root).unwrap());
        assert!(tree.accepts_adapter(root, &http).unwrap());
        assert!(!tree.accepts_adapter(root, &grpc).unwrap());

        tree.set_targeted_adapters(root, []).unwrap();
        assert!(!tree.has_targeted_adapters(root).unwrap());
        assert!(tree.accepts_adapter(root, &grpc).unwrap());

        tree.remove_targeted_adapters(root).unwrap();
        assert!(tree.accepts_adapter(root, &grpc).unwrap());
    }

    #[test]
    fn test_routes_for_adapter_skips_rejecting_subtrees() {
        let mut tree = ContainerTree::new();
        let root = tree.create("");
        let web = tree.create("web");
        let rpc = tree.create("rpc");
        tree.add_child_container(root, web).unwrap();
        tree.add_child_container(root, rpc).unwrap();
        tree.add_controller(web, controller("w", &["/page"])).unwrap();
        tree.add_controller(rpc, controller("r", &["/call"])).unwrap();
        tree.set_targeted_adapters(rpc, [AdapterKind::of::<Grpc>()]).unwrap();

        let http = Fixed(AdapterKind::of::<Http>());
        let grpc = Fixed(AdapterKind::of::<Grpc>());

        assert_eq!(urls(&tree.routes_for_adapter(root, &http).unwrap()), vec!["web/page"]);
        assert_eq!(
            urls(&tree.routes_for_adapter(root, &grpc).unwrap()),
            vec!["web/page", "rpc/call"]
        );
        assert_eq!(tree.all_routes(root).unwrap().len(), 2);
    }
}
