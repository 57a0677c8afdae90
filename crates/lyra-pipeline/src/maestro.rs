//! The request pipeline engine.
//!
//! [`Maestro`] owns the container tree, the ordered pipe list, the
//! resolver-dispatch [`RequestHandler`], the adapters and the policy vault.
//! It is configured first and then started exactly once; after `start` every
//! configuration call fails with [`MaestroError::EngineRunning`].

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use lyra_config::{LyraConfig, PROPERTY_VALIDATOR, REQUEST_CASTER, SCHEMA_ENFORCER};
use lyra_container::{ContainerId, ContainerTree};
use lyra_core::{
    Adapter, ApiRequest, BoxFuture, Controller, HandleFn, MaestroError, MaestroResult,
    ProxiedRoute, RouteTable, SendError, SendResponse,
};
use lyra_telemetry::metrics::{self, Outcome as Exit};
use tracing::{debug, error, info, warn};

use crate::handler::{DefaultRequestHandler, RequestHandler};
use crate::pipe::{NamedPipe, RequestPipe};
use crate::pipes::{RequestCaster, SchemaEnforcer, SchemaValidator};
use crate::policy::PolicyVault;

/// Engine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Accepting configuration.
    Configuring,
    /// Started; configuration is frozen.
    Running,
}

/// Something that can be mounted at the engine's root.
#[derive(Clone)]
pub enum UseInMaestro {
    /// A container from the engine's tree.
    Container(ContainerId),
    /// A controller.
    Controller(Arc<dyn Controller>),
}

impl From<ContainerId> for UseInMaestro {
    fn from(id: ContainerId) -> Self {
        Self::Container(id)
    }
}

impl From<Arc<dyn Controller>> for UseInMaestro {
    fn from(controller: Arc<dyn Controller>) -> Self {
        Self::Controller(controller)
    }
}

impl fmt::Debug for UseInMaestro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container(id) => f.debug_tuple("Container").field(id).finish(),
            Self::Controller(c) => f.debug_tuple("Controller").field(&c.name()).finish(),
        }
    }
}

/// The request pipeline engine.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use lyra_core::{ApiRequest, Controller, FnResolver, Outcome, ResolverRef, RouteDef};
/// use lyra_pipeline::Maestro;
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
///         let ping = FnResolver::new(|_r: ApiRequest| async move { Outcome::<Value>::Ok(json!("pong")) });
///         vec![RouteDef::new("/ping", ResolverRef::callable(ping))]
///     }
/// }
///
/// let mut maestro = Maestro::new();
/// let health: Arc<dyn Controller> = Arc::new(Health);
/// maestro.use_in_maestro(health).unwrap();
///
/// assert_eq!(maestro.routes().unwrap()[0].url, "/ping");
/// assert_eq!(
///     maestro.all_pipe_names(),
///     vec!["property-validator", "schema-enforcer", "request-caster"]
/// );
/// ```
pub struct Maestro {
    tree: ContainerTree,
    root: ContainerId,
    pipes: Vec<NamedPipe>,
    handler: Option<Arc<dyn RequestHandler>>,
    adapters: IndexMap<String, Box<dyn Adapter>>,
    vault: Arc<PolicyVault>,
    state: EngineState,
}

impl Maestro {
    /// Creates an engine with the default pipes and request handler.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&LyraConfig::default())
    }

    /// Creates an engine with no pipes and no request handler.
    ///
    /// A request handler must be set before [`start`](Self::start).
    #[must_use]
    pub fn bare() -> Self {
        let mut tree = ContainerTree::new();
        let root = tree.create("");
        Self {
            tree,
            root,
            pipes: Vec::new(),
            handler: None,
            adapters: IndexMap::new(),
            vault: Arc::new(PolicyVault::new()),
            state: EngineState::Configuring,
        }
    }

    /// Creates an engine from configuration.
    ///
    /// Pipe names that are not built in are logged and skipped.
    #[must_use]
    pub fn from_config(config: &LyraConfig) -> Self {
        let mut maestro = Self::bare();
        let pipeline = &config.pipeline;

        for name in &pipeline.default_pipes {
            let pipe: NamedPipe = match name.as_str() {
                PROPERTY_VALIDATOR => Arc::new(
                    SchemaValidator::new(maestro.vault.clone())
                        .with_default_policy(pipeline.default_schema_policy.clone()),
                ),
                SCHEMA_ENFORCER => Arc::new(
                    SchemaEnforcer::new(maestro.vault.clone())
                        .with_default_policy(pipeline.default_parameter_policy.clone()),
                ),
                REQUEST_CASTER => Arc::new(RequestCaster::new()),
                other => {
                    warn!(pipe = other, "unknown built-in pipe, skipping");
                    continue;
                }
            };
            maestro.pipes.push(pipe);
        }

        maestro.handler = Some(Arc::new(DefaultRequestHandler::with_max_unwrap_depth(
            pipeline.max_unwrap_depth,
        )));
        maestro
    }

    fn ensure_configuring(&self, operation: &'static str) -> MaestroResult<()> {
        match self.state {
            EngineState::Configuring => Ok(()),
            EngineState::Running => Err(MaestroError::EngineRunning(operation)),
        }
    }

    // ---- introspection -------------------------------------------------

    /// The root container. Its base URL is empty.
    pub const fn root(&self) -> ContainerId {
        self.root
    }

    /// The container tree.
    pub const fn tree(&self) -> &ContainerTree {
        &self.tree
    }

    /// The policy vault shared with the validation pipes.
    pub const fn vault(&self) -> &Arc<PolicyVault> {
        &self.vault
    }

    /// The current lifecycle state.
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Pipe names in execution order.
    pub fn all_pipe_names(&self) -> Vec<String> {
        self.pipes.iter().map(|p| p.name().to_string()).collect()
    }

    /// A copy of the pipe list.
    pub fn all_pipes(&self) -> Vec<NamedPipe> {
        self.pipes.clone()
    }

    /// Names of the registered adapters in registration order.
    pub fn adapter_names(&self) -> Vec<String> {
        self.adapters.keys().cloned().collect()
    }

    /// Returns true if a request handler is set.
    pub fn has_request_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Every composed route below the root.
    pub fn routes(&self) -> MaestroResult<Vec<ProxiedRoute>> {
        Ok(self.tree.all_routes(self.root)?)
    }

    // ---- configuration -------------------------------------------------

    /// Mutable access to the container tree.
    pub fn tree_mut(&mut self) -> MaestroResult<&mut ContainerTree> {
        self.ensure_configuring("tree mutation")?;
        Ok(&mut self.tree)
    }

    /// Appends pipes to the end of the list.
    pub fn pipe(&mut self, pipes: impl IntoIterator<Item = NamedPipe>) -> MaestroResult<&mut Self> {
        self.ensure_configuring("pipe")?;
        self.pipes.extend(pipes);
        Ok(self)
    }

    /// Appends a single pipe.
    pub fn pipe_one(&mut self, pipe: impl RequestPipe) -> MaestroResult<&mut Self> {
        self.pipe([Arc::new(pipe) as NamedPipe])
    }

    /// Removes every pipe called `name`. Returns true if any matched.
    pub fn remove_pipe(&mut self, name: &str) -> MaestroResult<bool> {
        self.ensure_configuring("remove_pipe")?;
        let before = self.pipes.len();
        self.pipes.retain(|p| p.name() != name);
        Ok(self.pipes.len() != before)
    }

    /// Replaces the resolver-dispatch step.
    pub fn set_request_handler(&mut self, handler: impl RequestHandler) -> MaestroResult<()> {
        self.ensure_configuring("set_request_handler")?;
        self.handler = Some(Arc::new(handler));
        Ok(())
    }

    /// Removes the resolver-dispatch step.
    pub fn clear_request_handler(&mut self) -> MaestroResult<()> {
        self.ensure_configuring("clear_request_handler")?;
        self.handler = None;
        Ok(())
    }

    /// Registers an adapter. An adapter with the same name is replaced.
    pub fn add_adapter(&mut self, adapter: impl Adapter) -> MaestroResult<()> {
        self.ensure_configuring("add_adapter")?;
        let name = adapter.name().to_string();
        if self.adapters.insert(name.clone(), Box::new(adapter)).is_some() {
            debug!(adapter = %name, "replaced adapter");
        }
        Ok(())
    }

    /// Mounts a container or a controller at the root.
    ///
    /// Returns false if it was already mounted.
    pub fn use_in_maestro(&mut self, item: impl Into<UseInMaestro>) -> MaestroResult<bool> {
        self.ensure_configuring("use_in_maestro")?;
        let changed = match item.into() {
            UseInMaestro::Container(id) => self.tree.add_child_container(self.root, id)?,
            UseInMaestro::Controller(controller) => self.tree.add_controller(self.root, controller)?,
        };
        Ok(changed)
    }

    /// Mounts several items in order.
    pub fn use_all<I, U>(&mut self, items: I) -> MaestroResult<()>
    where
        I: IntoIterator<Item = U>,
        U: Into<UseInMaestro>,
    {
        for item in items {
            self.use_in_maestro(item)?;
        }
        Ok(())
    }

    // ---- running -------------------------------------------------------

    fn dispatch(&self) -> Dispatch {
        Dispatch {
            pipes: self.pipes.clone().into(),
            handler: self.handler.clone(),
        }
    }

    /// Drives one request to completion.
    ///
    /// Exactly one of `send_response` or `send_error` is called unless a
    /// configuration fault is returned, in which case neither is.
    pub async fn handle(
        &self,
        route: ProxiedRoute,
        request: ApiRequest,
        send_response: SendResponse,
        send_error: SendError,
    ) -> MaestroResult<()> {
        self.dispatch()
            .run(route, request, send_response, send_error)
            .await
    }

    /// The callback handed to adapters.
    ///
    /// It captures the pipes and handler as they are now.
    pub fn handle_fn(&self) -> HandleFn {
        let dispatch = Arc::new(self.dispatch());
        Arc::new(
            move |route: ProxiedRoute,
                  request: ApiRequest,
                  send_response: SendResponse,
                  send_error: SendError|
                  -> BoxFuture<'static, MaestroResult<()>> {
                let dispatch = dispatch.clone();
                Box::pin(async move { dispatch.run(route, request, send_response, send_error).await })
            },
        )
    }

    /// Starts every adapter and freezes configuration.
    ///
    /// Fails before touching any adapter when no request handler is set or a
    /// route's resolver is not callable. Adapters start in registration order.
    /// On the first failure the adapters already started are stopped in
    /// reverse order, the error is returned and the engine stays configurable.
    pub fn start(&mut self) -> MaestroResult<()> {
        if self.state == EngineState::Running {
            return Err(MaestroError::AlreadyStarted);
        }
        if self.handler.is_none() {
            return Err(MaestroError::RequestFlowNotDefined(
                "no request handler is set".to_string(),
            ));
        }

        let routes = self.tree.all_routes(self.root)?;
        if let Some(route) = routes.iter().find(|r| r.resolver.callable().is_none()) {
            return Err(MaestroError::EndpointNotCallable {
                route: route.url.clone(),
                resolver: route.resolver_name(),
            });
        }

        let handle = self.handle_fn();
        for index in 0..self.adapters.len() {
            if let Err(e) = self.start_adapter(index, &handle) {
                self.stop_adapters(index);
                return Err(e);
            }
        }

        self.state = EngineState::Running;
        info!(
            adapters = self.adapters.len(),
            routes = routes.len(),
            pipes = self.pipes.len(),
            "engine started"
        );
        Ok(())
    }

    fn start_adapter(&mut self, index: usize, handle: &HandleFn) -> MaestroResult<()> {
        let Some((name, adapter)) = self.adapters.get_index_mut(index) else {
            return Ok(());
        };
        let table = RouteTable::new(self.tree.routes_for_adapter(self.root, &**adapter)?);
        let count = table.len();

        adapter.set_request_handler(handle.clone());
        adapter.add_api_container(table);
        adapter.start().map_err(|e| MaestroError::Adapter {
            adapter: name.clone(),
            message: e.to_string(),
        })?;

        info!(adapter = %name, routes = count, "adapter started");
        Ok(())
    }

    /// Stops the first `count` adapters, last started first.
    fn stop_adapters(&mut self, count: usize) {
        for index in (0..count).rev() {
            if let Some((name, adapter)) = self.adapters.get_index_mut(index) {
                warn!(adapter = %name, "stopping adapter after failed start");
                adapter.stop();
            }
        }
    }
}

impl Default for Maestro {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Maestro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Maestro")
            .field("state", &self.state)
            .field("root", &self.root)
            .field("pipes", &self.all_pipe_names())
            .field("adapters", &self.adapter_names())
            .field("has_request_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}

/// A frozen view of the pipes and handler, shared by in-flight requests.
struct Dispatch {
    pipes: Arc<[NamedPipe]>,
    handler: Option<Arc<dyn RequestHandler>>,
}

impl Dispatch {
    async fn run(
        &self,
        route: ProxiedRoute,
        mut request: ApiRequest,
        send_response: SendResponse,
        send_error: SendError,
    ) -> MaestroResult<()> {
        let started = Instant::now();
        let request_id = request.request_id();

        let Some(handler) = self.handler.as_ref() else {
            metrics::record_request(Exit::Fatal, "handler", started.elapsed());
            return Err(MaestroError::RequestFlowNotDefined(
                "no request handler is set".to_string(),
            ));
        };

        for pipe in self.pipes.iter() {
            if let Err(rejection) = pipe.pipe(&route, &mut request).await {
                warn!(
                    request_id = %request_id,
                    route = %route.url,
                    pipe = pipe.name(),
                    error = %rejection,
                    "pipe rejected request"
                );
                metrics::record_pipe_rejection(pipe.name());
                metrics::record_request(Exit::Error, "pipe", started.elapsed());
                send_error(rejection);
                return Ok(());
            }
        }

        match handler.handle(&route, request).await {
            Ok(Ok(response)) => {
                debug!(
                    request_id = %request_id,
                    route = %route.url,
                    status = response.status,
                    "sending response"
                );
                metrics::record_request(Exit::Response, "dispatch", started.elapsed());
                send_response(response);
                Ok(())
            }
            Ok(Err(failure)) => {
                debug!(
                    request_id = %request_id,
                    route = %route.url,
                    error = %failure,
                    "sending error"
                );
                metrics::record_request(Exit::Error, "handler", started.elapsed());
                send_error(failure);
                Ok(())
            }
            Err(fault) => {
                error!(
                    request_id = %request_id,
                    route = %route.url,
                    error = %fault,
                    "request handler fault"
                );
                metrics::record_request(Exit::Fatal, "handler", started.elapsed());
                Err(fault)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipe::FnPipe;
    use lyra_config::LogFormat;
    use lyra_core::{ApiResponse, FnResolver, Outcome, ResolverRef, RouteDef};
    use lyra_test::TestAdapter;
    use serde_json::{json, Value};

    struct Named(&'static str);

    impl RequestPipe for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn pipe<'a>(
            &'a self,
            _route: &'a ProxiedRoute,
            _request: &'a mut ApiRequest,
        ) -> BoxFuture<'a, lyra_core::Outcome<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    struct Users;

    impl Controller for Users {
        fn name(&self) -> &str {
            "users"
        }

        fn routes(&self) -> Vec<RouteDef> {
            let list = FnResolver::new(|_r: ApiRequest| async move { Outcome::<Value>::Ok(json!([])) });
            vec![RouteDef::new("/users", ResolverRef::callable(list))]
        }
    }

    struct Broken;

    impl Controller for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn routes(&self) -> Vec<RouteDef> {
            vec![RouteDef::new("/broken", "not_a_method")]
        }
    }

    #[test]
    fn test_default_pipes() {
        let maestro = Maestro::new();
        assert_eq!(
            maestro.all_pipe_names(),
            vec!["property-validator", "schema-enforcer", "request-caster"]
        );
        assert!(maestro.has_request_handler());
        assert_eq!(maestro.state(), EngineState::Configuring);
        assert_eq!(maestro.tree().base_url(maestro.root()).unwrap(), "");
    }

    #[test]
    fn test_bare_has_nothing() {
        let maestro = Maestro::bare();
        assert!(maestro.all_pipe_names().is_empty());
        assert!(!maestro.has_request_handler());
    }

    #[test]
    fn test_from_config_skips_unknown_pipes() {
        let mut config = LyraConfig::default();
        config.pipeline.default_pipes = vec!["request-caster".into(), "gzip".into()];
        config.logging.format = LogFormat::Pretty;

        let maestro = Maestro::from_config(&config);
        assert_eq!(maestro.all_pipe_names(), vec!["request-caster"]);
    }

    #[test]
    fn test_pipe_append_and_remove() {
        let mut maestro = Maestro::bare();
        maestro
            .pipe([Arc::new(Named("a")) as NamedPipe, Arc::new(Named("b")) as NamedPipe])
            .unwrap()
            .pipe_one(Named("a"))
            .unwrap();
        assert_eq!(maestro.all_pipe_names(), vec!["a", "b", "a"]);

        assert!(maestro.remove_pipe("a").unwrap());
        assert_eq!(maestro.all_pipe_names(), vec!["b"]);
        assert!(!maestro.remove_pipe("a").unwrap());
    }

    #[test]
    fn test_all_pipes_is_a_copy() {
        let mut maestro = Maestro::new();
        let mut pipes = maestro.all_pipes();
        pipes.clear();
        assert_eq!(maestro.all_pipes().len(), 3);

        maestro
            .pipe_one(FnPipe::new("late", |_route, _request| Box::pin(async { Ok(()) })))
            .unwrap();
        assert_eq!(maestro.all_pipes().len(), 4);
    }

    #[test]
    fn test_use_in_maestro() {
        let mut maestro = Maestro::new();
        let users: Arc<dyn Controller> = Arc::new(Users);
        assert!(maestro.use_in_maestro(users.clone()).unwrap());
        assert!(!maestro.use_in_maestro(users).unwrap());

        let api = maestro.tree_mut().unwrap().create("/api");
        let v1 = maestro.tree_mut().unwrap().create("v1");
        maestro.tree_mut().unwrap().add_child_container(api, v1).unwrap();
        let nested: Arc<dyn Controller> = Arc::new(Users);
        maestro.tree_mut().unwrap().add_controller(v1, nested).unwrap();
        maestro.use_all([api]).unwrap();

        let urls: Vec<_> = maestro.routes().unwrap().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, vec!["/users", "/api/v1/users"]);
    }

    #[test]
    fn test_start_without_handler() {
        let mut maestro = Maestro::bare();
        let adapter = TestAdapter::new("memory");
        maestro.add_adapter(adapter.clone()).unwrap();

        assert!(matches!(maestro.start(), Err(MaestroError::RequestFlowNotDefined(_))));
        assert_eq!(adapter.start_calls(), 0);
        assert_eq!(maestro.state(), EngineState::Configuring);
    }

    #[test]
    fn test_start_fails_fast_on_unbound_resolver() {
        let mut maestro = Maestro::new();
        let broken: Arc<dyn Controller> = Arc::new(Broken);
        maestro.use_in_maestro(broken).unwrap();
        let adapter = TestAdapter::new("memory");
        maestro.add_adapter(adapter.clone()).unwrap();

        match maestro.start() {
            Err(MaestroError::EndpointNotCallable { route, resolver }) => {
                assert_eq!(route, "/broken");
                assert_eq!(resolver, "not_a_method");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!adapter.has_handler());
    }

    #[test]
    fn test_start_twice() {
        let mut maestro = Maestro::new();
        maestro.start().unwrap();
        assert!(matches!(maestro.start(), Err(MaestroError::AlreadyStarted)));
    }

    #[test]
    fn test_configuration_frozen_after_start() {
        let mut maestro = Maestro::new();
        maestro.start().unwrap();

        assert!(matches!(maestro.remove_pipe("request-caster"), Err(MaestroError::EngineRunning(_))));
        assert!(matches!(maestro.tree_mut(), Err(MaestroError::EngineRunning(_))));
        assert!(matches!(
            maestro.add_adapter(TestAdapter::new("late")),
            Err(MaestroError::EngineRunning(_))
        ));
        assert!(maestro.set_request_handler(DefaultRequestHandler::new()).is_err());
        assert_eq!(maestro.all_pipe_names().len(), 3);
    }

    #[test]
    fn test_adapter_failure_surfaces() {
        let mut maestro = Maestro::new();
        maestro
            .add_adapter(TestAdapter::new("flaky").failing_start("socket closed"))
            .unwrap();

        match maestro.start() {
            Err(MaestroError::Adapter { adapter, message }) => {
                assert_eq!(adapter, "flaky");
                assert_eq!(message, "socket closed");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(maestro.state(), EngineState::Configuring);
    }

    #[test]
    fn test_failed_start_stops_started_adapters() {
        let mut maestro = Maestro::new();
        let good = TestAdapter::new("a-good");
        maestro.add_adapter(good.clone()).unwrap();
        maestro
            .add_adapter(TestAdapter::new("b-flaky").failing_start("boom"))
            .unwrap();

        let err = tokio_test::assert_err!(maestro.start());
        assert!(matches!(err, MaestroError::Adapter { ref adapter, .. } if adapter == "b-flaky"));
        assert!(!good.is_started());
        assert_eq!(good.start_calls(), 1);
        assert_eq!(good.stop_calls(), 1);
        assert_eq!(maestro.state(), EngineState::Configuring);

        // Still configurable, and a retry starts from a clean slate.
        assert!(maestro.remove_pipe("request-caster").unwrap());
        let fixed = TestAdapter::new("b-flaky");
        maestro.add_adapter(fixed.clone()).unwrap();
        tokio_test::assert_ok!(maestro.start());

        assert_eq!(maestro.state(), EngineState::Running);
        assert!(good.is_started() && fixed.is_started());
        assert_eq!(good.start_calls(), 2);
        assert_eq!(good.stop_calls(), 1);
        assert!(matches!(maestro.remove_pipe("schema-enforcer"), Err(MaestroError::EngineRunning(_))));
    }

    #[test]
    fn test_add_adapter_replaces_by_name() {
        let mut maestro = Maestro::new();
        let first = TestAdapter::new("memory");
        let second = TestAdapter::new("memory");
        maestro.add_adapter(first.clone()).unwrap();
        maestro.add_adapter(second.clone()).unwrap();
        maestro.start().unwrap();

        assert_eq!(maestro.adapter_names(), vec!["memory"]);
        assert!(!first.is_started());
        assert!(second.is_started());
    }

    #[tokio::test]
    async fn test_handle_without_handler_is_fatal_and_silent() {
        let maestro = Maestro::bare();
        let route = ProxiedRoute::bind(
            RouteDef::new(
                "/",
                ResolverRef::callable(FnResolver::new(|_r: ApiRequest| async move {
                    Outcome::<Value>::Ok(Value::Null)
                })),
            ),
            None,
        );

        let result = maestro
            .handle(
                route,
                ApiRequest::new(),
                Box::new(|_r: ApiResponse| panic!("send_response called")),
                Box::new(|_e: lyra_core::ApiError| panic!("send_error called")),
            )
            .await;
        assert!(matches!(result, Err(MaestroError::RequestFlowNotDefined(_))));
    }
}
