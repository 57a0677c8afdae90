//! In-memory adapter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lyra_core::{
    Adapter, AdapterError, AdapterKind, ApiError, ApiRequest, ApiResponse, HandleFn, RouteTable,
    SendError, SendResponse,
};
use parking_lot::Mutex;

use crate::error::TestError;
use crate::response::{Dispatched, TestResponse};

#[derive(Default)]
struct State {
    handle: Option<HandleFn>,
    routes: RouteTable,
    started: bool,
    start_calls: usize,
    stop_calls: usize,
}

/// An adapter that serves requests from memory.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// another.
///
/// # Example
///
/// ```
/// use lyra_core::{Adapter, AdapterKind};
/// use lyra_test::TestAdapter;
///
/// struct Grpc;
///
/// let adapter = TestAdapter::new("memory").with_kind(AdapterKind::of::<Grpc>());
/// assert!(adapter.is_kind(&AdapterKind::of::<Grpc>()));
/// assert!(!adapter.is_started());
/// ```
#[derive(Clone)]
pub struct TestAdapter {
    name: String,
    kind: AdapterKind,
    also: Vec<AdapterKind>,
    fail_start: Option<String>,
    state: Arc<Mutex<State>>,
}

impl TestAdapter {
    /// Creates an adapter of kind `TestAdapter`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AdapterKind::of::<Self>(),
            also: Vec::new(),
            fail_start: None,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Reports a different concrete kind, for targeting tests.
    #[must_use]
    pub fn with_kind(mut self, kind: AdapterKind) -> Self {
        self.kind = kind;
        self
    }

    /// Declares an additional kind this adapter satisfies.
    #[must_use]
    pub fn also_kind(mut self, kind: AdapterKind) -> Self {
        self.also.push(kind);
        self
    }

    /// Makes `start` fail with the given message.
    #[must_use]
    pub fn failing_start(mut self, message: impl Into<String>) -> Self {
        self.fail_start = Some(message.into());
        self
    }

    /// Returns true once `start` succeeded.
    pub fn is_started(&self) -> bool {
        self.state.lock().started
    }

    /// How many times `start` was called.
    pub fn start_calls(&self) -> usize {
        self.state.lock().start_calls
    }

    /// How many times `stop` was called.
    pub fn stop_calls(&self) -> usize {
        self.state.lock().stop_calls
    }

    /// Returns true if a request handler was wired in.
    pub fn has_handler(&self) -> bool {
        self.state.lock().handle.is_some()
    }

    /// Returns the route table handed over by the engine.
    pub fn routes(&self) -> RouteTable {
        self.state.lock().routes.clone()
    }

    /// URLs of every route in the table, in order.
    pub fn route_urls(&self) -> Vec<String> {
        self.state.lock().routes.iter().map(|r| r.url.clone()).collect()
    }

    /// Dispatches a request to the route at `url`.
    pub async fn dispatch(
        &self,
        url: &str,
        request: impl Into<ApiRequest>,
    ) -> Result<TestResponse, TestError> {
        let (handle, route) = {
            let state = self.state.lock();
            let handle = state.handle.clone().ok_or(TestError::NotStarted)?;
            let route = state.routes.find(url).cloned();
            (handle, route)
        };
        let route = route.ok_or_else(|| TestError::RouteNotFound {
            url: url.to_string(),
        })?;
        run(&handle, route, request.into()).await
    }

    /// Dispatches a request to the route matching `method` and `url`.
    pub async fn dispatch_method(
        &self,
        method: &str,
        url: &str,
        request: impl Into<ApiRequest>,
    ) -> Result<TestResponse, TestError> {
        let (handle, route) = {
            let state = self.state.lock();
            let handle = state.handle.clone().ok_or(TestError::NotStarted)?;
            let route = state.routes.find_with_method(method, url).cloned();
            (handle, route)
        };
        let route = route.ok_or_else(|| TestError::RouteNotFound {
            url: format!("{method} {url}"),
        })?;
        run(&handle, route, request.into()).await
    }
}

async fn run(
    handle: &HandleFn,
    route: lyra_core::ProxiedRoute,
    request: ApiRequest,
) -> Result<TestResponse, TestError> {
    let captured: Arc<Mutex<Option<Dispatched>>> = Arc::new(Mutex::new(None));
    let calls = Arc::new(AtomicUsize::new(0));

    let send_response: SendResponse = {
        let captured = captured.clone();
        let calls = calls.clone();
        Box::new(move |response: ApiResponse| {
            calls.fetch_add(1, Ordering::SeqCst);
            *captured.lock() = Some(Dispatched::Response(response));
        })
    };
    let send_error: SendError = {
        let captured = captured.clone();
        let calls = calls.clone();
        Box::new(move |error: ApiError| {
            calls.fetch_add(1, Ordering::SeqCst);
            *captured.lock() = Some(Dispatched::Error(error));
        })
    };

    handle(route, request, send_response, send_error).await?;

    let outcome = captured.lock().take().ok_or(TestError::NoCallback)?;
    Ok(TestResponse::new(outcome, calls.load(Ordering::SeqCst)))
}

impl Adapter for TestAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AdapterKind {
        self.kind
    }

    fn also_kinds(&self) -> Vec<AdapterKind> {
        self.also.clone()
    }

    fn set_request_handler(&mut self, handle: HandleFn) {
        self.state.lock().handle = Some(handle);
    }

    fn add_api_container(&mut self, routes: RouteTable) {
        self.state.lock().routes = routes;
    }

    fn start(&mut self) -> Result<(), AdapterError> {
        let mut state = self.state.lock();
        state.start_calls += 1;
        if state.handle.is_none() {
            return Err(AdapterError::NoHandler);
        }
        if let Some(message) = &self.fail_start {
            return Err(AdapterError::Start(message.clone()));
        }
        state.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.lock();
        state.stop_calls += 1;
        state.started = false;
    }
}

impl std::fmt::Debug for TestAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestAdapter")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}
