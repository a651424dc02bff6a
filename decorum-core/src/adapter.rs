//! The adapter contract and the registration step that feeds it.
//!
//! An [`Adapter`] is the binding to a concrete HTTP server. Decorum never
//! matches paths or speaks HTTP itself: it hands the adapter one
//! [`ControllerRoutes`] per controller, each route carrying an [`Endpoint`]
//! that the adapter calls with its own request type.

use crate::configuration::ControllerConfiguration;
use crate::dispatch::{invoke_and_respond, BoxFuture, DispatchOutcome, Handler, Parameter};
use crate::error::DispatchError;
use crate::meta::{HttpMethod, Middleware, ParameterBinding};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// A framework-specific binding.
///
/// # Example
///
/// ```ignore
/// impl Adapter for HyperAdapter {
///     type Request = HyperRequest;
///
///     fn get_parameter_with_config(&self, binding: &ParameterBinding, req: &HyperRequest) -> Parameter {
///         match binding.kind {
///             ParameterType::Query => req.query(binding.name.as_deref().unwrap_or_default()).into(),
///             _ => Parameter::Value(Value::Null),
///         }
///     }
///
///     fn send(&self, value: Value, req: &HyperRequest) {
///         req.respond_json(value);
///     }
///
///     fn register(&self, controller: ControllerRoutes<HyperRequest>) {
///         for route in controller.routes {
///             self.router.insert(route.method, route.path, route.endpoint);
///         }
///     }
/// }
/// ```
pub trait Adapter: Send + Sync + 'static {
    /// The adapter's per-request data, passed through dispatch untouched.
    type Request: Send + Sync + 'static;

    /// Extract the value of one bound parameter from `request`.
    fn get_parameter_with_config(
        &self,
        binding: &ParameterBinding,
        request: &Self::Request,
    ) -> Parameter;

    /// Deliver a resolved handler result for `request`.
    fn send(&self, value: Value, request: &Self::Request);

    /// Bind every route of one controller to the underlying server.
    ///
    /// Called exactly once per controller type.
    fn register(&self, controller: ControllerRoutes<Self::Request>);

    /// The name of this adapter (for diagnostics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// The callable an adapter invokes for each request on a route.
pub struct Endpoint<R> {
    inner: Arc<dyn Fn(Arc<R>) -> BoxFuture<Result<DispatchOutcome, DispatchError>> + Send + Sync>,
}

impl<R> Endpoint<R> {
    /// Dispatch one request.
    pub fn call(&self, request: R) -> BoxFuture<Result<DispatchOutcome, DispatchError>> {
        (self.inner)(Arc::new(request))
    }

    /// Dispatch a request the adapter already shares.
    pub fn call_shared(&self, request: Arc<R>) -> BoxFuture<Result<DispatchOutcome, DispatchError>> {
        (self.inner)(request)
    }
}

impl<R> Clone for Endpoint<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> std::fmt::Debug for Endpoint<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Endpoint(..)")
    }
}

/// One route, ready to be bound by an adapter.
#[derive(Debug, Clone)]
pub struct BoundRoute<R> {
    pub method: HttpMethod,
    /// Full path, with the controller root already joined in.
    pub path: String,
    pub handler_name: String,
    pub endpoint: Endpoint<R>,
}

/// Everything an adapter needs to register one controller.
#[derive(Debug, Clone)]
pub struct ControllerRoutes<R> {
    pub controller: &'static str,
    pub middlewares: Vec<Middleware>,
    pub routes: Vec<BoundRoute<R>>,
}

/// Join a controller root and a route path with exactly one `/` between
/// them. Neither part is validated.
pub fn create_path_with_root(root: Option<&str>, path: Option<&str>) -> String {
    let root = root.unwrap_or("").trim_end_matches('/');
    let path = path.unwrap_or("").trim_start_matches('/');
    match (root.is_empty(), path.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{path}"),
        (false, true) if root.starts_with('/') => root.to_string(),
        (false, true) => format!("/{root}"),
        (false, false) if root.starts_with('/') => format!("{root}/{path}"),
        (false, false) => format!("/{root}/{path}"),
    }
}

// ── Binding a controller to an adapter ──────────────────────────────────

/// Type-erased registration step: the configuration only knows `C`, the
/// adapter type is captured here.
pub(crate) trait Registrar<C>: Send + Sync {
    fn adapter_name(&self) -> &'static str;

    fn register(&self, controller: Arc<C>, configuration: Arc<ControllerConfiguration<C>>);
}

struct AdapterRegistrar<A> {
    adapter: Arc<A>,
}

impl<A, C> Registrar<C> for AdapterRegistrar<A>
where
    A: Adapter,
    C: Send + Sync + 'static,
{
    fn adapter_name(&self) -> &'static str {
        self.adapter.name()
    }

    fn register(&self, controller: Arc<C>, configuration: Arc<ControllerConfiguration<C>>) {
        apply_configuration(&self.adapter, controller, configuration);
    }
}

/// The adapter and controller instance a configuration is registered with.
pub(crate) struct AdapterBinding<C> {
    registrar: Arc<dyn Registrar<C>>,
    instance: Arc<C>,
}

impl<C: Send + Sync + 'static> AdapterBinding<C> {
    pub(crate) fn new<A: Adapter>(adapter: Arc<A>, instance: Arc<C>) -> Self {
        Self {
            registrar: Arc::new(AdapterRegistrar { adapter }),
            instance,
        }
    }
}

impl<C> AdapterBinding<C> {
    pub(crate) fn adapter_name(&self) -> &'static str {
        self.registrar.adapter_name()
    }

    pub(crate) fn register(self, configuration: Arc<ControllerConfiguration<C>>) {
        self.registrar.register(self.instance, configuration);
    }
}

impl<C> Clone for AdapterBinding<C> {
    fn clone(&self) -> Self {
        Self {
            registrar: Arc::clone(&self.registrar),
            instance: Arc::clone(&self.instance),
        }
    }
}

/// Build an endpoint per route and hand them all to `adapter`.
///
/// Routes whose handler is missing are skipped; the registry rejects such
/// configurations before they get here.
fn apply_configuration<A, C>(
    adapter: &Arc<A>,
    controller: Arc<C>,
    configuration: Arc<ControllerConfiguration<C>>,
) where
    A: Adapter,
    C: Send + Sync + 'static,
{
    let routes: Vec<BoundRoute<A::Request>> = configuration
        .routes()
        .iter()
        .filter_map(|route| {
            let handler = configuration.handler(&route.handler_name)?.clone();
            Some(BoundRoute {
                method: route.method,
                path: create_path_with_root(configuration.root(), route.path.as_deref()),
                handler_name: route.handler_name.clone(),
                endpoint: endpoint(
                    Arc::clone(adapter),
                    Arc::clone(&controller),
                    Arc::clone(&configuration),
                    handler,
                    route.handler_name.clone(),
                ),
            })
        })
        .collect();

    info!(
        controller = configuration.controller_name(),
        adapter = adapter.name(),
        routes = routes.len(),
        middlewares = configuration.middlewares().len(),
        "Registering controller"
    );

    adapter.register(ControllerRoutes {
        controller: configuration.controller_name(),
        middlewares: configuration.middlewares().to_vec(),
        routes,
    });
}

fn endpoint<A, C>(
    adapter: Arc<A>,
    controller: Arc<C>,
    configuration: Arc<ControllerConfiguration<C>>,
    handler: Handler<C>,
    handler_name: String,
) -> Endpoint<A::Request>
where
    A: Adapter,
    C: Send + Sync + 'static,
{
    let handler_name: Arc<str> = Arc::from(handler_name);
    Endpoint {
        inner: Arc::new(move |request: Arc<A::Request>| {
            let adapter = Arc::clone(&adapter);
            let controller = Arc::clone(&controller);
            let configuration = Arc::clone(&configuration);
            let handler = handler.clone();
            let handler_name = Arc::clone(&handler_name);
            Box::pin(async move {
                invoke_and_respond(
                    adapter.as_ref(),
                    &handler,
                    &controller,
                    configuration.as_ref(),
                    &handler_name,
                    request.as_ref(),
                )
                .await
            })
        }),
    }
}
