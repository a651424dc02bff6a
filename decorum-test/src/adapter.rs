use crate::request::TestRequest;
use crate::response::{ResponseHandle, TestResponse};
use decorum_core::adapter::{Adapter, ControllerRoutes, Endpoint};
use decorum_core::dispatch::Parameter;
use decorum_core::error::DispatchError;
use decorum_core::meta::{HttpMethod, Middleware, ParameterBinding, ParameterType};
use http::header::COOKIE;
use http::HeaderMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The request type of [`TestAdapter`], as handlers see it through
/// `#[request]` injection.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub(crate) method: HttpMethod,
    pub(crate) path: String,
    pub(crate) path_params: HashMap<String, String>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<Value>,
    pub(crate) response: ResponseHandle,
}

impl Incoming {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The concrete request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn response(&self) -> &ResponseHandle {
        &self.response
    }

    /// A query value; repeated keys become a JSON array.
    fn query_value(&self, name: &str) -> Value {
        let mut values: Vec<Value> = self
            .query
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| Value::String(value.clone()))
            .collect();
        match values.len() {
            0 => Value::Null,
            1 => values.remove(0),
            _ => Value::Array(values),
        }
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|header| header.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }
}

/// One value handed to [`Adapter::send`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentValue {
    pub method: HttpMethod,
    pub path: String,
    pub value: Value,
}

#[derive(Default)]
struct State {
    controllers: Vec<ControllerRoutes<Incoming>>,
    sent: Vec<SentValue>,
    extractions: Vec<ParameterBinding>,
}

/// In-memory adapter that records every registration, extraction and send.
///
/// Route templates use `{name}` or `:name` segments. When several routes
/// match a request, the first registered one wins.
///
/// ```ignore
/// let adapter = TestAdapter::new();
/// Bootstrapper::new(adapter.clone()).controller(UserController).start()?;
/// adapter.get("/users/7").send().await.assert_ok().assert_json_path("id", 7);
/// ```
#[derive(Clone, Default)]
pub struct TestAdapter {
    state: Arc<Mutex<State>>,
}

impl TestAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a GET request.
    pub fn get(&self, path: &str) -> TestRequest<'_> {
        self.request(HttpMethod::Get, path)
    }

    /// Start building a POST request.
    pub fn post(&self, path: &str) -> TestRequest<'_> {
        self.request(HttpMethod::Post, path)
    }

    /// Start building a PUT request.
    pub fn put(&self, path: &str) -> TestRequest<'_> {
        self.request(HttpMethod::Put, path)
    }

    /// Start building a PATCH request.
    pub fn patch(&self, path: &str) -> TestRequest<'_> {
        self.request(HttpMethod::Patch, path)
    }

    /// Start building a DELETE request.
    pub fn delete(&self, path: &str) -> TestRequest<'_> {
        self.request(HttpMethod::Delete, path)
    }

    /// Start building a request with an arbitrary method. `path` may carry
    /// a query string.
    pub fn request(&self, method: HttpMethod, path: &str) -> TestRequest<'_> {
        TestRequest::new(self, method, path)
    }

    /// Every controller registered so far, in registration order.
    pub fn registrations(&self) -> Vec<ControllerRoutes<Incoming>> {
        self.lock().controllers.clone()
    }

    pub fn registration_count(&self) -> usize {
        self.lock().controllers.len()
    }

    /// `(method, full path)` of every registered route.
    pub fn routes(&self) -> Vec<(HttpMethod, String)> {
        self.lock()
            .controllers
            .iter()
            .flat_map(|controller| &controller.routes)
            .map(|route| (route.method, route.path.clone()))
            .collect()
    }

    /// Middlewares of the registered controller whose type name ends with `controller`.
    pub fn middlewares(&self, controller: &str) -> Option<Vec<Middleware>> {
        self.lock()
            .controllers
            .iter()
            .find(|registered| registered.controller.ends_with(controller))
            .map(|registered| registered.middlewares.clone())
    }

    pub fn sent(&self) -> Vec<SentValue> {
        self.lock().sent.clone()
    }

    /// Every binding the dispatcher asked this adapter to extract.
    pub fn extractions(&self) -> Vec<ParameterBinding> {
        self.lock().extractions.clone()
    }

    pub(crate) async fn dispatch(&self, mut incoming: Incoming) -> Result<TestResponse, DispatchError> {
        let Some((endpoint, path_params)) = self.find_route(incoming.method, &incoming.path) else {
            return Ok(TestResponse::not_found());
        };
        incoming.path_params = path_params;
        let response = incoming.response.clone();
        let outcome = endpoint.call(incoming).await?;
        Ok(TestResponse::from_handle(outcome, &response))
    }

    fn find_route(
        &self,
        method: HttpMethod,
        path: &str,
    ) -> Option<(Endpoint<Incoming>, HashMap<String, String>)> {
        self.lock()
            .controllers
            .iter()
            .flat_map(|controller| &controller.routes)
            .filter(|route| route.method == method)
            .find_map(|route| {
                match_template(&route.path, path).map(|params| (route.endpoint.clone(), params))
            })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Adapter for TestAdapter {
    type Request = Incoming;

    fn get_parameter_with_config(&self, binding: &ParameterBinding, request: &Incoming) -> Parameter {
        self.lock().extractions.push(binding.clone());
        let name = binding.name.as_deref().unwrap_or_default();
        let text = |value: Option<String>| Parameter::Value(value.map(Value::String).unwrap_or(Value::Null));
        match binding.kind {
            ParameterType::Path => text(request.path_param(name).map(str::to_string)),
            ParameterType::Query => Parameter::Value(request.query_value(name)),
            ParameterType::Header => text(request.header(name)),
            ParameterType::Cookie => text(request.cookie(name)),
            ParameterType::Body => {
                let body = request.body.as_ref();
                let value = match binding.name.as_deref() {
                    Some(field) => body.and_then(|body| body.get(field)),
                    None => body,
                };
                Parameter::Value(value.cloned().unwrap_or(Value::Null))
            }
            ParameterType::Adapter => Parameter::native(self.clone()),
            ParameterType::Request => Parameter::native(request.clone()),
            ParameterType::Response => Parameter::native(request.response.clone()),
        }
    }

    fn send(&self, value: Value, request: &Incoming) {
        request.response.send(value.clone());
        self.lock().sent.push(SentValue {
            method: request.method,
            path: request.path.clone(),
            value,
        });
    }

    fn register(&self, controller: ControllerRoutes<Incoming>) {
        self.lock().controllers.push(controller);
    }

    fn name(&self) -> &'static str {
        "test"
    }
}

/// Match `path` against a route template, returning the captured segments.
fn match_template(template: &str, path: &str) -> Option<HashMap<String, String>> {
    let mut expected = template.split('/').filter(|s| !s.is_empty());
    let mut actual = path.split('/').filter(|s| !s.is_empty());
    let mut params = HashMap::new();
    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return Some(params),
            (Some(segment), Some(value)) => match capture_name(segment) {
                Some(name) => {
                    params.insert(name.to_string(), value.to_string());
                }
                None if segment == value => {}
                None => return None,
            },
            _ => return None,
        }
    }
}

fn capture_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix(':')
        .or_else(|| segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')))
}
