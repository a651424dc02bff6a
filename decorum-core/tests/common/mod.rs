#![allow(dead_code)]

use decorum_core::adapter::{Adapter, ControllerRoutes};
use decorum_core::dispatch::{DispatchOutcome, Parameter};
use decorum_core::error::DispatchError;
use decorum_core::meta::{HttpMethod, ParameterBinding, ParameterType};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A request made of named values per extraction kind.
#[derive(Debug, Clone, Default)]
pub struct FakeRequest {
    pub id: u32,
    pub values: HashMap<(ParameterType, String), Value>,
    pub body: Value,
}

impl FakeRequest {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with(mut self, kind: ParameterType, name: &str, value: Value) -> Self {
        self.values.insert((kind, name.to_string()), value);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }
}

#[derive(Default)]
struct State {
    sent: Vec<(Value, u32)>,
    registrations: Vec<ControllerRoutes<FakeRequest>>,
}

/// Records everything it is asked to do.
#[derive(Clone, Default)]
pub struct RecordingAdapter {
    state: Arc<Mutex<State>>,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(value, request id)` for every send, in order.
    pub fn sent(&self) -> Vec<(Value, u32)> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn registrations(&self) -> Vec<ControllerRoutes<FakeRequest>> {
        self.state.lock().unwrap().registrations.clone()
    }

    pub fn registration_count(&self) -> usize {
        self.state.lock().unwrap().registrations.len()
    }

    /// Find the endpoint registered for `method path` and run `request` through it.
    pub async fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        request: FakeRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        let endpoint = {
            let state = self.state.lock().unwrap();
            state
                .registrations
                .iter()
                .flat_map(|c| c.routes.iter())
                .find(|r| r.method == method && r.path == path)
                .map(|r| r.endpoint.clone())
                .unwrap_or_else(|| panic!("no route for {method} {path}"))
        };
        endpoint.call(request).await
    }
}

impl Adapter for RecordingAdapter {
    type Request = FakeRequest;

    fn get_parameter_with_config(&self, binding: &ParameterBinding, request: &FakeRequest) -> Parameter {
        match (binding.kind, binding.name.as_deref()) {
            (ParameterType::Body, None) => Parameter::Value(request.body.clone()),
            (ParameterType::Body, Some(field)) => {
                Parameter::Value(request.body.get(field).cloned().unwrap_or(Value::Null))
            }
            (ParameterType::Adapter, _) => Parameter::native(self.clone()),
            (ParameterType::Request, _) => Parameter::native(request.id),
            (kind, Some(name)) => Parameter::Value(
                request
                    .values
                    .get(&(kind, name.to_string()))
                    .cloned()
                    .unwrap_or(Value::Null),
            ),
            (_, None) => Parameter::Value(Value::Null),
        }
    }

    fn send(&self, value: Value, request: &FakeRequest) {
        self.state.lock().unwrap().sent.push((value, request.id));
    }

    fn register(&self, controller: ControllerRoutes<FakeRequest>) {
        self.state.lock().unwrap().registrations.push(controller);
    }
}
