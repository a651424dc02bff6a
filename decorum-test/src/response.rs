use crate::json_path::resolve_path;
use crate::request::header_value;
use decorum_core::dispatch::DispatchOutcome;
use http::header::{HeaderMap, HeaderName, IntoHeaderName};
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct ResponseState {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Value>,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// The native response object of the test adapter.
///
/// Handlers receive it through `#[response]` injection and may answer the
/// request themselves instead of returning a value.
#[derive(Debug, Clone, Default)]
pub struct ResponseHandle {
    state: Arc<Mutex<ResponseState>>,
}

impl ResponseHandle {
    pub fn set_status(&self, status: StatusCode) {
        self.lock().status = status;
    }

    pub fn set_header(&self, name: impl IntoHeaderName, value: impl AsRef<str>) {
        self.lock()
            .headers
            .insert(name, header_value(value.as_ref()));
    }

    /// Write the response body. A later write replaces an earlier one.
    pub fn send(&self, body: impl Into<Value>) {
        self.lock().body = Some(body.into());
    }

    pub fn send_json(&self, body: &impl Serialize) {
        self.send(serde_json::to_value(body).expect("response body does not serialize to JSON"));
    }

    pub fn is_sent(&self) -> bool {
        self.lock().body.is_some()
    }

    fn lock(&self) -> MutexGuard<'_, ResponseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Response wrapper with status assertions, JSON-path assertions, and body helpers.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    /// `None` when no route matched.
    pub outcome: Option<DispatchOutcome>,
}

impl TestResponse {
    pub(crate) fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: None,
            outcome: None,
        }
    }

    pub(crate) fn from_handle(outcome: DispatchOutcome, handle: &ResponseHandle) -> Self {
        let state = handle.lock();
        Self {
            status: state.status,
            headers: state.headers.clone(),
            body: state.body.clone(),
            outcome: Some(outcome),
        }
    }

    // ── Status assertions ──

    /// Assert status is 200 OK.
    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    /// Assert status is 404 Not Found.
    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "Expected {expected}, got {}\nBody: {}",
            self.status,
            self.text()
        );
        self
    }

    // ── Outcome assertions ──

    /// Assert the handler result went through `Adapter::send`.
    pub fn assert_sent(self) -> Self {
        assert_eq!(
            self.outcome,
            Some(DispatchOutcome::Sent),
            "Expected the handler result to be sent\nBody: {}",
            self.text()
        );
        self
    }

    /// Assert the handler produced no result for the adapter to send.
    pub fn assert_done(self) -> Self {
        assert_eq!(
            self.outcome,
            Some(DispatchOutcome::Done),
            "Expected no handler result\nBody: {}",
            self.text()
        );
        self
    }

    // ── JSON-path assertions ──

    /// Assert that a JSON path resolves to the expected value.
    ///
    /// ```ignore
    /// resp.assert_json_path("users[0].name", "Alice")
    ///     .assert_json_path("users.len()", 2);
    /// ```
    pub fn assert_json_path(self, path: &str, expected: impl Into<Value>) -> Self {
        let root = self.json_value();
        let actual = resolve_path(&root, path);
        let expected = expected.into();
        assert_eq!(
            actual, expected,
            "JSON path \"{path}\" assertion failed\n  Expected: {expected}\n  Actual:   {actual}\n  Body: {root}",
        );
        self
    }

    pub fn assert_json_path_fn(self, path: &str, predicate: impl FnOnce(&Value) -> bool) -> Self {
        let root = self.json_value();
        let actual = resolve_path(&root, path);
        assert!(
            predicate(&actual),
            "JSON path \"{path}\" predicate failed\n  Value: {actual}\n  Body: {root}",
        );
        self
    }

    /// Extract and deserialize a value at a JSON path.
    pub fn json_path<T: DeserializeOwned>(&self, path: &str) -> T {
        let root = self.json_value();
        let value = resolve_path(&root, path);
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            panic!("Failed to deserialize JSON path \"{path}\": {e}\n  Value: {value}\n  Body: {root}")
        })
    }

    // ── Body helpers ──

    /// Deserialize the whole body. A response without a body reads as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json_value())
            .unwrap_or_else(|e| panic!("Failed to deserialize body: {e}\nBody: {}", self.text()))
    }

    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        let name: HeaderName = name.as_ref().parse().ok()?;
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> String {
        match &self.body {
            Some(Value::String(text)) => text.clone(),
            Some(body) => body.to_string(),
            None => String::new(),
        }
    }

    fn json_value(&self) -> Value {
        self.body.clone().unwrap_or(Value::Null)
    }
}
