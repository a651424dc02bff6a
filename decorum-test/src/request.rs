use crate::adapter::{Incoming, TestAdapter};
use crate::response::{ResponseHandle, TestResponse};
use decorum_core::error::DispatchError;
use decorum_core::meta::HttpMethod;
use http::header::{HeaderMap, HeaderValue, IntoHeaderName, AUTHORIZATION, CONTENT_TYPE, COOKIE};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Builder for one request dispatched through a [`TestAdapter`].
pub struct TestRequest<'a> {
    adapter: &'a TestAdapter,
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<Value>,
}

impl<'a> TestRequest<'a> {
    pub(crate) fn new(adapter: &'a TestAdapter, method: HttpMethod, path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (
                path,
                form_urlencoded::parse(query.as_bytes()).into_owned().collect(),
            ),
            None => (path, Vec::new()),
        };
        Self {
            adapter,
            method,
            path: path.to_string(),
            query,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Append a query-string pair.
    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a custom header.
    pub fn header(mut self, name: impl IntoHeaderName, value: impl AsRef<str>) -> Self {
        self.headers.insert(name, header_value(value.as_ref()));
        self
    }

    /// Add a Bearer token authorization header.
    pub fn bearer(self, token: &str) -> Self {
        self.header(AUTHORIZATION, format!("Bearer {token}"))
    }

    /// Add a cookie. Each call appends one `Cookie` header.
    pub fn cookie(mut self, name: &str, value: &str) -> Self {
        self.headers
            .append(COOKIE, header_value(&format!("{name}={value}")));
        self
    }

    /// Set the request body as JSON. Also sets Content-Type to `application/json`.
    pub fn json(mut self, body: &impl Serialize) -> Self {
        self.body = Some(serde_json::to_value(body).expect("request body does not serialize to JSON"));
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Set the request body to an already-built JSON value.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Dispatch the request, panicking if the handler fails.
    pub async fn send(self) -> TestResponse {
        let target = format!("{} {}", self.method, self.path);
        self.try_send()
            .await
            .unwrap_or_else(|e| panic!("dispatch of {target} failed: {e}"))
    }

    /// Dispatch the request and return the dispatch error, if any.
    pub async fn try_send(self) -> Result<TestResponse, DispatchError> {
        let incoming = Incoming {
            method: self.method,
            path: self.path,
            path_params: HashMap::new(),
            query: self.query,
            headers: self.headers,
            body: self.body,
            response: ResponseHandle::default(),
        };
        self.adapter.dispatch(incoming).await
    }
}

/// Panics with the offending text; test requests are built from literals.
pub(crate) fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|e| panic!("invalid header value {value:?}: {e}"))
}
