use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Standard HTTP verbs a route can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Lowercase verb name, as adapters usually key their routing tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Options => http::Method::OPTIONS,
        }
    }
}

/// A single declared route. Immutable once appended to a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDeclaration {
    pub method: HttpMethod,
    pub path: Option<String>,
    pub handler_name: String,
}

/// Where a handler parameter is extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    /// A named path segment.
    Path,
    /// A named query-string value.
    Query,
    /// The request body, or one named field of it.
    Body,
    /// A named request header.
    Header,
    /// A named cookie.
    Cookie,
    /// The adapter object itself.
    Adapter,
    /// The adapter's native request object.
    Request,
    /// The adapter's native response object.
    Response,
}

impl ParameterType {
    /// Whether extraction of this type is addressed by name.
    pub fn is_named(&self) -> bool {
        matches!(
            self,
            ParameterType::Path | ParameterType::Query | ParameterType::Header | ParameterType::Cookie
        )
    }

    /// Whether the adapter hands over a native object rather than a JSON value.
    pub fn is_native(&self) -> bool {
        matches!(
            self,
            ParameterType::Adapter | ParameterType::Request | ParameterType::Response
        )
    }
}

/// Binds one handler parameter position to an extraction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterBinding {
    pub index: usize,
    pub kind: ParameterType,
    pub name: Option<String>,
}

impl ParameterBinding {
    pub fn new(index: usize, kind: ParameterType, name: Option<String>) -> Self {
        Self { index, kind, name }
    }

    pub fn path(index: usize, name: impl Into<String>) -> Self {
        Self::new(index, ParameterType::Path, Some(name.into()))
    }

    pub fn query(index: usize, name: impl Into<String>) -> Self {
        Self::new(index, ParameterType::Query, Some(name.into()))
    }

    /// The whole request body.
    pub fn body(index: usize) -> Self {
        Self::new(index, ParameterType::Body, None)
    }

    /// A single top-level field of the request body.
    pub fn body_field(index: usize, name: impl Into<String>) -> Self {
        Self::new(index, ParameterType::Body, Some(name.into()))
    }

    pub fn header(index: usize, name: impl Into<String>) -> Self {
        Self::new(index, ParameterType::Header, Some(name.into()))
    }

    pub fn cookie(index: usize, name: impl Into<String>) -> Self {
        Self::new(index, ParameterType::Cookie, Some(name.into()))
    }

    pub fn adapter(index: usize) -> Self {
        Self::new(index, ParameterType::Adapter, None)
    }

    pub fn request(index: usize) -> Self {
        Self::new(index, ParameterType::Request, None)
    }

    pub fn response(index: usize) -> Self {
        Self::new(index, ParameterType::Response, None)
    }
}

/// A middleware reference, resolved by the adapter at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Middleware {
    pub name: Cow<'static, str>,
}

impl Middleware {
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }
}
