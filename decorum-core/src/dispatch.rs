//! Request dispatch: parameter binding, handler invocation, and
//! normalization of the three handler result shapes.
//!
//! A handler returns an optional [`HandlerResult`]:
//!
//! - [`HandlerResult::Immediate`]: the value is sent right away.
//! - [`HandlerResult::Deferred`]: the future is awaited, then its value is sent.
//! - [`HandlerResult::Thunk`]: the callable receives a [`Completion`] and the
//!   value it completes with is sent.
//!
//! No result at all means the handler answered the request itself (for
//! example through an injected response object), and nothing is sent.

use crate::adapter::Adapter;
use crate::configuration::ControllerConfiguration;
use crate::error::{BoxError, DispatchError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A boxed, sendable future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type ThunkFn = Box<dyn FnOnce(Completion) + Send>;

type HandlerFn<C> =
    dyn Fn(&Arc<C>, ParameterList) -> Result<Option<HandlerResult>, BoxError> + Send + Sync;

// ── Values ──────────────────────────────────────────────────────────────

/// Conversion of a handler's output into the value handed to the adapter.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be sent as a handler result",
    note = "wrap serializable types in `Json(..)`, or return a `serde_json::Value`"
)]
pub trait IntoValue {
    fn into_value(self) -> Result<Value, BoxError>;
}

impl IntoValue for Value {
    fn into_value(self) -> Result<Value, BoxError> {
        Ok(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Result<Value, BoxError> {
        Ok(Value::String(self))
    }
}

impl IntoValue for &'static str {
    fn into_value(self) -> Result<Value, BoxError> {
        Ok(Value::String(self.to_string()))
    }
}

impl IntoValue for () {
    fn into_value(self) -> Result<Value, BoxError> {
        Ok(Value::Null)
    }
}

macro_rules! impl_into_value_via_from {
    ($($ty:ty),+) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Result<Value, BoxError> {
                    Ok(Value::from(self))
                }
            }
        )+
    };
}

impl_into_value_via_from!(bool, i32, i64, u32, u64, f64);

impl<T: IntoValue, E: Into<BoxError>> IntoValue for Result<T, E> {
    fn into_value(self) -> Result<Value, BoxError> {
        self.map_err(Into::<BoxError>::into)?.into_value()
    }
}

/// Serializes the wrapped value with `serde_json` when it is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoValue for Json<T> {
    fn into_value(self) -> Result<Value, BoxError> {
        Ok(serde_json::to_value(self.0)?)
    }
}

// ── Result shapes ───────────────────────────────────────────────────────

/// The value a handler produced, in one of three shapes.
pub enum HandlerResult {
    Immediate(Value),
    Deferred(BoxFuture<Result<Value, BoxError>>),
    Thunk(ThunkFn),
}

impl HandlerResult {
    /// A value that is already available.
    pub fn immediate(value: impl Into<Value>) -> Self {
        HandlerResult::Immediate(value.into())
    }

    /// A serializable value that is already available.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(HandlerResult::Immediate(serde_json::to_value(value)?))
    }

    /// A value that becomes available once `future` resolves.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future + Send + 'static,
        F::Output: IntoValue,
    {
        HandlerResult::Deferred(Box::pin(async move { future.await.into_value() }))
    }

    /// A callable that reports its value through a [`Completion`].
    pub fn thunk<F>(thunk: F) -> Self
    where
        F: FnOnce(Completion) + Send + 'static,
    {
        HandlerResult::Thunk(Box::new(thunk))
    }

    fn shape(&self) -> &'static str {
        match self {
            HandlerResult::Immediate(_) => "immediate",
            HandlerResult::Deferred(_) => "deferred",
            HandlerResult::Thunk(_) => "thunk",
        }
    }
}

impl std::fmt::Debug for HandlerResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerResult::Immediate(value) => f.debug_tuple("Immediate").field(value).finish(),
            other => write!(f, "{}(..)", other.shape()),
        }
    }
}

/// The `(error, value)` callback handed to a thunk.
///
/// Consuming it exactly once finishes the request. Dropping it unused is
/// reported as [`DispatchError::ThunkAbandoned`].
pub struct Completion {
    tx: oneshot::Sender<Result<Value, BoxError>>,
}

impl Completion {
    fn channel() -> (Self, oneshot::Receiver<Result<Value, BoxError>>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Complete with either an error or a value.
    pub fn complete<T: IntoValue, E: Into<BoxError>>(self, result: Result<T, E>) {
        let outcome = result
            .map_err(Into::<BoxError>::into)
            .and_then(IntoValue::into_value);
        // The receiver is gone only when the dispatching future was dropped.
        let _ = self.tx.send(outcome);
    }

    /// Complete successfully with `value`.
    pub fn succeed(self, value: impl IntoValue) {
        self.complete(Ok::<_, BoxError>(value))
    }

    /// Complete with `error`.
    pub fn fail(self, error: impl Into<BoxError>) {
        self.complete(Err::<Value, _>(error))
    }

    /// Node-style completion: an error wins over the value.
    pub fn call(self, error: Option<BoxError>, value: impl IntoValue) {
        match error {
            Some(err) => self.fail(err),
            None => self.succeed(value),
        }
    }
}

/// Normalizes a handler's return type into an optional [`HandlerResult`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid handler return type",
    note = "return a `HandlerResult`, a `Json(..)` or `serde_json::Value`, `()`, or a `Result` of one of these"
)]
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> Result<Option<HandlerResult>, BoxError>;
}

impl IntoHandlerResult for HandlerResult {
    fn into_handler_result(self) -> Result<Option<HandlerResult>, BoxError> {
        Ok(Some(self))
    }
}

impl IntoHandlerResult for Option<HandlerResult> {
    fn into_handler_result(self) -> Result<Option<HandlerResult>, BoxError> {
        Ok(self)
    }
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> Result<Option<HandlerResult>, BoxError> {
        Ok(None)
    }
}

impl<T: IntoHandlerResult, E: Into<BoxError>> IntoHandlerResult for Result<T, E> {
    fn into_handler_result(self) -> Result<Option<HandlerResult>, BoxError> {
        self.map_err(Into::<BoxError>::into)?.into_handler_result()
    }
}

// Plain values are sent immediately.
macro_rules! impl_into_handler_result_via_value {
    ($($ty:ty),+) => {
        $(
            impl IntoHandlerResult for $ty {
                fn into_handler_result(self) -> Result<Option<HandlerResult>, BoxError> {
                    Ok(Some(HandlerResult::Immediate(self.into_value()?)))
                }
            }
        )+
    };
}

impl_into_handler_result_via_value!(Value, String, &'static str, bool, i32, i64, u32, u64, f64);

impl<T: Serialize> IntoHandlerResult for Json<T> {
    fn into_handler_result(self) -> Result<Option<HandlerResult>, BoxError> {
        Ok(Some(HandlerResult::Immediate(self.into_value()?)))
    }
}

// ── Parameters ──────────────────────────────────────────────────────────

/// One extracted parameter value.
pub enum Parameter {
    /// A JSON value (path, query, body, header, cookie).
    Value(Value),
    /// A native adapter object (adapter, request, or response injection).
    Native(Box<dyn Any + Send>),
}

impl Parameter {
    pub fn native<T: Any + Send>(value: T) -> Self {
        Parameter::Native(Box::new(value))
    }
}

impl From<Value> for Parameter {
    fn from(value: Value) -> Self {
        Parameter::Value(value)
    }
}

impl std::fmt::Debug for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Parameter::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Parameter::Native(_) => f.write_str("Native(..)"),
        }
    }
}

/// Positional handler arguments. Unbound positions are empty.
#[derive(Debug, Default)]
pub struct ParameterList {
    slots: Vec<Option<Parameter>>,
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `parameter` at `index`, growing the list as needed.
    pub fn set(&mut self, index: usize, parameter: Parameter) {
        if self.slots.len() <= index {
            self.slots.resize_with(index + 1, || None);
        }
        self.slots[index] = Some(parameter);
    }

    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn is_bound(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Number of positions, including unbound gaps.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Take the value at `index` and deserialize it.
    ///
    /// An unbound position deserializes from `null`, so `Option<T>` arguments
    /// receive `None`. A string that does not deserialize as-is is retried as
    /// JSON text, so a path segment `"42"` fills a `u64`.
    pub fn take_value<T: DeserializeOwned>(&mut self, index: usize) -> Result<T, DispatchError> {
        let value = match self.slots.get_mut(index).and_then(Option::take) {
            None => Value::Null,
            Some(Parameter::Value(value)) => value,
            Some(Parameter::Native(_)) => {
                return Err(DispatchError::parameter(
                    index,
                    "expected a value, the adapter supplied a native object",
                ))
            }
        };
        let raw = match &value {
            Value::String(raw) => Some(raw.clone()),
            _ => None,
        };
        serde_json::from_value(value)
            .or_else(|err| match raw {
                Some(raw) => serde_json::from_str(&raw).map_err(|_| err),
                None => Err(err),
            })
            .map_err(|e| DispatchError::parameter(index, e.to_string()))
    }

    /// Take the native object at `index` and downcast it to `T`.
    pub fn take_native<T: Any>(&mut self, index: usize) -> Result<T, DispatchError> {
        match self.slots.get_mut(index).and_then(Option::take) {
            Some(Parameter::Native(native)) => native.downcast::<T>().map(|b| *b).map_err(|_| {
                DispatchError::parameter(
                    index,
                    format!("native object is not a `{}`", std::any::type_name::<T>()),
                )
            }),
            Some(Parameter::Value(_)) => Err(DispatchError::parameter(
                index,
                "expected a native object, the adapter supplied a value",
            )),
            None => Err(DispatchError::parameter(index, "parameter is not bound")),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────────

/// A type-erased handler method of controller `C`.
pub struct Handler<C> {
    inner: Arc<HandlerFn<C>>,
}

impl<C> Handler<C> {
    pub fn new<F, R>(handler: F) -> Self
    where
        F: Fn(&Arc<C>, ParameterList) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        Self {
            inner: Arc::new(move |controller, parameters| {
                handler(controller, parameters).into_handler_result()
            }),
        }
    }

    /// Invoke the handler on `controller`.
    pub fn call(
        &self,
        controller: &Arc<C>,
        parameters: ParameterList,
    ) -> Result<Option<HandlerResult>, BoxError> {
        (self.inner)(controller, parameters)
    }
}

impl<C> Clone for Handler<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> std::fmt::Debug for Handler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler(..)")
    }
}

// ── Engine ──────────────────────────────────────────────────────────────

/// Terminal state of one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler produced a value and it was sent.
    Sent,
    /// The handler produced no result; nothing was sent.
    Done,
}

/// Extract every bound parameter of `handler_name` from `request`.
pub fn build_parameter_list<A: Adapter, C>(
    adapter: &A,
    configuration: &ControllerConfiguration<C>,
    handler_name: &str,
    request: &A::Request,
) -> ParameterList {
    let mut parameters = ParameterList::new();
    for binding in configuration.parameter_bindings(handler_name) {
        let parameter = adapter.get_parameter_with_config(binding, request);
        parameters.set(binding.index, parameter);
    }
    parameters
}

/// Run one request through `handler` and send its result, if any, back
/// through `adapter` together with the original `request`.
///
/// Errors of every kind are returned to the caller unmodified; the adapter
/// is not told about them.
pub async fn invoke_and_respond<A, C>(
    adapter: &A,
    handler: &Handler<C>,
    controller: &Arc<C>,
    configuration: &ControllerConfiguration<C>,
    handler_name: &str,
    request: &A::Request,
) -> Result<DispatchOutcome, DispatchError>
where
    A: Adapter,
    C: Send + Sync + 'static,
{
    let parameters = build_parameter_list(adapter, configuration, handler_name, request);

    let result = match handler.call(controller, parameters) {
        Ok(Some(result)) => result,
        Ok(None) => {
            debug!(handler = handler_name, "Handler produced no result");
            return Ok(DispatchOutcome::Done);
        }
        Err(err) => return Err(DispatchError::from_handler(err)),
    };

    debug!(handler = handler_name, shape = result.shape(), "Resolving handler result");
    let value = match result {
        HandlerResult::Immediate(value) => value,
        HandlerResult::Deferred(future) => future.await.map_err(|err| {
            warn!(handler = handler_name, error = %err, "Deferred result rejected");
            DispatchError::Rejected(err)
        })?,
        HandlerResult::Thunk(thunk) => {
            let (completion, outcome) = Completion::channel();
            thunk(completion);
            match outcome.await {
                Ok(Ok(value)) => value,
                Ok(Err(err)) => {
                    warn!(handler = handler_name, error = %err, "Thunk completed with error");
                    return Err(DispatchError::Thunk(err));
                }
                Err(_) => {
                    return Err(DispatchError::ThunkAbandoned {
                        handler: handler_name.to_string(),
                    })
                }
            }
        }
    };

    adapter.send(value, request);
    Ok(DispatchOutcome::Sent)
}
