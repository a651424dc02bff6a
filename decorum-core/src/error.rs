use std::fmt;

/// Boxed error type returned by handlers, deferred values, and thunks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure while dispatching a single request.
///
/// None of these are retried. The adapter decides how (and whether) to
/// present them to the caller.
#[derive(Debug)]
pub enum DispatchError {
    /// The handler itself returned an error synchronously.
    Handler(BoxError),
    /// A deferred result resolved to an error.
    Rejected(BoxError),
    /// A thunk reported an error through its completion.
    Thunk(BoxError),
    /// A thunk dropped its completion without ever invoking it.
    ThunkAbandoned { handler: String },
    /// A bound parameter could not be converted to the handler's argument type.
    Parameter {
        index: usize,
        message: String,
    },
}

impl DispatchError {
    /// Create a parameter conversion error.
    pub fn parameter(index: usize, message: impl Into<String>) -> Self {
        DispatchError::Parameter {
            index,
            message: message.into(),
        }
    }

    /// Unwrap a boxed handler error, recovering a `DispatchError` raised
    /// inside generated handler code instead of double-wrapping it.
    pub(crate) fn from_handler(err: BoxError) -> Self {
        match err.downcast::<DispatchError>() {
            Ok(inner) => *inner,
            Err(other) => DispatchError::Handler(other),
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Handler(err) => write!(f, "handler failed: {err}"),
            DispatchError::Rejected(err) => write!(f, "deferred result rejected: {err}"),
            DispatchError::Thunk(err) => write!(f, "thunk completed with error: {err}"),
            DispatchError::ThunkAbandoned { handler } => {
                write!(f, "thunk returned by '{handler}' dropped its completion")
            }
            DispatchError::Parameter { index, message } => {
                write!(f, "parameter {index}: {message}")
            }
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Handler(err) | DispatchError::Rejected(err) | DispatchError::Thunk(err) => {
                Some(err.as_ref())
            }
            _ => None,
        }
    }
}

/// Failure while handing a controller's configuration to its adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// Nothing was ever declared for the controller type.
    NotDeclared { controller: &'static str },
    /// The controller was never bound to an adapter.
    NoAdapter { controller: &'static str },
    /// A route names a handler that has no registered implementation.
    UnknownHandler {
        controller: &'static str,
        handler: String,
    },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::NotDeclared { controller } => {
                write!(f, "controller '{controller}' has no declarations")
            }
            RegistrationError::NoAdapter { controller } => {
                write!(f, "controller '{controller}' is not bound to an adapter")
            }
            RegistrationError::UnknownHandler {
                controller,
                handler,
            } => write!(
                f,
                "controller '{controller}' declares a route for unknown handler '{handler}'"
            ),
        }
    }
}

impl std::error::Error for RegistrationError {}
