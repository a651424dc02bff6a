pub mod adapter;
pub mod bootstrap;
pub mod config;
pub mod configuration;
pub mod controller;
pub mod declare;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod meta;
pub mod prelude;
pub mod registry;
pub mod scheduler;

pub use adapter::{create_path_with_root, Adapter, BoundRoute, ControllerRoutes, Endpoint};
pub use bootstrap::Bootstrapper;
pub use config::{ConfigError, ConfigValue, DecorumConfig, FromConfigValue};
pub use configuration::ControllerConfiguration;
pub use controller::Controller;
pub use declare::{route, route_decorator_factory, RouteBuilder, RouteDecorator};
pub use dispatch::{
    build_parameter_list, invoke_and_respond, BoxFuture, Completion, DispatchOutcome, Handler,
    HandlerResult, IntoHandlerResult, IntoValue, Json, Parameter, ParameterList,
};
pub use error::{BoxError, DispatchError, RegistrationError};
pub use logging::{init_tracing, init_tracing_with, TracingSettings};
pub use meta::{HttpMethod, Middleware, ParameterBinding, ParameterType, RouteDeclaration};
pub use registry::{ControllerRegistry, SealOutcome};
pub use scheduler::{PendingRegistration, RegistrationMode, RegistrationSettings};

pub use serde_json;
