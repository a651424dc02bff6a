//! Decorum core prelude.
//!
//! ```ignore
//! use decorum_core::prelude::*;
//!
//! struct Health;
//!
//! impl Controller for Health {
//!     fn declare(registry: &ControllerRegistry) {
//!         registry.set_root::<Self>("/health");
//!         registry.add_handler::<Self>("status", Handler::new(|_, _| HandlerResult::immediate("UP")));
//!         route(HttpMethod::Get).root().handler::<Self>(registry, "status");
//!     }
//! }
//! ```

pub use crate::adapter::{Adapter, BoundRoute, ControllerRoutes, Endpoint};
pub use crate::bootstrap::Bootstrapper;
pub use crate::config::DecorumConfig;
pub use crate::controller::Controller;
pub use crate::declare::route;
pub use crate::dispatch::{
    Completion, DispatchOutcome, Handler, HandlerResult, Json, Parameter, ParameterList,
};
pub use crate::error::{BoxError, DispatchError, RegistrationError};
pub use crate::meta::{HttpMethod, Middleware, ParameterBinding, ParameterType};
pub use crate::registry::ControllerRegistry;
pub use crate::scheduler::{RegistrationMode, RegistrationSettings};
pub use serde_json::{json, Value};
