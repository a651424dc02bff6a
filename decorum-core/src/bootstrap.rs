use crate::adapter::Adapter;
use crate::config::{ConfigError, DecorumConfig};
use crate::controller::Controller;
use crate::error::RegistrationError;
use crate::registry::ControllerRegistry;
use crate::scheduler::RegistrationSettings;
use std::sync::Arc;
use tracing::{debug, info};

type ControllerStart<A> =
    Box<dyn FnOnce(&ControllerRegistry, &Arc<A>) -> Result<(), RegistrationError> + Send>;

/// Wires controllers to an adapter.
///
/// ```ignore
/// Bootstrapper::new(HyperAdapter::new())
///     .controller(UserController::new(repo))
///     .controller(HealthController)
///     .start()?;
/// ```
pub struct Bootstrapper<A: Adapter> {
    adapter: Arc<A>,
    registry: ControllerRegistry,
    controllers: Vec<(&'static str, ControllerStart<A>)>,
}

impl<A: Adapter> Bootstrapper<A> {
    /// A bootstrapper with a fresh registry in explicit mode.
    pub fn new(adapter: A) -> Self {
        Self::with_registry(Arc::new(adapter), ControllerRegistry::new())
    }

    pub fn with_registry(adapter: Arc<A>, registry: ControllerRegistry) -> Self {
        Self {
            adapter,
            registry,
            controllers: Vec::new(),
        }
    }

    /// A bootstrapper whose registration mode comes from `decorum.registration.*`.
    pub fn from_config(adapter: A, config: &DecorumConfig) -> Result<Self, ConfigError> {
        let settings = RegistrationSettings::from_config(config)?;
        Ok(Self::with_registry(
            Arc::new(adapter),
            ControllerRegistry::with_settings(settings),
        ))
    }

    /// Add a controller instance.
    pub fn controller<C: Controller>(self, instance: C) -> Self {
        self.shared_controller(Arc::new(instance))
    }

    /// Add a controller instance that is shared with other parts of the application.
    pub fn shared_controller<C: Controller>(mut self, instance: Arc<C>) -> Self {
        self.controllers.push((
            C::name(),
            Box::new(move |registry: &ControllerRegistry, adapter: &Arc<A>| {
                // Unbound declarations never arm the debounce timer; binding
                // last arms it once, after every declaration is in.
                C::declare(registry);
                registry.bind::<C, A>(Arc::clone(adapter), instance);
                start_registration::<C>(registry)
            }),
        ));
        self
    }

    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    pub fn adapter(&self) -> &Arc<A> {
        &self.adapter
    }

    /// Declare every controller and register it with the adapter.
    ///
    /// In debounced mode registration happens on a later timer turn; the
    /// returned registry can be used to wait for or force it.
    pub fn start(self) -> Result<ControllerRegistry, RegistrationError> {
        info!(
            adapter = self.adapter.name(),
            controllers = self.controllers.len(),
            mode = ?self.registry.settings().mode,
            "Starting controllers"
        );
        for (name, start) in self.controllers {
            debug!(controller = name, "Declaring controller");
            start(&self.registry, &self.adapter)?;
        }
        Ok(self.registry)
    }
}

fn start_registration<C: Controller>(registry: &ControllerRegistry) -> Result<(), RegistrationError> {
    // A debounced registry outside a runtime has no timer to rely on.
    if registry.settings().is_debounced() && registry.has_pending_registration::<C>() {
        return Ok(());
    }
    registry.seal::<C>().map(|_| ())
}
