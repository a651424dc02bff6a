//! The controller configuration store.
//!
//! Configurations live in a side table keyed by the controller's `TypeId`.
//! Each entry starts *open*, accumulating declarations, and is *sealed*
//! exactly once when it is handed to its adapter; from then on it is
//! shared read-only behind an `Arc`.

use crate::adapter::{Adapter, AdapterBinding};
use crate::configuration::ControllerConfiguration;
use crate::dispatch::Handler;
use crate::error::RegistrationError;
use crate::meta::{Middleware, ParameterBinding, RouteDeclaration};
use crate::scheduler::{self, RegistrationSettings};
use dashmap::DashMap;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;
use tracing::{debug, info, warn};

enum Slot<C> {
    Open(ControllerConfiguration<C>),
    Sealed(Arc<ControllerConfiguration<C>>),
}

impl<C> Slot<C> {
    fn configuration(&self) -> &ControllerConfiguration<C> {
        match self {
            Slot::Open(config) => config,
            Slot::Sealed(config) => config,
        }
    }
}

/// Result of a successful [`ControllerRegistry::seal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SealOutcome {
    /// The configuration was handed to the adapter by this call.
    Registered,
    /// An earlier call already registered it; nothing happened.
    AlreadySealed,
}

struct Inner {
    entries: DashMap<TypeId, Box<dyn Any + Send + Sync>>,
    settings: RegistrationSettings,
}

/// Shared store of every controller's configuration.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct ControllerRegistry {
    inner: Arc<Inner>,
}

impl Default for ControllerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerRegistry {
    /// A registry in [`RegistrationMode::Explicit`](crate::scheduler::RegistrationMode::Explicit).
    pub fn new() -> Self {
        Self::with_settings(RegistrationSettings::default())
    }

    pub fn with_settings(settings: RegistrationSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::new(),
                settings,
            }),
        }
    }

    pub fn settings(&self) -> RegistrationSettings {
        self.inner.settings
    }

    // ── Declarations ────────────────────────────────────────────────────

    /// Create the configuration of `C` if it does not exist yet.
    ///
    /// Never replaces or resets an existing configuration.
    pub fn ensure_configuration<C: Send + Sync + 'static>(&self) {
        self.inner
            .entries
            .entry(TypeId::of::<C>())
            .or_insert_with(|| Box::new(Slot::<C>::Open(ControllerConfiguration::new())));
    }

    /// Whether anything was ever declared for `C`.
    pub fn is_declared<C: 'static>(&self) -> bool {
        self.inner.entries.contains_key(&TypeId::of::<C>())
    }

    /// Store `binding` for the parameter at `binding.index` of `handler_name`.
    pub fn add_parameter_binding<C: Send + Sync + 'static>(
        &self,
        handler_name: &str,
        binding: ParameterBinding,
    ) {
        self.declare::<C, _>("parameter", |config| {
            debug!(
                handler = handler_name,
                index = binding.index,
                kind = ?binding.kind,
                name = binding.name.as_deref(),
                "Declared parameter binding"
            );
            config.insert_binding(handler_name, binding);
        });
    }

    pub fn add_route<C: Send + Sync + 'static>(&self, route: RouteDeclaration) {
        self.declare::<C, _>("route", |config| {
            debug!(
                method = %route.method,
                path = route.path.as_deref(),
                handler = %route.handler_name,
                "Declared route"
            );
            config.routes.push(route);
        });
    }

    pub fn add_middleware<C: Send + Sync + 'static>(&self, middleware: Middleware) {
        self.declare::<C, _>("middleware", |config| {
            debug!(middleware = %middleware.name, "Declared middleware");
            config.middlewares.push(middleware);
        });
    }

    /// Set the path joined in front of every route of `C`. A later call wins.
    pub fn set_root<C: Send + Sync + 'static>(&self, root: impl Into<String>) {
        let root = root.into();
        self.declare::<C, _>("root", |config| {
            debug!(root = %root, "Declared controller root");
            config.root = Some(root);
        });
    }

    /// Register the implementation routes refer to as `handler_name`.
    pub fn add_handler<C: Send + Sync + 'static>(&self, handler_name: &str, handler: Handler<C>) {
        self.declare::<C, _>("handler", |config| {
            debug!(handler = handler_name, "Declared handler");
            config.handlers.insert(handler_name.to_string(), handler);
        });
    }

    /// Bind `C` to `adapter`, with `instance` as the receiver of every handler.
    ///
    /// The first binding wins; later ones are logged and ignored.
    pub fn bind<C, A>(&self, adapter: Arc<A>, instance: Arc<C>)
    where
        C: Send + Sync + 'static,
        A: Adapter,
    {
        self.declare::<C, _>("adapter", |config| match config.adapter_name() {
            Some(existing) => warn!(
                existing,
                rejected = adapter.name(),
                "Controller is already bound to an adapter; keeping the first binding"
            ),
            None => {
                debug!(adapter = adapter.name(), "Bound controller to adapter");
                config.adapter = Some(AdapterBinding::new(adapter, instance));
            }
        });
    }

    fn declare<C, F>(&self, declaration: &'static str, f: F)
    where
        C: Send + Sync + 'static,
        F: FnOnce(&mut ControllerConfiguration<C>),
    {
        let controller = type_name::<C>();
        let mut entry = self
            .inner
            .entries
            .entry(TypeId::of::<C>())
            .or_insert_with(|| Box::new(Slot::<C>::Open(ControllerConfiguration::new())));
        match downcast_slot_mut::<C>(entry.value_mut()) {
            Slot::Sealed(_) => warn!(
                controller,
                declaration,
                "Controller is already registered; declaration dropped"
            ),
            Slot::Open(config) => {
                let _span = tracing::debug_span!("declare", controller).entered();
                f(config);
                if self.inner.settings.is_debounced() {
                    self.reschedule(config);
                }
            }
        }
    }

    // ── Registration ────────────────────────────────────────────────────

    /// Arm (or re-arm) the debounced registration timer of `C`.
    ///
    /// Returns whether a timer is now pending. Explicit mode never arms one,
    /// and neither does a controller that is sealed or not yet bound.
    pub fn schedule_registration<C: Send + Sync + 'static>(&self) -> bool {
        if !self.inner.settings.is_debounced() {
            return false;
        }
        let Some(mut entry) = self.inner.entries.get_mut(&TypeId::of::<C>()) else {
            return false;
        };
        match downcast_slot_mut::<C>(entry.value_mut()) {
            Slot::Open(config) => self.reschedule(config),
            Slot::Sealed(_) => false,
        }
    }

    fn reschedule<C: Send + Sync + 'static>(&self, config: &mut ControllerConfiguration<C>) -> bool {
        if !config.has_adapter() {
            return false;
        }
        if let Some(pending) = config.pending.take() {
            pending.cancel();
        }
        config.pending = scheduler::arm::<C>(self, self.inner.settings.delay);
        config.pending.is_some()
    }

    pub fn has_pending_registration<C: Send + Sync + 'static>(&self) -> bool {
        self.with_configuration::<C, _>(ControllerConfiguration::has_pending_registration)
            .unwrap_or(false)
    }

    /// Freeze the configuration of `C` and hand it to its adapter.
    ///
    /// Idempotent: the adapter sees each controller once. Cancels any
    /// pending debounced timer. On error the configuration stays open.
    pub fn seal<C: Send + Sync + 'static>(&self) -> Result<SealOutcome, RegistrationError> {
        let controller = type_name::<C>();
        let (binding, frozen) = {
            let mut entry = self
                .inner
                .entries
                .get_mut(&TypeId::of::<C>())
                .ok_or(RegistrationError::NotDeclared { controller })?;
            let slot = downcast_slot_mut::<C>(entry.value_mut());
            let config = match &mut *slot {
                Slot::Sealed(_) => return Ok(SealOutcome::AlreadySealed),
                Slot::Open(config) => config,
            };
            let binding = config
                .adapter
                .clone()
                .ok_or(RegistrationError::NoAdapter { controller })?;
            if let Some(handler) = config.unknown_handler() {
                return Err(RegistrationError::UnknownHandler {
                    controller,
                    handler: handler.to_string(),
                });
            }
            if let Some(pending) = config.pending.take() {
                pending.cancel();
            }
            let frozen = Arc::new(std::mem::replace(config, ControllerConfiguration::new()));
            *slot = Slot::Sealed(Arc::clone(&frozen));
            (binding, frozen)
        };

        // The store lock is released: the adapter may read the registry.
        info!(
            controller,
            adapter = binding.adapter_name(),
            routes = frozen.routes().len(),
            "Sealed controller configuration"
        );
        binding.register(frozen);
        Ok(SealOutcome::Registered)
    }

    pub fn is_sealed<C: 'static>(&self) -> bool {
        self.inner
            .entries
            .get(&TypeId::of::<C>())
            .is_some_and(|entry| matches!(entry.value().downcast_ref::<Slot<C>>(), Some(Slot::Sealed(_))))
    }

    /// The frozen configuration of `C`, once sealed.
    pub fn configuration<C: Send + Sync + 'static>(&self) -> Option<Arc<ControllerConfiguration<C>>> {
        let entry = self.inner.entries.get(&TypeId::of::<C>())?;
        match downcast_slot_ref::<C>(entry.value()) {
            Slot::Sealed(config) => Some(Arc::clone(config)),
            Slot::Open(_) => None,
        }
    }

    /// Read the configuration of `C`, open or sealed.
    ///
    /// `f` runs under the store lock and must not declare on this registry.
    pub fn with_configuration<C, R>(&self, f: impl FnOnce(&ControllerConfiguration<C>) -> R) -> Option<R>
    where
        C: Send + Sync + 'static,
    {
        let entry = self.inner.entries.get(&TypeId::of::<C>())?;
        Some(f(downcast_slot_ref::<C>(entry.value()).configuration()))
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.inner.entries.len())
            .field("settings", &self.inner.settings)
            .finish()
    }
}

fn downcast_slot_mut<C: 'static>(boxed: &mut Box<dyn Any + Send + Sync>) -> &mut Slot<C> {
    boxed
        .downcast_mut::<Slot<C>>()
        .expect("ControllerRegistry: type mismatch (should be impossible)")
}

// Takes the `Box` itself: a `&Box<dyn Any>` coerced to `&dyn Any` would describe the box.
fn downcast_slot_ref<C: 'static>(boxed: &Box<dyn Any + Send + Sync>) -> &Slot<C> {
    boxed
        .downcast_ref::<Slot<C>>()
        .expect("ControllerRegistry: type mismatch (should be impossible)")
}
