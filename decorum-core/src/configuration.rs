//! The per-controller configuration record.

use crate::adapter::AdapterBinding;
use crate::dispatch::Handler;
use crate::meta::{Middleware, ParameterBinding, RouteDeclaration};
use crate::scheduler::PendingRegistration;
use std::collections::HashMap;

/// Everything declared for one controller type `C`.
///
/// Accumulates monotonically while the controller is open, and is frozen
/// behind an `Arc` once registration consumes it.
pub struct ControllerConfiguration<C> {
    controller: &'static str,
    pub(crate) routes: Vec<RouteDeclaration>,
    pub(crate) middlewares: Vec<Middleware>,
    /// Handler name → bindings addressed by parameter index (sparse).
    pub(crate) methods_parameters: HashMap<String, Vec<Option<ParameterBinding>>>,
    pub(crate) root: Option<String>,
    pub(crate) handlers: HashMap<String, Handler<C>>,
    pub(crate) adapter: Option<AdapterBinding<C>>,
    pub(crate) pending: Option<PendingRegistration>,
}

impl<C: 'static> ControllerConfiguration<C> {
    pub(crate) fn new() -> Self {
        Self {
            controller: std::any::type_name::<C>(),
            routes: Vec::new(),
            middlewares: Vec::new(),
            methods_parameters: HashMap::new(),
            root: None,
            handlers: HashMap::new(),
            adapter: None,
            pending: None,
        }
    }
}

impl<C> ControllerConfiguration<C> {
    /// Type name of the controller this configuration belongs to.
    pub fn controller_name(&self) -> &'static str {
        self.controller
    }

    /// Declared routes, in declaration order.
    pub fn routes(&self) -> &[RouteDeclaration] {
        &self.routes
    }

    pub fn middlewares(&self) -> &[Middleware] {
        &self.middlewares
    }

    /// Root path joined in front of every route path.
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Raw binding slots of `handler_name`, indexed by parameter position.
    pub fn binding_slots(&self, handler_name: &str) -> Option<&[Option<ParameterBinding>]> {
        self.methods_parameters
            .get(handler_name)
            .map(Vec::as_slice)
    }

    /// Bound parameters of `handler_name`, ordered by index.
    pub fn parameter_bindings<'a>(
        &'a self,
        handler_name: &str,
    ) -> impl Iterator<Item = &'a ParameterBinding> + 'a {
        self.methods_parameters
            .get(handler_name)
            .into_iter()
            .flatten()
            .flatten()
    }

    pub fn handler(&self, handler_name: &str) -> Option<&Handler<C>> {
        self.handlers.get(handler_name)
    }

    /// Name of the bound adapter, if any.
    pub fn adapter_name(&self) -> Option<&'static str> {
        self.adapter.as_ref().map(AdapterBinding::adapter_name)
    }

    pub fn has_adapter(&self) -> bool {
        self.adapter.is_some()
    }

    /// Whether a debounced registration timer is currently armed.
    pub fn has_pending_registration(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn insert_binding(&mut self, handler_name: &str, binding: ParameterBinding) {
        let slots = self
            .methods_parameters
            .entry(handler_name.to_string())
            .or_default();
        if slots.len() <= binding.index {
            slots.resize(binding.index + 1, None);
        }
        let index = binding.index;
        slots[index] = Some(binding);
    }

    /// First route whose handler has no implementation.
    pub(crate) fn unknown_handler(&self) -> Option<&str> {
        self.routes
            .iter()
            .map(|route| route.handler_name.as_str())
            .find(|name| !self.handlers.contains_key(*name))
    }
}

impl<C> std::fmt::Debug for ControllerConfiguration<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerConfiguration")
            .field("controller", &self.controller)
            .field("routes", &self.routes)
            .field("middlewares", &self.middlewares)
            .field("methods_parameters", &self.methods_parameters)
            .field("root", &self.root)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("adapter", &self.adapter_name())
            .field("pending", &self.pending.is_some())
            .finish()
    }
}
