//! Builders for route declarations.
//!
//! ```ignore
//! route(HttpMethod::Get).path("/users/{id}").handler::<UserController>(&registry, "get_user");
//! get().handler::<UserController>(&registry, "list");
//! ```

use crate::meta::{HttpMethod, RouteDeclaration};
use crate::registry::ControllerRegistry;

/// First step: the verb is chosen, the path is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteBuilder {
    method: HttpMethod,
}

impl RouteBuilder {
    pub fn new(method: HttpMethod) -> Self {
        Self { method }
    }

    pub fn path(self, path: impl Into<String>) -> RouteDecorator {
        RouteDecorator {
            method: self.method,
            path: Some(path.into()),
        }
    }

    /// A route at the controller root itself.
    pub fn root(self) -> RouteDecorator {
        RouteDecorator {
            method: self.method,
            path: None,
        }
    }

    /// Shorthand for `.root().handler(..)`.
    pub fn handler<C: Send + Sync + 'static>(self, registry: &ControllerRegistry, handler_name: &str) {
        self.root().handler::<C>(registry, handler_name)
    }
}

/// Final step: verb and path are known, applying it records the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecorator {
    method: HttpMethod,
    path: Option<String>,
}

impl RouteDecorator {
    /// The declaration this decorator produces for `handler_name`.
    pub fn declaration(&self, handler_name: &str) -> RouteDeclaration {
        RouteDeclaration {
            method: self.method,
            path: self.path.clone(),
            handler_name: handler_name.to_string(),
        }
    }

    /// Append the route to the configuration of `C`.
    pub fn handler<C: Send + Sync + 'static>(&self, registry: &ControllerRegistry, handler_name: &str) {
        registry.add_route::<C>(self.declaration(handler_name));
    }
}

/// Start declaring a route for `method`.
pub fn route(method: HttpMethod) -> RouteBuilder {
    RouteBuilder::new(method)
}

/// Returns a function that turns a path into a [`RouteDecorator`] for `method`.
pub fn route_decorator_factory(method: HttpMethod) -> impl Fn(Option<&str>) -> RouteDecorator {
    move |path| RouteDecorator {
        method,
        path: path.map(str::to_string),
    }
}

macro_rules! verb_builders {
    ($($(#[$doc:meta])* $name:ident => $method:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name() -> RouteBuilder {
                RouteBuilder::new(HttpMethod::$method)
            }
        )+
    };
}

verb_builders! {
    get => Get,
    post => Post,
    put => Put,
    patch => Patch,
    delete => Delete,
    head => Head,
    options => Options,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decorator_records_verb_path_and_handler() {
        let declaration = route(HttpMethod::Get).path("/path").declaration("path");
        assert_eq!(
            declaration,
            RouteDeclaration {
                method: HttpMethod::Get,
                path: Some("/path".into()),
                handler_name: "path".into(),
            }
        );
    }

    #[test]
    fn factory_builds_the_same_decorator_as_the_builder() {
        let factory = route_decorator_factory(HttpMethod::Post);
        assert_eq!(factory(Some("/x")), post().path("/x"));
        assert_eq!(factory(None), post().root());
    }
}
