//! Procedural macros for Decorum.
//!
//! `#[controller]` turns an inherent impl block into a controller: every
//! method carrying a route attribute becomes a handler, its arguments become
//! parameter bindings, and a `Controller::declare` implementation records all
//! of it on a `ControllerRegistry`.

extern crate proc_macro;
use proc_macro::TokenStream;

pub(crate) mod codegen;
pub(crate) mod controller_attr;
pub(crate) mod crate_path;
pub(crate) mod extract;
pub(crate) mod routes_parsing;
pub(crate) mod types;

/// Declare a controller from an impl block.
///
/// # Arguments
///
/// | Parameter    | Required | Description |
/// |--------------|----------|-------------|
/// | `path`       | no       | Root joined in front of every route path |
/// | `middleware` | no       | A name or a list of names handed to the adapter |
///
/// # Handler arguments
///
/// Every argument after `&self` needs exactly one extraction attribute:
///
/// | Attribute | Source |
/// |-----------|--------|
/// | `#[path_param]` / `#[path_param("id")]` | a path segment |
/// | `#[query]` / `#[query("page")]` | a query-string value |
/// | `#[body]` / `#[body("field")]` | the request body, or one field of it |
/// | `#[header("x-request-id")]` | a request header |
/// | `#[cookie("session")]` | a cookie |
/// | `#[adapter]` | the adapter itself (native) |
/// | `#[request]` | the adapter's request object (native) |
/// | `#[response]` | the adapter's response object (native) |
///
/// Named kinds default to the argument's identifier. Value kinds are
/// deserialized with `serde`; an absent value deserializes from `null`, so use
/// `Option<T>` for optional ones.
///
/// # Return values
///
/// Synchronous handlers return anything implementing `IntoHandlerResult`
/// (`Json<T>`, `serde_json::Value`, `String`, `HandlerResult`, `()`, or a
/// `Result` of those). Async handlers become deferred results; their output
/// must implement `IntoValue`.
///
/// # Example
///
/// ```ignore
/// use decorum::prelude::*;
///
/// pub struct UserController {
///     repo: UserRepo,
/// }
///
/// #[controller(path = "/users")]
/// #[middleware("auth")]
/// impl UserController {
///     #[get]
///     fn list(&self, #[query] page: Option<u32>) -> Json<Vec<User>> {
///         Json(self.repo.page(page.unwrap_or(0)))
///     }
///
///     #[get("/{id}")]
///     async fn show(&self, #[path_param] id: u64) -> Result<Json<User>, RepoError> {
///         Ok(Json(self.repo.find(id).await?))
///     }
///
///     #[post]
///     fn create(&self, #[body] user: NewUser) -> HandlerResult {
///         let repo = self.repo.clone();
///         HandlerResult::thunk(move |done| repo.insert_with_callback(user, |res| done.complete(res)))
///     }
/// }
/// ```
///
/// `#[middleware]` must come after `#[controller]`; attributes above it are
/// expanded first and never reach it.
#[proc_macro_attribute]
pub fn controller(args: TokenStream, input: TokenStream) -> TokenStream {
    controller_attr::expand(args, input)
}

// ---------------------------------------------------------------------------
// No-op attributes, consumed by #[controller] from the token stream.
// Declared here for IDE support (rust-analyzer), cargo doc, and to prevent
// "cannot find attribute" errors when used outside #[controller].
// ---------------------------------------------------------------------------

/// Register a **GET** route handler.
///
/// ```ignore
/// #[get]                 // the controller root
/// #[get("/users/{id}")]  // joined to the controller root
/// ```
///
/// This attribute is consumed by [`controller`]; it is a no-op on its own.
#[proc_macro_attribute]
pub fn get(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register a **POST** route handler. See [`get`].
#[proc_macro_attribute]
pub fn post(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register a **PUT** route handler. See [`get`].
#[proc_macro_attribute]
pub fn put(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register a **PATCH** route handler. See [`get`].
#[proc_macro_attribute]
pub fn patch(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register a **DELETE** route handler. See [`get`].
#[proc_macro_attribute]
pub fn delete(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register a **HEAD** route handler. See [`get`].
#[proc_macro_attribute]
pub fn head(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Register an **OPTIONS** route handler. See [`get`].
#[proc_macro_attribute]
pub fn options(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Attach adapter-resolved middleware to every route of a controller.
///
/// ```ignore
/// #[controller(path = "/admin")]
/// #[middleware("auth", "audit")]
/// impl AdminController { ... }
/// ```
///
/// This attribute is consumed by [`controller`]; it is a no-op on its own.
#[proc_macro_attribute]
pub fn middleware(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}
