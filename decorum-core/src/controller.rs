use crate::registry::ControllerRegistry;

/// A type whose routes, parameter bindings and handlers are declared
/// on a [`ControllerRegistry`].
///
/// Usually generated by `#[controller]`:
///
/// ```ignore
/// #[controller(path = "/users")]
/// impl UserController {
///     #[get("/{id}")]
///     async fn get_user(&self, #[path_param("id")] id: u64) -> Json<User> {
///         Json(self.repo.find(id).await)
///     }
/// }
/// ```
pub trait Controller: Send + Sync + Sized + 'static {
    /// Record every declaration of this controller on `registry`.
    ///
    /// Declarations append, so this runs once per registry.
    fn declare(registry: &ControllerRegistry);

    /// Name used in diagnostics.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}
