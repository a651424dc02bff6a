use decorum_core::prelude::*;
use decorum_core::registry::SealOutcome;
use decorum_macros::controller;
use decorum_test::{Incoming, ResponseHandle, TestAdapter};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NewUser {
    name: String,
    age: u32,
}

struct UserController {
    greeting: String,
    lookups: AtomicUsize,
}

impl UserController {
    fn new() -> Self {
        Self {
            greeting: "hello".into(),
            lookups: AtomicUsize::new(0),
        }
    }
}

#[controller(path = "/users", middleware = ["auth", "audit"])]
impl UserController {
    #[get]
    fn list(&self, #[query] page: Option<u32>) -> Json<Value> {
        Json(json!({ "page": page.unwrap_or(0), "greeting": self.greeting }))
    }

    #[get("/whoami")]
    fn whoami(&self, #[header("x-user")] user: Option<String>, #[cookie] session: Option<String>) -> Value {
        json!({ "user": user, "session": session })
    }

    #[get("/{id}")]
    async fn show(&self, #[path_param] id: u64) -> Json<Value> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Json(json!({ "id": id }))
    }

    #[post]
    fn create(&self, #[body] user: NewUser) -> Json<NewUser> {
        Json(user)
    }

    #[post("/rename")]
    fn rename(&self, #[body("name")] name: String) -> String {
        name.to_uppercase()
    }

    #[put("/{id}")]
    fn update(&self, #[path_param] id: u64, #[body] user: NewUser) -> Result<Json<Value>, std::io::Error> {
        if id == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no user 0"));
        }
        Ok(Json(json!({ "id": id, "name": user.name })))
    }

    #[delete("/{id}")]
    fn remove(&self, #[path_param("id")] user_id: u64) -> HandlerResult {
        HandlerResult::thunk(move |done| {
            tokio::spawn(async move {
                done.succeed(Json(json!({ "removed": user_id })));
            });
        })
    }

    #[post("/raw")]
    fn raw(&self, #[request] request: Incoming, #[response] response: ResponseHandle, #[adapter] adapter: TestAdapter) {
        response.set_status(StatusCode::ACCEPTED);
        response.send(json!({
            "path": request.path(),
            "registered": adapter.registration_count(),
        }));
    }

    // Not a route: left untouched.
    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

struct HealthController;

#[controller]
impl HealthController {
    #[get("/health")]
    fn health(&self) -> &'static str {
        "ok"
    }
}

fn start() -> (TestAdapter, ControllerRegistry) {
    let adapter = TestAdapter::new();
    let registry = Bootstrapper::new(adapter.clone())
        .controller(UserController::new())
        .controller(HealthController)
        .start()
        .unwrap();
    (adapter, registry)
}

#[tokio::test]
async fn test_routes_are_registered_under_the_root() {
    let (adapter, registry) = start();
    assert_eq!(adapter.registration_count(), 2);
    assert!(registry.is_sealed::<UserController>());
    assert!(registry.is_sealed::<HealthController>());

    let routes = adapter.routes();
    for expected in [
        (HttpMethod::Get, "/users"),
        (HttpMethod::Get, "/users/whoami"),
        (HttpMethod::Get, "/users/{id}"),
        (HttpMethod::Post, "/users"),
        (HttpMethod::Post, "/users/rename"),
        (HttpMethod::Put, "/users/{id}"),
        (HttpMethod::Delete, "/users/{id}"),
        (HttpMethod::Post, "/users/raw"),
        (HttpMethod::Get, "/health"),
    ] {
        assert!(
            routes.contains(&(expected.0, expected.1.to_string())),
            "missing route {expected:?} in {routes:?}"
        );
    }
    assert_eq!(routes.len(), 9);
}

#[tokio::test]
async fn test_controller_middlewares_are_passed_to_the_adapter() {
    let (adapter, _) = start();
    assert_eq!(
        adapter.middlewares("UserController"),
        Some(vec![Middleware::named("auth"), Middleware::named("audit")])
    );
    assert_eq!(adapter.middlewares("HealthController"), Some(vec![]));
}

#[tokio::test]
async fn test_binding_names_default_to_argument_identifiers() {
    let registry = ControllerRegistry::new();
    UserController::declare(&registry);
    let bindings = registry
        .with_configuration::<UserController, _>(|config| {
            config.parameter_bindings("whoami").cloned().collect::<Vec<_>>()
        })
        .unwrap();
    assert_eq!(
        bindings,
        vec![
            ParameterBinding::header(0, "x-user"),
            ParameterBinding::cookie(1, "session"),
        ]
    );
    let remove = registry
        .with_configuration::<UserController, _>(|config| {
            config.parameter_bindings("remove").cloned().collect::<Vec<_>>()
        })
        .unwrap();
    assert_eq!(remove, vec![ParameterBinding::path(0, "id")]);
}

#[tokio::test]
async fn test_sync_handler_with_query() {
    let (adapter, _) = start();
    adapter
        .get("/users?page=3")
        .send()
        .await
        .assert_ok()
        .assert_sent()
        .assert_json_path("page", 3)
        .assert_json_path("greeting", "hello");

    adapter.get("/users").send().await.assert_json_path("page", 0);
}

#[tokio::test]
async fn test_async_handler_is_deferred() {
    let adapter = TestAdapter::new();
    let controller = std::sync::Arc::new(UserController::new());
    Bootstrapper::new(adapter.clone())
        .shared_controller(std::sync::Arc::clone(&controller))
        .start()
        .unwrap();

    adapter
        .get("/users/42")
        .send()
        .await
        .assert_sent()
        .assert_json_path("id", 42);
    assert_eq!(controller.lookups(), 1);
}

#[tokio::test]
async fn test_headers_and_cookies() {
    let (adapter, _) = start();
    adapter
        .get("/users/whoami")
        .header("x-user", "ada")
        .cookie("session", "s-1")
        .send()
        .await
        .assert_json_path("user", "ada")
        .assert_json_path("session", "s-1");

    adapter
        .get("/users/whoami")
        .send()
        .await
        .assert_json_path("user", Value::Null)
        .assert_json_path("session", Value::Null);
}

#[tokio::test]
async fn test_whole_body_and_body_field() {
    let (adapter, _) = start();
    let user = NewUser {
        name: "Ada".into(),
        age: 36,
    };
    let created: NewUser = adapter.post("/users").json(&user).send().await.json();
    assert_eq!(created, user);

    adapter
        .post("/users/rename")
        .json(&json!({ "name": "grace" }))
        .send()
        .await
        .assert_json_path("", "GRACE");
}

#[tokio::test]
async fn test_thunk_handler_completes_from_another_task() {
    let (adapter, _) = start();
    adapter
        .delete("/users/9")
        .send()
        .await
        .assert_sent()
        .assert_json_path("removed", 9);
}

#[tokio::test]
async fn test_handler_error_reaches_the_caller() {
    let (adapter, _) = start();
    let err = adapter
        .put("/users/0")
        .json(&NewUser {
            name: "x".into(),
            age: 1,
        })
        .try_send()
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Handler(_)), "got {err:?}");
    assert!(err.to_string().contains("no user 0"));
    assert!(adapter.sent().is_empty());
}

#[tokio::test]
async fn test_unconvertible_parameter_is_a_parameter_error() {
    let (adapter, _) = start();
    let err = adapter.get("/users/not-a-number").try_send().await.unwrap_err();
    assert!(
        matches!(err, DispatchError::Parameter { index: 0, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_native_injection() {
    let (adapter, _) = start();
    adapter
        .post("/users/raw")
        .send()
        .await
        .assert_status(StatusCode::ACCEPTED)
        .assert_done()
        .assert_json_path("path", "/users/raw")
        .assert_json_path("registered", 2);
    assert!(adapter.sent().is_empty());
}

#[tokio::test]
async fn test_controller_without_root() {
    let (adapter, _) = start();
    adapter
        .get("/health")
        .send()
        .await
        .assert_ok()
        .assert_json_path("", "ok");
}

#[tokio::test]
async fn test_debounced_registration_waits_for_the_timer() {
    let adapter = TestAdapter::new();
    let registry = ControllerRegistry::with_settings(RegistrationSettings::debounced());
    let registry = Bootstrapper::with_registry(std::sync::Arc::new(adapter.clone()), registry)
        .controller(HealthController)
        .start()
        .unwrap();

    assert_eq!(adapter.registration_count(), 0);
    assert!(registry.has_pending_registration::<HealthController>());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(adapter.registration_count(), 1);
    assert_eq!(registry.seal::<HealthController>(), Ok(SealOutcome::AlreadySealed));
    adapter.get("/health").send().await.assert_json_path("", "ok");
}
