mod common;

use common::{FakeRequest, RecordingAdapter};
use decorum_core::declare::{get, post};
use decorum_core::dispatch::{DispatchOutcome, Handler, HandlerResult, Json, ParameterList};
use decorum_core::error::{BoxError, DispatchError};
use decorum_core::meta::{HttpMethod, ParameterBinding, ParameterType};
use decorum_core::registry::ControllerRegistry;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Shapes {
    calls: AtomicUsize,
}

fn sealed<C: Send + Sync + 'static>(
    instance: C,
    declare: impl FnOnce(&ControllerRegistry),
) -> RecordingAdapter {
    let registry = ControllerRegistry::new();
    let adapter = Arc::new(RecordingAdapter::new());
    registry.bind(Arc::clone(&adapter), Arc::new(instance));
    declare(&registry);
    registry.seal::<C>().unwrap();
    adapter.as_ref().clone()
}

#[tokio::test]
async fn test_each_result_shape_sends_exactly_once() {
    let adapter = sealed(Shapes::default(), |registry| {
        registry.add_handler::<Shapes>(
            "immediate",
            Handler::new(|this: &Arc<Shapes>, _| {
                this.calls.fetch_add(1, Ordering::SeqCst);
                HandlerResult::immediate(1)
            }),
        );
        registry.add_handler::<Shapes>(
            "deferred",
            Handler::new(|_, _| {
                HandlerResult::deferred(async {
                    tokio::task::yield_now().await;
                    Json(vec![2, 2])
                })
            }),
        );
        registry.add_handler::<Shapes>(
            "thunk",
            Handler::new(|_, _| {
                HandlerResult::thunk(|done| {
                    tokio::spawn(async move { done.succeed("three") });
                })
            }),
        );
        get().path("/immediate").handler::<Shapes>(registry, "immediate");
        get().path("/deferred").handler::<Shapes>(registry, "deferred");
        get().path("/thunk").handler::<Shapes>(registry, "thunk");
    });

    for (i, path) in ["/immediate", "/deferred", "/thunk"].into_iter().enumerate() {
        let outcome = adapter
            .dispatch(HttpMethod::Get, path, FakeRequest::new(i as u32))
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Sent);
    }

    assert_eq!(
        adapter.sent(),
        vec![(json!(1), 0), (json!([2, 2]), 1), (json!("three"), 2)]
    );
}

#[tokio::test]
async fn test_absent_result_sends_nothing() {
    struct Silent;
    let adapter = sealed(Silent, |registry| {
        registry.add_handler::<Silent>("quiet", Handler::new(|_, _| ()));
        registry.add_handler::<Silent>("none", Handler::new(|_, _| None::<HandlerResult>));
        post().path("/quiet").handler::<Silent>(registry, "quiet");
        post().path("/none").handler::<Silent>(registry, "none");
    });

    for path in ["/quiet", "/none"] {
        let outcome = adapter
            .dispatch(HttpMethod::Post, path, FakeRequest::new(0))
            .await
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Done);
    }
    assert!(adapter.sent().is_empty());
}

#[tokio::test]
async fn test_parameters_are_ordered_by_index_not_declaration() {
    struct Echo;
    let adapter = sealed(Echo, |registry| {
        // Declared in reverse on purpose, with a gap at index 1.
        registry.add_parameter_binding::<Echo>("echo", ParameterBinding::body_field(3, "name"));
        registry.add_parameter_binding::<Echo>("echo", ParameterBinding::query(2, "page"));
        registry.add_parameter_binding::<Echo>("echo", ParameterBinding::path(0, "id"));
        registry.add_handler::<Echo>(
            "echo",
            Handler::new(|_, mut params: ParameterList| -> Result<HandlerResult, BoxError> {
                assert_eq!(params.len(), 4);
                assert!(!params.is_bound(1));
                let id: u64 = params.take_value(0)?;
                let gap: Option<String> = params.take_value(1)?;
                let page: String = params.take_value(2)?;
                let name: String = params.take_value(3)?;
                Ok(HandlerResult::immediate(json!([id, gap, page, name])))
            }),
        );
        get().path("/echo/{id}").handler::<Echo>(registry, "echo");
    });

    let request = FakeRequest::new(7)
        .with(ParameterType::Path, "id", json!(42))
        .with(ParameterType::Query, "page", json!("2"))
        .with_body(json!({"name": "ada"}));
    adapter
        .dispatch(HttpMethod::Get, "/echo/{id}", request)
        .await
        .unwrap();

    assert_eq!(adapter.sent(), vec![(json!([42, null, "2", "ada"]), 7)]);
}

#[tokio::test]
async fn test_native_parameters_reach_the_handler() {
    struct Native;
    let adapter = sealed(Native, |registry| {
        registry.add_parameter_binding::<Native>("who", ParameterBinding::request(0));
        registry.add_parameter_binding::<Native>("who", ParameterBinding::adapter(1));
        registry.add_handler::<Native>(
            "who",
            Handler::new(|_, mut params: ParameterList| -> Result<HandlerResult, BoxError> {
                let request_id: u32 = params.take_native(0)?;
                let adapter: RecordingAdapter = params.take_native(1)?;
                Ok(HandlerResult::immediate(json!({
                    "request": request_id,
                    "registered": adapter.registration_count(),
                })))
            }),
        );
        get().path("/who").handler::<Native>(registry, "who");
    });

    adapter
        .dispatch(HttpMethod::Get, "/who", FakeRequest::new(5))
        .await
        .unwrap();
    assert_eq!(adapter.sent(), vec![(json!({"request": 5, "registered": 1}), 5)]);
}

#[tokio::test]
async fn test_conversion_failure_is_a_parameter_error() {
    struct Strict;
    let adapter = sealed(Strict, |registry| {
        registry.add_parameter_binding::<Strict>("h", ParameterBinding::query(0, "n"));
        registry.add_handler::<Strict>(
            "h",
            Handler::new(|_, mut params: ParameterList| -> Result<HandlerResult, BoxError> {
                let n: u32 = params.take_value(0)?;
                Ok(HandlerResult::immediate(n))
            }),
        );
        get().handler::<Strict>(registry, "h");
    });

    let request = FakeRequest::new(0).with(ParameterType::Query, "n", json!("not a number"));
    let err = adapter.dispatch(HttpMethod::Get, "/", request).await.unwrap_err();
    assert!(matches!(err, DispatchError::Parameter { index: 0, .. }), "{err}");
    assert!(adapter.sent().is_empty());
}

#[tokio::test]
async fn test_synchronous_handler_error_propagates() {
    struct Failing;
    let adapter = sealed(Failing, |registry| {
        registry.add_handler::<Failing>(
            "boom",
            Handler::new(|_, _| Err::<HandlerResult, _>(BoxError::from("boom"))),
        );
        get().handler::<Failing>(registry, "boom");
    });

    let err = adapter
        .dispatch(HttpMethod::Get, "/", FakeRequest::new(0))
        .await
        .unwrap_err();
    match err {
        DispatchError::Handler(inner) => assert_eq!(inner.to_string(), "boom"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(adapter.sent().is_empty());
}

#[tokio::test]
async fn test_deferred_rejection_propagates() {
    struct Rejecting;
    let adapter = sealed(Rejecting, |registry| {
        registry.add_handler::<Rejecting>(
            "later",
            Handler::new(|_, _| {
                HandlerResult::deferred(async { Err::<Value, BoxError>("rejected".into()) })
            }),
        );
        get().handler::<Rejecting>(registry, "later");
    });

    let err = adapter
        .dispatch(HttpMethod::Get, "/", FakeRequest::new(0))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Rejected(ref e) if e.to_string() == "rejected"));
    assert!(adapter.sent().is_empty());
}

#[tokio::test]
async fn test_thunk_error_is_surfaced() {
    struct Callback;
    let adapter = sealed(Callback, |registry| {
        registry.add_handler::<Callback>(
            "cb",
            Handler::new(|_, _| {
                HandlerResult::thunk(|done| done.call(Some("disk on fire".into()), Value::Null))
            }),
        );
        get().handler::<Callback>(registry, "cb");
    });

    let err = adapter
        .dispatch(HttpMethod::Get, "/", FakeRequest::new(0))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Thunk(ref e) if e.to_string() == "disk on fire"));
    assert!(adapter.sent().is_empty());
}

#[tokio::test]
async fn test_dropped_completion_is_reported() {
    struct Forgetful;
    let adapter = sealed(Forgetful, |registry| {
        registry.add_handler::<Forgetful>(
            "forget",
            Handler::new(|_, _| HandlerResult::thunk(drop)),
        );
        get().handler::<Forgetful>(registry, "forget");
    });

    let err = adapter
        .dispatch(HttpMethod::Get, "/", FakeRequest::new(0))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::ThunkAbandoned { ref handler } if handler == "forget"));
}

#[tokio::test]
async fn test_node_style_completion_prefers_value_without_error() {
    struct Callback;
    let adapter = sealed(Callback, |registry| {
        registry.add_handler::<Callback>(
            "cb",
            Handler::new(|_, _| HandlerResult::thunk(|done| done.call(None, json!({"ok": true})))),
        );
        get().handler::<Callback>(registry, "cb");
    });

    adapter
        .dispatch(HttpMethod::Get, "/", FakeRequest::new(9))
        .await
        .unwrap();
    assert_eq!(adapter.sent(), vec![(json!({"ok": true}), 9)]);
}
