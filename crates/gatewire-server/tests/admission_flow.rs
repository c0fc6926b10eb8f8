//! Integration tests for admission control on unary calls.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{make_app, make_state, rpc};
use serde_json::Value;
use tower::ServiceExt; // for oneshot

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn allowed_call_reaches_handler() {
    let state = make_state();
    let app = make_app(&state);

    let response = app
        .oneshot(rpc("/main.Biz/Check", Some("biz_user"), r#"{"dummy":true}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["dummy"], true);
}

#[tokio::test]
async fn wildcard_rule_admits_every_biz_method() {
    let state = make_state();
    let app = make_app(&state);

    for method in ["/main.Biz/Check", "/main.Biz/Add", "/main.Biz/Test"] {
        let response = app
            .clone()
            .oneshot(rpc(method, Some("biz_admin"), "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{method} should be allowed");
    }
}

#[tokio::test]
async fn missing_consumer_header_is_unauthenticated() {
    let state = make_state();
    let app = make_app(&state);

    let response = app
        .oneshot(rpc("/main.Biz/Check", None, "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = json_body(response).await;
    assert!(json["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn unknown_consumer_is_unauthenticated_for_every_method() {
    let state = make_state();
    let app = make_app(&state);

    for method in [
        "/main.Biz/Check",
        "/main.Biz/Add",
        "/main.Biz/Test",
        "/main.Admin/Logging",
    ] {
        let response = app
            .clone()
            .oneshot(rpc(method, Some("unknown"), "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().contains("consumer not found"));
    }
}

#[tokio::test]
async fn method_outside_rules_is_unauthenticated() {
    let state = make_state();
    let app = make_app(&state);

    let denied = [
        ("biz_user", "/main.Biz/Test"),
        ("biz_user", "/main.Admin/Logging"),
        ("biz_admin", "/main.Admin/Statistics"),
        ("logger", "/main.Biz/Check"),
    ];
    for (consumer, method) in denied {
        let response = app
            .clone()
            .oneshot(rpc(method, Some(consumer), r#"{"interval_seconds":1}"#))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{consumer} must not call {method}"
        );
    }
}

#[tokio::test]
async fn denial_does_not_publish_an_event() {
    let state = make_state();
    let app = make_app(&state);
    let mut subscription = state.broadcaster.subscribe().await;

    let response = app
        .clone()
        .oneshot(rpc("/main.Biz/Test", Some("biz_user"), "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(rpc("/main.Biz/Add", Some("biz_user"), "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let event = subscription.recv().await.expect("admitted call publishes");
    assert_eq!(event.method, "/main.Biz/Add");
    assert_eq!(event.consumer, "biz_user");
    assert_eq!(event.host, "127.0.0.1:54321");
    subscription.release().await;
}

#[tokio::test]
async fn health_is_not_intercepted() {
    let state = make_state();
    let app = make_app(&state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
}
