//! Shared fixtures for the server integration tests.

#![allow(dead_code)]

use axum::{
    body::{Body, BodyDataStream},
    extract::ConnectInfo,
    http::Request,
    Router,
};
use futures_util::StreamExt;
use gatewire_acl::AccessControlList;
use gatewire_observe::BroadcastConfig;
use gatewire_server::{app, AppState};
use std::net::SocketAddr;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const ACL_JSON: &str = r#"{
    "logger": ["/main.Admin/Logging"],
    "stat": ["/main.Admin/Statistics"],
    "biz_user": ["/main.Biz/Check", "/main.Biz/Add"],
    "biz_admin": ["/main.Biz/*"]
}"#;

pub const PEER: ([u8; 4], u16) = ([127, 0, 0, 1], 54321);

pub fn make_state() -> AppState {
    let acl = AccessControlList::from_json(ACL_JSON).expect("test ACL should parse");
    AppState::new(acl, BroadcastConfig::default(), CancellationToken::new())
}

pub fn make_app(state: &AppState) -> Router {
    app(state.clone())
}

/// Builds an RPC call the way a client would send it.
pub fn rpc(method: &str, consumer: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(method)
        .header("content-type", "application/json");
    if let Some(consumer) = consumer {
        builder = builder.header("consumer", consumer);
    }
    let mut req = builder.body(Body::from(body.to_string())).unwrap();
    req.extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(PEER)));
    req
}

/// Reads the next SSE event from a streaming response and parses its data
/// line as JSON.
pub async fn next_sse_json(stream: &mut BodyDataStream) -> serde_json::Value {
    loop {
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for an SSE event")
            .expect("SSE stream ended unexpectedly")
            .expect("SSE body error");
        let text = std::str::from_utf8(&chunk).expect("SSE frames are UTF-8");
        // Keep-alive frames carry only a comment line.
        if let Some(data) = text.lines().find_map(|line| line.strip_prefix("data:")) {
            return serde_json::from_str(data.trim_start()).expect("SSE data should be JSON");
        }
    }
}

/// Polls until the registry reports `expected` active slots.
pub async fn wait_for_active(state: &AppState, expected: usize) {
    for _ in 0..200 {
        if state.broadcaster.registry().active_count().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "expected {expected} active subscribers, found {}",
        state.broadcaster.registry().active_count().await
    );
}
