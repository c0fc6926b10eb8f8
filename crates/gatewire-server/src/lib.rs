//! gatewire server library logic.
//!
//! Wires the admission interceptor, the event broadcaster, and the `Biz` /
//! `Admin` handlers into one axum router. Every RPC route sits behind
//! [`middleware::admission_middleware`]; `/health` does not.

pub mod admission;
pub mod api;
pub mod api_admin;
pub mod config;
pub mod middleware;

use admission::Interceptor;
use axum::{extract::Extension, routing::get, routing::post, Json, Router};
use gatewire_acl::AccessControlList;
use gatewire_observe::{BroadcastConfig, Broadcaster};
use gatewire_types::methods;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// ACL check + event publication for every call.
    pub interceptor: Interceptor,
    /// Fan-out to the log and statistics streams.
    pub broadcaster: Broadcaster,
    /// Cancelled when the service shuts down; ends every open stream.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(acl: AccessControlList, broadcast: BroadcastConfig, shutdown: CancellationToken) -> Self {
        let broadcaster = Broadcaster::new(broadcast);
        Self {
            interceptor: Interceptor::new(Arc::new(acl), broadcaster.clone()),
            broadcaster,
            shutdown,
        }
    }
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let rpc_routes = Router::new()
        .route(methods::BIZ_CHECK, post(api::check_handler))
        .route(methods::BIZ_ADD, post(api::add_handler))
        .route(methods::BIZ_TEST, post(api::test_handler))
        .route(methods::ADMIN_LOGGING, post(api_admin::logging_handler))
        .route(methods::ADMIN_STATISTICS, post(api_admin::statistics_handler))
        .layer(axum::middleware::from_fn(middleware::admission_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(rpc_routes)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}

/// Serves the application on `listener` until `state.shutdown` is cancelled.
///
/// Open streams observe the same token and finish on their own, which lets
/// the graceful shutdown complete.
///
/// # Errors
///
/// Returns the I/O error that stopped the accept loop.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "serving gatewire");

    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
}
