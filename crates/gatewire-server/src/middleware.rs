use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::Response,
};
use gatewire_types::CONSUMER_METADATA_KEY;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::admission::CallInfo;
use crate::api::ApiError;
use crate::AppState;

/// Middleware running admission control in front of every RPC route.
///
/// The identity is the first `consumer` header value and the method is the
/// request path. Unary and streaming routes share this layer, so every call
/// is checked, and its event published, exactly once before the handler runs.
pub async fn admission_middleware(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let state = req
        .extensions()
        .get::<Arc<AppState>>()
        .ok_or_else(|| ApiError::InternalServerError("application state missing".to_string()))?
        .clone();

    // Owned copies: the request body is not `Sync`, so no borrow of `req`
    // may be held across the publish below.
    let identity = req
        .headers()
        .get(CONSUMER_METADATA_KEY)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let method = req.uri().path().to_owned();
    let source = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let call = CallInfo {
        identity: identity.as_deref(),
        method: &method,
        source,
    };
    state.interceptor.intercept(&call).await?;

    Ok(next.run(req).await)
}
