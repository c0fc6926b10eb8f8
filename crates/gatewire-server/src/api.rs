//! Error mapping and the unary `Biz` handlers.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gatewire_observe::ObserveError;
use gatewire_types::Nothing;
use thiserror::Error;

use crate::admission::AdmissionError;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid argument: {0}")]
    BadRequest(String),
    #[error("unauthenticated: {0}")]
    Unauthenticated(#[from] AdmissionError),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl From<ObserveError> for ApiError {
    fn from(err: ObserveError) -> Self {
        match err {
            ObserveError::InvalidInterval => ApiError::BadRequest(err.to_string()),
            other => ApiError::InternalServerError(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

/// Handler for `POST /main.Biz/Check`.
pub async fn check_handler(Json(input): Json<Nothing>) -> Json<Nothing> {
    Json(input)
}

/// Handler for `POST /main.Biz/Add`.
pub async fn add_handler(Json(input): Json<Nothing>) -> Json<Nothing> {
    Json(input)
}

/// Handler for `POST /main.Biz/Test`.
pub async fn test_handler(Json(input): Json<Nothing>) -> Json<Nothing> {
    Json(input)
}
