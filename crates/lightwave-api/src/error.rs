use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use lightwave_core::Error;

/// HTTP rendering of a core error. Validation, conflict, and auth errors
/// carry their message through to the client; storage errors are logged
/// here and surfaced as a generic failure without detail.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{} not found", what))
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            Error::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            Error::Auth(msg) => Self::new(StatusCode::UNAUTHORIZED, msg),
            Error::SubscriptionRequired => {
                Self::new(StatusCode::PAYMENT_REQUIRED, e.to_string())
            }
            Error::Storage(e) => {
                error!("Storage error: {:#}", e);
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// spawn_blocking join failures are always internal errors.
pub fn join_error(e: tokio::task::JoinError) -> ApiError {
    error!("spawn_blocking join error: {}", e);
    ApiError::internal()
}
