use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use fancast_errors::prelude::{codes, ErrorCode, ErrorObj};

/// A request failure surfaced before any stream opens. The body is always
/// `{"error": <message>}` with a deliberately generic message; diagnostic
/// detail stays in the logs.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(code.http_status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::with_code(codes::AUTH_UNAUTHENTICATED, "Unauthorized")
    }

    pub fn forbidden() -> Self {
        Self::with_code(codes::AUTH_FORBIDDEN, "Forbidden")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(codes::SCHEMA_VALIDATION, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(codes::STORE_NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code(codes::UNKNOWN_INTERNAL, message)
    }
}

impl From<ErrorObj> for ApiError {
    fn from(obj: ErrorObj) -> Self {
        let view = obj.to_public();
        Self {
            status: StatusCode::from_u16(obj.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: view.message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
