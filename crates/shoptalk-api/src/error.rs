//! API error type and JSON error response formatting.
//!
//! Every error surfaces as `{"error": "..."}` with the matching status
//! code. The missing-message case uses the exact wording existing clients
//! check for, so it must stay stable.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use shoptalk_chat::ChatError;

/// Error body returned when the chat request has no message field.
pub const MISSING_MESSAGE: &str = "Missing query parameter";

/// Error body for all 500 responses. Pipeline failure detail stays in the
/// server log; provider endpoints and error text never reach the client.
pub const INTERNAL_ERROR: &str = "Internal server error";

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid message.
    BadRequest(String),
    /// 500 Internal Server Error - pipeline failure, including deadline
    /// expiry and upstream provider errors.
    Internal(String),
}

impl ApiError {
    /// The canonical 400 for a request without a message.
    pub fn missing_message() -> Self {
        ApiError::BadRequest(MISSING_MESSAGE.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::EmptyMessage => ApiError::BadRequest(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
