//! Error responses for the query API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors a query handler can answer with.
///
/// Each variant maps to one HTTP status and a stable `error` code in the
/// JSON body, so clients can branch without parsing the message text.
#[derive(Debug)]
pub enum ApiError {
    /// No record matches the requested identity.
    NotFound(String),
    /// A query parameter the API cannot parse or does not accept.
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "bad_request", message),
        };
        let body = json!({ "error": code, "message": message });
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotFound(message) => write!(f, "not found: {}", message),
            ApiError::BadRequest(message) => write!(f, "bad request: {}", message),
        }
    }
}
