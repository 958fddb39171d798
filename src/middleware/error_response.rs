//! Error response normalization
//!
//! Framework rejections (malformed JSON, wrong content type, unknown
//! method) come back as text/plain with parser details. This layer swaps
//! them for the same `{error, message}` JSON that `AppError` produces.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub async fn normalize_error_response(request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();

    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);
    if is_json {
        return response;
    }

    tracing::debug!(status = %status, "normalized framework error response");
    generic_error_response(status)
}

fn generic_error_response(status: StatusCode) -> Response {
    let (error, message) = match status {
        StatusCode::BAD_REQUEST => ("bad_request", "Invalid request body"),
        StatusCode::UNAUTHORIZED => ("unauthorized", "Not authorized to access this route"),
        StatusCode::FORBIDDEN => ("forbidden", "Access denied"),
        StatusCode::NOT_FOUND => ("not_found", "Not found"),
        StatusCode::METHOD_NOT_ALLOWED => ("method_not_allowed", "Method not allowed"),
        StatusCode::PAYLOAD_TOO_LARGE => ("payload_too_large", "Request body too large"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => {
            ("unsupported_media_type", "Expected an application/json body")
        }
        StatusCode::UNPROCESSABLE_ENTITY => ("validation", "Request body has invalid fields"),
        StatusCode::TOO_MANY_REQUESTS => {
            ("rate_limited", "Too many requests, please try again later")
        }
        _ if status.is_client_error() => ("client_error", "Client error"),
        _ => ("internal_error", "An internal error occurred"),
    };

    (status, Json(json!({ "error": error, "message": message }))).into_response()
}
