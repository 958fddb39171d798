//! Error type shared by handlers, repositories and middleware.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too many requests")]
    TooManyRequests { retry_after_secs: u64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Duplicate keys surface as 400 like any other rejected write.
            AppError::Validation(_) | AppError::Conflict(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, message) = match &self {
            AppError::Validation(msg) => ("validation", msg.clone()),
            AppError::Conflict(msg) => ("conflict", msg.clone()),
            AppError::BadRequest(msg) => ("bad_request", msg.clone()),
            AppError::NotFound(msg) => ("not_found", msg.clone()),
            AppError::Unauthorized(msg) => ("unauthorized", msg.clone()),
            AppError::Forbidden(msg) => ("forbidden", msg.clone()),
            AppError::TooManyRequests { .. } => (
                "rate_limited",
                "Too many requests, please try again later".to_string(),
            ),
            AppError::Jwt(e) => {
                tracing::debug!("JWT rejected: {:?}", e);
                ("unauthorized", "Not authorized to access this route".to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                ("database_error", "A database error occurred".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                ("internal_error", "An internal error occurred".to_string())
            }
        };

        let mut response = (status, Json(ErrorResponse { error, message })).into_response();
        if let AppError::TooManyRequests { retry_after_secs } = self {
            if let Ok(value) = retry_after_secs.to_string().parse() {
                response.headers_mut().insert("Retry-After", value);
            }
        }
        response
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
