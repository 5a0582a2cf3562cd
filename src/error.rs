// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::quiz::flow::FlowError;

pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate report. Please try again.";

/// Global Application Error Enum.
/// Every failure is scoped to the current user action; none of them is fatal to the process.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (e.g., a request already in flight for this session)
    Conflict(String),

    // 503 Service Unavailable: credentials for a collaborator are missing
    Configuration(String),

    // 502 Bad Gateway: report generation failed, the attempt is discarded
    GenerationFailed,

    // 502 Bad Gateway: the lead store rejected the insert
    SubmissionFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InternalServerError(msg) => write!(f, "internal error: {}", msg),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Configuration(msg)
            | AppError::SubmissionFailed(msg) => f.write_str(msg),
            AppError::GenerationFailed => f.write_str(GENERATION_FAILED_MESSAGE),
        }
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Configuration(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::GenerationFailed => (
                StatusCode::BAD_GATEWAY,
                GENERATION_FAILED_MESSAGE.to_string(),
            ),
            AppError::SubmissionFailed(msg) => (StatusCode::BAD_GATEWAY, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Flow violations are client mistakes, except the ones that depend on
/// timing (overlay open, quiz already finished), which are conflicts.
impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::Resting | FlowError::Finished => AppError::Conflict(err.to_string()),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}
