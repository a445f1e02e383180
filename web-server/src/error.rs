//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use mindcheck_core::{AssessError, ValidationError};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // User-correctable answer errors
    Validation(ValidationError),

    // Malformed request
    BadRequest(String),

    // Schema mismatch, model failure, join errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, field) = match &self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string(), Some(e.field())),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), None)
            }
        };

        let body = Json(json!({
            "error": error_message,
            "field": field,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<AssessError> for AppError {
    fn from(err: AssessError) -> Self {
        match err {
            AssessError::Validation(e) => AppError::Validation(e),
            AssessError::WrongScreen(_) => AppError::BadRequest(err.to_string()),
            AssessError::Predict(e) => AppError::InternalError(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("prediction task failed: {}", err))
    }
}
