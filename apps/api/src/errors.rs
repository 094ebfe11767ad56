#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::alert::AlertStatus;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The scheduling engine never logs or swallows these — every failure carries
/// enough detail (current state, attempted transition, offending field) for
/// the caller to act on. Only 500-class infrastructure faults are logged here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Cannot {transition} an alert in state '{current}'")]
    InvalidTransition {
        current: AlertStatus,
        transition: &'static str,
    },

    #[error("Snooze limit of {max} reached; fire or deactivate the alert instead")]
    SnoozeLimitExceeded { max: u32 },

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidSchedule(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_SCHEDULE", msg.clone())
            }
            AppError::InvalidTransition { .. } => (
                StatusCode::CONFLICT,
                "INVALID_STATE_TRANSITION",
                self.to_string(),
            ),
            // Surfaced under its own code so clients can prompt "mark taken"
            // instead of offering another snooze.
            AppError::SnoozeLimitExceeded { .. } => (
                StatusCode::CONFLICT,
                "SNOOZE_LIMIT_EXCEEDED",
                self.to_string(),
            ),
            AppError::ConcurrentModification(msg) => {
                (StatusCode::CONFLICT, "CONCURRENT_MODIFICATION", msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
