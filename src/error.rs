// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Network fault or timeout talking to the store; safe to retry.
    #[error("Transient store failure: {0}")]
    TransientStoreFailure(String),

    /// Match detection gave up. The swipe itself stays recorded.
    #[error("Match detection failed: {0}")]
    MatchDetectionFailed(String),

    #[error("Notification delivery failed: {0}")]
    NotificationDeliveryFailed(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether the failure is a transient store fault worth one retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::TransientStoreFailure(_))
    }

    /// Map a firestore client error, keeping retryable faults distinguishable.
    pub fn from_firestore(err: firestore::errors::FirestoreError) -> Self {
        use firestore::errors::FirestoreError;
        match &err {
            FirestoreError::NetworkError(_) => AppError::TransientStoreFailure(err.to_string()),
            FirestoreError::DatabaseError(db_err) if db_err.retry_possible => {
                AppError::TransientStoreFailure(err.to_string())
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::InvalidArgument(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_argument",
                Some(msg.clone()),
            ),
            AppError::TransientStoreFailure(msg) => {
                tracing::warn!(error = %msg, "Store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", None)
            }
            AppError::MatchDetectionFailed(msg) => {
                tracing::warn!(error = %msg, "Match detection failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "match_detection_failed",
                    Some("Your swipe was saved. Please try again.".to_string()),
                )
            }
            AppError::NotificationDeliveryFailed(msg) => {
                tracing::warn!(error = %msg, "Notification delivery failed");
                (StatusCode::BAD_GATEWAY, "notification_failed", None)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
