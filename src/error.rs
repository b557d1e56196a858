// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every failure is turned into a single JSON object of the form
//! `{"error": "...", "details": "..."}`, where `details` is only present
//! for server-side failures.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Method not allowed. Only POST is accepted.")]
    MethodNotAllowed,

    #[error("Missing or invalid authorization token.")]
    MissingToken,

    /// Unknown token or failed registry lookup. Deliberately one message.
    #[error("Invalid or expired token.")]
    InvalidToken,

    #[error("Token is inactive.")]
    InactiveToken,

    #[error("Token has expired.")]
    ExpiredToken,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}: {details}")]
    Store { message: String, details: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message returned when the batch insert fails.
    pub const STORE_INSERT_FAILED: &'static str = "Failed to store game stats.";

    /// Message returned when the game lookup fails.
    pub const STORE_GAME_LOOKUP_FAILED: &'static str = "Failed to verify scrim game.";

    /// Wrap a lower-level store failure with a caller-facing message.
    pub fn store(message: &str, source: AppError) -> Self {
        let details = match source {
            AppError::Database(msg) => msg,
            other => other.to_string(),
        };
        AppError::Store {
            message: message.to_string(),
            details,
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::MissingToken
            | AppError::InvalidToken
            | AppError::InactiveToken
            | AppError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store { .. } | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON error response body
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error, details) = match self {
            AppError::Store { message, details } => {
                tracing::error!(error = %message, details = %details, "Store error");
                (message, Some(details))
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("Database error.".to_string(), Some(msg))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("Internal server error.".to_string(), Some(err.to_string()))
            }
            other => (other.to_string(), None),
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
