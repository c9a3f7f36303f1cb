// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Message returned for any failure inside the score aggregation pipeline.
pub const AGGREGATION_FAILED: &str = "Failed to fetch city data from external APIs.";

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed request input.
    #[error("{0}")]
    Validation(String),

    /// API key or session gate rejected the request.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// The geo lookup returned no match for the requested city.
    #[error("GeoDB Error: {0}")]
    CityNotFound(String),

    /// An external API failed at the transport or service level.
    #[error("{service} Error: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    #[error("Database error: {0}")]
    Persistence(String),

    /// A handler-level message over an underlying failure.
    #[error("{message}: {source}")]
    Failed {
        message: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Build an upstream error for the named external service.
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        AppError::Upstream {
            service,
            message: message.into(),
        }
    }

    /// Attach the message clients should see for this failure.
    pub fn with_message(self, message: &'static str) -> Self {
        AppError::Failed {
            message,
            source: Box::new(self),
        }
    }

    /// HTTP status for this error.
    ///
    /// `CityNotFound` deliberately maps to 500 rather than 404: an unknown
    /// city is reported like any other aggregation failure.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::CityNotFound(_)
            | AppError::Upstream { .. }
            | AppError::Persistence(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Failed { source, .. } => source.status(),
        }
    }
}

/// JSON error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, error) = match &self {
            AppError::Validation(msg) => (msg.clone(), None),
            AppError::Unauthorized(msg) => (msg.to_string(), None),
            AppError::CityNotFound(_) | AppError::Upstream { .. } => {
                tracing::error!(error = %self, "API aggregation failed");
                (AGGREGATION_FAILED.to_string(), Some(self.to_string()))
            }
            AppError::Persistence(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("Database error".to_string(), Some(msg.clone()))
            }
            AppError::Failed { message, source } => {
                tracing::error!(error = %source, "{}", message);
                (message.to_string(), Some(source.to_string()))
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("Internal server error".to_string(), None)
            }
        };

        (status, Json(ErrorResponse { message, error })).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
