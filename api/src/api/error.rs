// ABOUTME: Single API error type and its translation into HTTP responses
// ABOUTME: Every handler returns Result<_, ApiError>; conversions from core errors live here

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use recipebook_core::identity::IdentityError;
use recipebook_core::types::{CollectionError, UserError};
use thiserror::Error;

const UNAVAILABLE: &str = "Service temporarily unavailable. Please try again in a few minutes.";

/// An error carrying the message shown to the client and the status it is sent with
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Logs the real cause and hides it from the client
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        tracing::error!("Internal error: {}", cause);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, UNAVAILABLE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound => ApiError::not_found(e.to_string()),
            UserError::Database(e) => ApiError::internal(e),
        }
    }
}

impl From<CollectionError> for ApiError {
    fn from(e: CollectionError) -> Self {
        match e {
            CollectionError::NotOwned => ApiError::forbidden(e.to_string()),
            CollectionError::Database(e) => ApiError::internal(e),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Rejected { status, message } => {
                // Only client errors are passed through; provider faults become a bad gateway
                let status = StatusCode::from_u16(status)
                    .ok()
                    .filter(StatusCode::is_client_error)
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                ApiError::new(status, message)
            }
            IdentityError::Transport(_) | IdentityError::InvalidResponse(_) => {
                tracing::error!("Identity provider failure: {}", e);
                ApiError::new(StatusCode::BAD_GATEWAY, UNAVAILABLE)
            }
        }
    }
}
