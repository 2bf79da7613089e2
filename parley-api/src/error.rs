//! API errors and their HTTP mapping

use crate::types::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parley_core::{PresenceError, SendError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Endpoint not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Send(#[from] SendError),

    #[error(transparent)]
    Presence(#[from] PresenceError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Send(SendError::MissingField(_)) => StatusCode::BAD_REQUEST,
            ApiError::Send(SendError::ReceiverUnavailable(_)) => StatusCode::NOT_FOUND,
            ApiError::Presence(PresenceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, stable label for the `error` field of the response body
    fn label(&self) -> &'static str {
        match self {
            ApiError::MissingField(_) | ApiError::Send(SendError::MissingField(_)) => {
                "Missing required fields"
            }
            ApiError::Send(SendError::ReceiverUnavailable(_)) => "Receiver is not connected",
            ApiError::NotFound(_) | ApiError::Presence(PresenceError::NotFound(_)) => {
                "User not found"
            }
            ApiError::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let error_response = ErrorResponse {
            error: self.label().to_string(),
            details: Some(self.to_string()),
        };
        (status, Json(error_response)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
