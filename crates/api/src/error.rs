//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Error responses are JSON: `{"error": "<code>", "message": "<text>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::middleware::auth::GateError;
use crate::services::{AuthError, PaymentError};

/// Application-level error type for the bank API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Registration or login failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Payment submission failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Session token missing, invalid or lacking a role.
    #[error("Gate error: {0}")]
    Gate(#[from] GateError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl AppError {
    /// Whether this error is the server's fault.
    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidUsername(_) | AuthError::WeakPassword(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UsernameTaken => StatusCode::CONFLICT,
                AuthError::Repository(_) | AuthError::Hashing(_) | AuthError::Token(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Payment(err) => match err {
                PaymentError::Unauthorized => StatusCode::UNAUTHORIZED,
                PaymentError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
                PaymentError::VerificationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PaymentError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Gate(err) => match err {
                GateError::Unauthorized => StatusCode::UNAUTHORIZED,
                GateError::Forbidden => StatusCode::FORBIDDEN,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Repository(_) => "internal_error",
            Self::Auth(err) => match err {
                AuthError::InvalidUsername(_) => "invalid_username",
                AuthError::WeakPassword(_) => "weak_password",
                AuthError::InvalidCredentials => "invalid_credentials",
                AuthError::UsernameTaken => "username_taken",
                AuthError::Repository(_) | AuthError::Hashing(_) | AuthError::Token(_) => {
                    "internal_error"
                }
            },
            Self::Payment(err) => match err {
                PaymentError::Unauthorized => "unauthorized",
                PaymentError::InvalidAmount(_) => "invalid_amount",
                PaymentError::VerificationFailed(_) => "verification_failed",
                PaymentError::Repository(_) => "internal_error",
            },
            Self::Gate(err) => match err {
                GateError::Unauthorized => "unauthorized",
                GateError::Forbidden => "forbidden",
            },
        }
    }

    fn public_message(&self) -> String {
        // Don't expose internal error details to clients
        if self.is_server_error() {
            return "Internal server error".to_string();
        }

        match self {
            Self::Auth(err) => err.to_string(),
            Self::Payment(err) => err.to_string(),
            Self::Gate(err) => err.to_string(),
            Self::Repository(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: self.code(),
            message: self.public_message(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a customer id.
///
/// Call this after a session token is verified to associate errors with
/// customers.
pub fn set_sentry_user(customer_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            ..Default::default()
        }));
    });
}
