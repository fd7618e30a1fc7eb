//! Bearer token gate and extractors.
//!
//! Routes that need a session take a [`RequireCustomer`] argument, which
//! verifies the `Authorization: Bearer <token>` header and requires the
//! `customer` role.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use thiserror::Error;

use merchant_bank_core::{CustomerId, Role};

use crate::error::{AppError, set_sentry_user};
use crate::models::session::Claims;
use crate::services::token::TokenService;
use crate::state::AppState;

/// Why a request was turned away at the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    /// No token, or a token that failed verification.
    #[error("unauthorized")]
    Unauthorized,

    /// A valid token without a required role, or for another customer.
    #[error("forbidden")]
    Forbidden,
}

/// Verify a bearer token and check its `role` claim.
///
/// `bearer` may be the raw `Authorization` header value; a leading
/// `Bearer ` is stripped. The token's `role` claim, a string or a list of
/// strings, must hold at least one of `required_roles`.
///
/// # Errors
///
/// Returns `GateError::Unauthorized` if the token is missing or fails
/// verification, and `GateError::Forbidden` if the role claim is absent or
/// grants none of the required roles.
pub fn verify_session_token(
    tokens: &TokenService,
    bearer: &str,
    required_roles: &[Role],
) -> Result<Claims, GateError> {
    let token = bearer.strip_prefix("Bearer ").unwrap_or(bearer).trim();
    if token.is_empty() {
        return Err(GateError::Unauthorized);
    }

    let claims = tokens.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "session token rejected");
        GateError::Unauthorized
    })?;

    match &claims.role {
        Some(role) if role.matches_any(required_roles) => Ok(claims),
        _ => Err(GateError::Forbidden),
    }
}

/// Extractor that requires a verified session token with the `customer`
/// role.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireCustomer(claims): RequireCustomer) -> String {
///     format!("Hello, customer {}!", claims.sub)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireCustomer(pub Claims);

impl RequireCustomer {
    /// Reject the request unless the token belongs to `customer_id`.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Forbidden` on mismatch.
    pub fn ensure_subject(&self, customer_id: &CustomerId) -> Result<(), GateError> {
        if &self.0.sub == customer_id {
            Ok(())
        } else {
            tracing::warn!(
                token_subject = %self.0.sub,
                requested = %customer_id,
                "token used for another customer"
            );
            Err(GateError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for RequireCustomer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(GateError::Unauthorized)?;

        let claims = verify_session_token(state.tokens(), header, &[Role::customer()])?;
        set_sentry_user(&claims.sub);

        Ok(Self(claims))
    }
}
