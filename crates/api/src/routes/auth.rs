//! Login and logout.

use axum::{Json, extract::State};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use merchant_bank_core::CustomerId;

use crate::error::Result;
use crate::middleware::RequireCustomer;
use crate::models::session::{LoginResponse, LogoutResponse};
use crate::state::AppState;

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

/// Logout payload.
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub customer_id: CustomerId,
}

/// Exchange credentials for a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let response = state
        .sessions()
        .login(&request.username, request.password.expose_secret())
        .await?;

    Ok(Json(response))
}

/// End the bearer's session.
///
/// Answers 200 even when there was no session to end; the message says
/// which happened.
pub async fn logout(
    State(state): State<AppState>,
    gate: RequireCustomer,
    Json(request): Json<LogoutRequest>,
) -> Result<Json<LogoutResponse>> {
    gate.ensure_subject(&request.customer_id)?;

    let response = state.sessions().logout(&request.customer_id).await?;
    Ok(Json(response))
}
