//! Customer registration and listing.

use axum::{Json, extract::State, http::StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::Result;
use crate::models::customer::CustomerView;
use crate::state::AppState;

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: SecretString,
}

/// List every customer. Password digests are never included.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<CustomerView>>> {
    let customers = state.customers().list_all().await?;
    Ok(Json(customers.iter().map(CustomerView::from).collect()))
}

/// Register a new customer.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<CustomerView>)> {
    let customer = state
        .sessions()
        .register(&request.username, request.password.expose_secret())
        .await?;

    Ok((StatusCode::CREATED, Json(CustomerView::from(customer))))
}
