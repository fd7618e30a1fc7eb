//! Payment submission and ledger queries.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::middleware::RequireCustomer;
use crate::models::payment::{Payment, PaymentRequest};
use crate::state::AppState;

/// Submit a payment on behalf of the bearer.
pub async fn submit(
    State(state): State<AppState>,
    gate: RequireCustomer,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<Payment>> {
    gate.ensure_subject(&request.customer_id)?;

    let payment = state.payment_service().submit(request).await?;
    Ok(Json(payment))
}

/// The bearer's payments, oldest first.
pub async fn index(
    State(state): State<AppState>,
    RequireCustomer(claims): RequireCustomer,
) -> Result<Json<Vec<Payment>>> {
    let payments = state.payments().list_for_customer(&claims.sub).await?;
    Ok(Json(payments))
}
