use axum::{Json, extract::State};

use crate::error::Result;
use crate::middleware::RequireCustomer;
use crate::models::history::HistoryEntry;
use crate::state::AppState;

/// The bearer's journal entries, oldest first.
pub async fn index(
    State(state): State<AppState>,
    RequireCustomer(claims): RequireCustomer,
) -> Result<Json<Vec<HistoryEntry>>> {
    let entries = state.history().list_for_customer(&claims.sub).await?;
    Ok(Json(entries))
}
