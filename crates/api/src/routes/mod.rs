//! HTTP route handlers for the bank API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /ping                   - Liveness ({"message":"pong"})
//! GET  /health                 - Liveness ("ok")
//! GET  /health/ready           - Readiness (collections load)
//!
//! # Customers
//! GET  /api/customers          - List customers
//! POST /api/customers          - Register a customer
//!
//! # Sessions
//! POST /api/login              - Log in, returns a session token
//! POST /api/logout             - Log out (bearer token for the same customer)
//!
//! # Payments (bearer token with the `customer` role)
//! POST /api/payment-merchant   - Submit a payment
//! GET  /api/payments           - The bearer's payments
//! GET  /api/history            - The bearer's history
//! ```

pub mod auth;
pub mod customers;
pub mod history;
pub mod payments;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the `/api` routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(customers::index).post(customers::create))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/payment-merchant", post(payments::submit))
        .route("/payments", get(payments::index))
        .route("/history", get(history::index))
}

/// Create all routes, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
}

/// Build the complete application: routes, state and middleware.
pub fn app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
        )
    });

    routes()
        .with_state(state)
        .layer(from_fn(request_id_middleware))
        .layer(trace)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable unless every collection can be read.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    let (customers, payments, history) = tokio::join!(
        state.customers().list_all(),
        state.payments().list_all(),
        state.history().list_all(),
    );

    if let Err(e) = customers.and(payments.map(drop)).and(history.map(drop)) {
        tracing::warn!(error = %e, "readiness check failed");
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    StatusCode::OK
}
