//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (fill in `request_id`, echo `x-request-id`)
//!
//! Token checks are not a layer: handlers that need a session take a
//! [`RequireCustomer`] argument.

pub mod auth;
pub mod request_id;

pub use auth::{GateError, RequireCustomer, verify_session_token};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
