//! Domain models for the merchant bank.
//!
//! These are the records persisted in the collection files and the
//! request/response shapes that travel with them.

pub mod customer;
pub mod history;
pub mod payment;
pub mod session;

pub use customer::{Customer, CustomerView};
pub use history::HistoryEntry;
pub use payment::{Payment, PaymentRequest};
pub use session::{Claims, LoginResponse, LogoutResponse};
