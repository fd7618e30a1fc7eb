//! Core types for the Merchant Bank API.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amount;
pub mod history;
pub mod id;
pub mod role;
pub mod username;

pub use amount::{Amount, AmountError};
pub use history::HistoryAction;
pub use id::*;
pub use role::{Role, RoleClaim};
pub use username::{Username, UsernameError};
