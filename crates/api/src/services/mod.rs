//! Business logic services.
//!
//! # Services
//!
//! - `password` - Argon2id credential hashing
//! - `token` - Session token issuance and verification
//! - `auth` - Registration, login and logout
//! - `payment` - Payment submission

pub mod auth;
pub mod password;
pub mod payment;
pub mod token;

pub use auth::{AuthError, SessionService};
pub use password::{CredentialHasher, HashingError, PasswordCost};
pub use payment::{AcceptAllVerifier, PaymentError, PaymentService, TransactionVerifier};
pub use token::{TokenError, TokenService};
