//! Session service error types.

use thiserror::Error;

use merchant_bank_core::UsernameError;

use crate::db::RepositoryError;
use crate::services::password::HashingError;
use crate::services::token::TokenError;

/// Errors that can occur during registration and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Invalid credentials (wrong password or unknown username).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username already registered (only when usernames must be unique).
    #[error("username already taken")]
    UsernameTaken,

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error: {0}")]
    Hashing(#[from] HashingError),

    /// Token issuance error.
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}
