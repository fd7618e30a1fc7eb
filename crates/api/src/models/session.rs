//! Session token types.

use serde::{Deserialize, Serialize};

use merchant_bank_core::{CustomerId, RoleClaim};

/// Claims carried by a session token.
///
/// Tokens are self-contained: nothing about them is stored server-side.
/// Whether the customer is currently logged in is a separate fact, kept on
/// the customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Customer the token was issued to.
    pub sub: CustomerId,
    /// Issuer, checked against configuration on verification.
    pub iss: String,
    /// Issued at (Unix timestamp, seconds).
    pub iat: u64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: u64,
    /// Roles granted to the bearer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleClaim>,
}

/// Successful login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Message returned by logout, whether or not a session was ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}
