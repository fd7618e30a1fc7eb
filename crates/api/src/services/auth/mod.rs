//! Session service.
//!
//! Registration, login and logout. Login and logout each journal one history
//! entry after the customer record has been updated; journaling here is
//! best-effort and never fails the request.

mod error;

pub use error::AuthError;

use merchant_bank_core::{CustomerId, HistoryAction, Username};

use crate::db::{CustomerDirectory, HistoryJournal, RepositoryError};
use crate::models::customer::Customer;
use crate::models::session::{LoginResponse, LogoutResponse};
use crate::services::token::TokenService;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Message returned when a session was ended.
pub const LOGOUT_SUCCESS: &str = "Logout successful";

/// Message returned when there was no session to end.
pub const LOGOUT_INVALID_CUSTOMER: &str = "Unauthorized or invalid customer";

/// Session service.
///
/// Borrows the directory, journal and token service for the span of a
/// request.
pub struct SessionService<'a> {
    customers: &'a CustomerDirectory,
    history: &'a HistoryJournal,
    tokens: &'a TokenService,
}

impl<'a> SessionService<'a> {
    /// Create a new session service.
    #[must_use]
    pub const fn new(
        customers: &'a CustomerDirectory,
        history: &'a HistoryJournal,
        tokens: &'a TokenService,
    ) -> Self {
        Self {
            customers,
            history,
            tokens,
        }
    }

    /// Register a new customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UsernameTaken` if usernames must be unique and this one is registered.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<Customer, AuthError> {
        let username = Username::parse(username)?;
        validate_password(password)?;

        let customer = self
            .customers
            .create(&username, password)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                RepositoryError::Hashing(e) => AuthError::Hashing(e),
                other => AuthError::Repository(other),
            })?;

        Ok(customer)
    }

    /// Log in with username and password.
    ///
    /// The first customer whose username matches and whose password
    /// verifies is marked logged in, and a token is issued for them.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no customer matches.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let customer = self
            .customers
            .authenticate(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.history.append(&customer.id, HistoryAction::Login).await;

        let token = self.tokens.issue(&customer)?;
        tracing::info!(customer_id = %customer.id, "customer logged in");

        Ok(LoginResponse { token })
    }

    /// End a customer's session.
    ///
    /// A customer who does not exist or is not logged in is not an error:
    /// the response carries [`LOGOUT_INVALID_CUSTOMER`] instead.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the customer collection cannot be
    /// read or written.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self, customer_id: &CustomerId) -> Result<LogoutResponse, AuthError> {
        let Some(customer) = self.customers.logout(customer_id).await? else {
            return Ok(LogoutResponse {
                message: LOGOUT_INVALID_CUSTOMER.to_owned(),
            });
        };

        self.history.append(&customer.id, HistoryAction::Logout).await;
        tracing::info!(customer_id = %customer.id, "customer logged out");

        Ok(LogoutResponse {
            message: LOGOUT_SUCCESS.to_owned(),
        })
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}
