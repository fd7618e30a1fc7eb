//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::BankConfig;
use crate::db::{CustomerDirectory, DataDir, HistoryJournal, PaymentRepository};
use crate::services::{
    AcceptAllVerifier, CredentialHasher, HashingError, PaymentService, SessionService,
    TokenService, TransactionVerifier,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Each collection is owned here
/// exactly once, so every request sees the same collection locks.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    customers: CustomerDirectory,
    payments: PaymentRepository,
    history: HistoryJournal,
    tokens: TokenService,
    verifier: Box<dyn TransactionVerifier>,
}

impl AppState {
    /// Create a new application state with the accept-all transaction
    /// verifier.
    ///
    /// # Errors
    ///
    /// Returns `HashingError` if the configured password cost is rejected.
    pub fn new(config: &BankConfig) -> Result<Self, HashingError> {
        Self::with_verifier(config, AcceptAllVerifier)
    }

    /// Create a new application state with a custom transaction verifier.
    ///
    /// # Errors
    ///
    /// Returns `HashingError` if the configured password cost is rejected.
    pub fn with_verifier(
        config: &BankConfig,
        verifier: impl TransactionVerifier + 'static,
    ) -> Result<Self, HashingError> {
        let hasher = CredentialHasher::new(config.password_cost)?;
        let data_dir = DataDir::new(&config.data_dir);

        let customers =
            CustomerDirectory::new(data_dir.customers(), hasher, config.unique_usernames);
        let payments = PaymentRepository::new(data_dir.payments());
        let history = HistoryJournal::new(data_dir.history());
        let tokens = TokenService::new(&config.token);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                customers,
                payments,
                history,
                tokens,
                verifier: Box::new(verifier),
            }),
        })
    }

    /// Get a reference to the customer directory.
    #[must_use]
    pub fn customers(&self) -> &CustomerDirectory {
        &self.inner.customers
    }

    /// Get a reference to the payment ledger.
    #[must_use]
    pub fn payments(&self) -> &PaymentRepository {
        &self.inner.payments
    }

    /// Get a reference to the history journal.
    #[must_use]
    pub fn history(&self) -> &HistoryJournal {
        &self.inner.history
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Session service over this state's collections.
    #[must_use]
    pub fn sessions(&self) -> SessionService<'_> {
        SessionService::new(self.customers(), self.history(), self.tokens())
    }

    /// Payment service over this state's collections.
    #[must_use]
    pub fn payment_service(&self) -> PaymentService<'_> {
        PaymentService::new(
            self.customers(),
            self.payments(),
            self.history(),
            self.inner.verifier.as_ref(),
        )
    }
}
