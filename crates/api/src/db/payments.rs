//! Payment ledger.

use std::path::PathBuf;

use merchant_bank_core::CustomerId;

use super::{Collection, MissingFile, RecordStore, RepositoryError};
use crate::models::payment::Payment;

/// Append-only ledger of accepted payments.
///
/// A missing ledger file is an empty ledger; it is created by the first
/// append.
#[derive(Debug)]
pub struct PaymentRepository {
    payments: Collection<Payment>,
}

impl PaymentRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            payments: Collection::new(RecordStore::new(path, MissingFile::Empty)),
        }
    }

    /// Append a payment to the ledger.
    ///
    /// # Errors
    ///
    /// Propagates store errors; nothing is recorded on failure.
    pub async fn append(&self, payment: Payment) -> Result<(), RepositoryError> {
        self.payments
            .update(|payments| {
                payments.push(payment);
                Ok(())
            })
            .await
    }

    /// The whole ledger, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn list_all(&self) -> Result<Vec<Payment>, RepositoryError> {
        self.payments.read().await
    }

    /// Payments made by one customer, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn list_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<Payment>, RepositoryError> {
        let mut payments = self.payments.read().await?;
        payments.retain(|p| &p.customer_id == customer_id);
        Ok(payments)
    }
}
