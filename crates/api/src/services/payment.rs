//! Payment submission.

use chrono::Utc;
use thiserror::Error;

use merchant_bank_core::{Amount, AmountError, HistoryAction, TransactionId};

use crate::db::{CustomerDirectory, HistoryJournal, PaymentRepository, RepositoryError};
use crate::models::payment::{Payment, PaymentRequest};

/// Errors that can occur while submitting a payment.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The customer does not exist or is not logged in.
    #[error("unauthorized or invalid customer")]
    Unauthorized,

    /// The amount is zero or negative.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// The transaction was rejected by the verifier.
    #[error("transaction {0} could not be verified")]
    VerificationFailed(TransactionId),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Checks a transaction id with the payment gateway before it is recorded.
pub trait TransactionVerifier: Send + Sync {
    /// Returns `true` if the transaction is genuine.
    fn verify(&self, transaction_id: &TransactionId) -> bool;
}

/// Verifier that accepts every transaction.
///
/// Stands in for the gateway until there is one to call.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllVerifier;

impl TransactionVerifier for AcceptAllVerifier {
    fn verify(&self, transaction_id: &TransactionId) -> bool {
        tracing::debug!(transaction_id = %transaction_id, "verifying transaction");
        true
    }
}

/// Payment service.
pub struct PaymentService<'a> {
    customers: &'a CustomerDirectory,
    payments: &'a PaymentRepository,
    history: &'a HistoryJournal,
    verifier: &'a dyn TransactionVerifier,
}

impl<'a> PaymentService<'a> {
    /// Create a new payment service.
    #[must_use]
    pub const fn new(
        customers: &'a CustomerDirectory,
        payments: &'a PaymentRepository,
        history: &'a HistoryJournal,
        verifier: &'a dyn TransactionVerifier,
    ) -> Self {
        Self {
            customers,
            payments,
            history,
            verifier,
        }
    }

    /// Record a payment for a logged-in customer.
    ///
    /// The payment is appended to the ledger, then a `payment` history
    /// entry is journaled. Unlike login and logout, a journaling failure
    /// fails the submission; the ledger entry is kept.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Unauthorized` if the customer is unknown or
    /// logged out, `PaymentError::InvalidAmount` for a non-positive amount,
    /// `PaymentError::VerificationFailed` if the verifier rejects the
    /// transaction, and `PaymentError::Repository` on storage failure.
    #[tracing::instrument(skip(self, request), fields(
        transaction_id = %request.transaction_id,
        customer_id = %request.customer_id,
    ))]
    pub async fn submit(&self, request: PaymentRequest) -> Result<Payment, PaymentError> {
        let customer = self
            .customers
            .find_logged_in(&request.customer_id)
            .await?
            .ok_or(PaymentError::Unauthorized)?;

        Amount::parse_positive(request.amount.value())?;

        if !self.verifier.verify(&request.transaction_id) {
            return Err(PaymentError::VerificationFailed(request.transaction_id));
        }

        let payment = Payment::from_request(request, Utc::now());
        self.payments.append(payment.clone()).await?;
        self.history
            .try_append(&customer.id, HistoryAction::Payment)
            .await?;

        tracing::info!(amount = %payment.amount, "payment recorded");
        Ok(payment)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::DataDir;
    use crate::services::password::{CredentialHasher, PasswordCost};
    use merchant_bank_core::{Amount, CustomerId, MerchantId, Username};
    use rust_decimal::Decimal;

    struct RejectAll;

    impl TransactionVerifier for RejectAll {
        fn verify(&self, _transaction_id: &TransactionId) -> bool {
            false
        }
    }

    struct Fixture {
        tmp: tempfile::TempDir,
        customers: CustomerDirectory,
        payments: PaymentRepository,
        history: HistoryJournal,
    }

    impl Fixture {
        async fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let data = DataDir::new(tmp.path());
            data.initialise().await.unwrap();
            let hasher = CredentialHasher::new(PasswordCost::minimal()).unwrap();

            let customers = CustomerDirectory::new(data.customers(), hasher, false);
            customers
                .create(&Username::parse("alice").unwrap(), "secret123")
                .await
                .unwrap();

            Self {
                customers,
                payments: PaymentRepository::new(data.payments()),
                history: HistoryJournal::new(data.history()),
                tmp,
            }
        }

        fn service<'a>(&'a self, verifier: &'a dyn TransactionVerifier) -> PaymentService<'a> {
            PaymentService::new(&self.customers, &self.payments, &self.history, verifier)
        }
    }

    fn request(amount: Decimal) -> PaymentRequest {
        PaymentRequest {
            transaction_id: TransactionId::new("T1"),
            customer_id: CustomerId::new("1"),
            merchant_id: MerchantId::new("M1"),
            amount: Amount::new(amount),
        }
    }

    #[tokio::test]
    async fn test_logged_out_customer_is_unauthorized() {
        let fx = Fixture::new().await;
        let result = fx.service(&AcceptAllVerifier).submit(request(Decimal::new(105, 1))).await;

        assert!(matches!(result, Err(PaymentError::Unauthorized)));
        assert!(fx.payments.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_customer_is_unauthorized() {
        let fx = Fixture::new().await;
        let mut req = request(Decimal::ONE);
        req.customer_id = CustomerId::new("42");

        assert!(matches!(
            fx.service(&AcceptAllVerifier).submit(req).await,
            Err(PaymentError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_submit_records_payment_and_history() {
        let fx = Fixture::new().await;
        fx.customers.set_logged_in("alice", true).await.unwrap();
        let before = Utc::now();

        let payment = fx
            .service(&AcceptAllVerifier)
            .submit(request(Decimal::new(105, 1)))
            .await
            .unwrap();

        assert_eq!(payment.transaction_id.as_str(), "T1");
        assert_eq!(payment.customer_id.as_str(), "1");
        assert_eq!(payment.merchant_id.as_str(), "M1");
        assert_eq!(payment.amount.to_string(), "10.5");
        assert!(payment.timestamp >= before);

        assert_eq!(fx.payments.list_all().await.unwrap(), vec![payment]);
        let history = fx.history.list_all().await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, HistoryAction::Payment);
        assert_eq!(history[0].customer_id.as_str(), "1");
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected() {
        let fx = Fixture::new().await;
        fx.customers.set_logged_in("alice", true).await.unwrap();

        assert!(matches!(
            fx.service(&AcceptAllVerifier).submit(request(Decimal::ZERO)).await,
            Err(PaymentError::InvalidAmount(_))
        ));
    }

    #[tokio::test]
    async fn test_rejected_transaction_not_recorded() {
        let fx = Fixture::new().await;
        fx.customers.set_logged_in("alice", true).await.unwrap();

        assert!(matches!(
            fx.service(&RejectAll).submit(request(Decimal::ONE)).await,
            Err(PaymentError::VerificationFailed(_))
        ));
        assert!(fx.payments.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_failure_propagates() {
        let fx = Fixture::new().await;
        fx.customers.set_logged_in("alice", true).await.unwrap();
        std::fs::remove_file(fx.tmp.path().join("history.json")).unwrap();

        let result = fx.service(&AcceptAllVerifier).submit(request(Decimal::ONE)).await;

        assert!(matches!(
            result,
            Err(PaymentError::Repository(RepositoryError::NotFound(_)))
        ));
        assert_eq!(fx.payments.list_all().await.unwrap().len(), 1);
    }
}
