//! Payment ledger records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use merchant_bank_core::{Amount, CustomerId, MerchantId, TransactionId};

/// A payment submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub transaction_id: TransactionId,
    pub customer_id: CustomerId,
    pub merchant_id: MerchantId,
    pub amount: Amount,
}

/// A recorded payment. Immutable once appended to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub transaction_id: TransactionId,
    pub customer_id: CustomerId,
    pub merchant_id: MerchantId,
    pub amount: Amount,
    pub timestamp: DateTime<Utc>,
}

impl Payment {
    /// Stamp a request with the time it was accepted.
    #[must_use]
    pub fn from_request(request: PaymentRequest, timestamp: DateTime<Utc>) -> Self {
        Self {
            transaction_id: request.transaction_id,
            customer_id: request.customer_id,
            merchant_id: request.merchant_id,
            amount: request.amount,
            timestamp,
        }
    }
}
