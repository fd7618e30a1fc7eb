//! History journal entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use merchant_bank_core::{CustomerId, HistoryAction};

/// One journaled action. Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub customer_id: CustomerId,
    pub action: HistoryAction,
    pub timestamp: DateTime<Utc>,
}
