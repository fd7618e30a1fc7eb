//! Payment ledger and history journal inspection.

use std::path::Path;

use merchant_bank_api::db::{DataDir, HistoryJournal, PaymentRepository};
use merchant_bank_core::CustomerId;

use super::{CliError, print_json};

/// Print the payment ledger, optionally for one customer.
pub async fn payments(data_dir: &Path, customer_id: Option<String>) -> Result<(), CliError> {
    let ledger = PaymentRepository::new(DataDir::new(data_dir).payments());
    let payments = match customer_id {
        Some(id) => ledger.list_for_customer(&CustomerId::new(id)).await?,
        None => ledger.list_all().await?,
    };
    print_json(&payments)
}

/// Print the history journal, optionally for one customer.
pub async fn history(data_dir: &Path, customer_id: Option<String>) -> Result<(), CliError> {
    let journal = HistoryJournal::new(DataDir::new(data_dir).history());
    let entries = match customer_id {
        Some(id) => journal.list_for_customer(&CustomerId::new(id)).await?,
        None => journal.list_all().await?,
    };
    print_json(&entries)
}
