//! History journal.

use std::path::{Path, PathBuf};

use chrono::Utc;
use merchant_bank_core::{CustomerId, HistoryAction};

use super::{Collection, MissingFile, RecordStore, RepositoryError};
use crate::models::history::HistoryEntry;

/// Append-only journal of logins, logouts and payments.
#[derive(Debug)]
pub struct HistoryJournal {
    entries: Collection<HistoryEntry>,
}

impl HistoryJournal {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            entries: Collection::new(RecordStore::new(path, MissingFile::NotFound)),
        }
    }

    /// Journal `action`, never failing.
    ///
    /// A missing journal is started afresh. A journal that cannot be decoded
    /// is renamed to `<file>.corrupt-<unix seconds>` and a new one started,
    /// so no earlier entry is overwritten. If the file cannot be read or
    /// moved aside, the entry is dropped. Write failures are logged and
    /// dropped.
    pub async fn append(&self, customer_id: &CustomerId, action: HistoryAction) {
        let writer = self.entries.write().await;

        let mut entries = match writer.load_all().await {
            Ok(entries) => entries,
            Err(RepositoryError::NotFound(_)) => {
                tracing::info!("history missing, starting a new journal");
                Vec::new()
            }
            Err(RepositoryError::Decode { path, source }) => {
                let aside = quarantine_path(&path);
                if let Err(e) = tokio::fs::rename(&path, &aside).await {
                    tracing::error!(
                        error = %e,
                        path = %path.display(),
                        customer_id = %customer_id,
                        action = %action,
                        "history unreadable and could not be moved aside, entry dropped"
                    );
                    return;
                }
                tracing::warn!(
                    error = %source,
                    moved_to = %aside.display(),
                    "history unreadable, moved aside and starting a new journal"
                );
                Vec::new()
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    customer_id = %customer_id,
                    action = %action,
                    "history unreadable, entry dropped"
                );
                return;
            }
        };
        entries.push(entry(customer_id, action));

        if let Err(e) = writer.save_all(&entries).await {
            tracing::error!(
                error = %e,
                customer_id = %customer_id,
                action = %action,
                "failed to write history entry"
            );
        }
    }

    /// Journal `action`, reporting failures.
    ///
    /// # Errors
    ///
    /// Propagates store errors; nothing is journaled on failure.
    pub async fn try_append(
        &self,
        customer_id: &CustomerId,
        action: HistoryAction,
    ) -> Result<(), RepositoryError> {
        self.entries
            .update(|entries| {
                entries.push(entry(customer_id, action));
                Ok(())
            })
            .await
    }

    /// The whole journal, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn list_all(&self) -> Result<Vec<HistoryEntry>, RepositoryError> {
        self.entries.read().await
    }

    /// Journal entries for one customer, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn list_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let mut entries = self.entries.read().await?;
        entries.retain(|e| &e.customer_id == customer_id);
        Ok(entries)
    }
}

fn quarantine_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".corrupt-{}", Utc::now().timestamp()));
    path.with_file_name(name)
}

fn entry(customer_id: &CustomerId, action: HistoryAction) -> HistoryEntry {
    HistoryEntry {
        customer_id: customer_id.clone(),
        action,
        timestamp: Utc::now(),
    }
}
