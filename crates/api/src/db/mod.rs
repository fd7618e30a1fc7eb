//! File-backed persistence.
//!
//! # Data directory
//!
//! Every collection is one human-readable JSON file holding the whole
//! collection as an array:
//!
//! - `customer.json` - registered customers and their login state
//! - `payment.json` - the payment ledger
//! - `history.json` - the login/logout/payment journal
//!
//! A missing `payment.json` reads as an empty ledger. A missing
//! `customer.json` or `history.json` is reported as `NotFound`; run
//! `mb-cli init` (or start the server, which calls [`DataDir::initialise`])
//! to create them.
//!
//! # Concurrency
//!
//! The raw [`RecordStore`] does no locking. Each collection is wrapped in a
//! [`Collection`], which holds a reader/writer lock for the full
//! load-mutate-save of every write.

pub mod customers;
pub mod history;
pub mod payments;
pub mod store;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::services::password::HashingError;

pub use customers::CustomerDirectory;
pub use history::HistoryJournal;
pub use payments::PaymentRepository;
pub use store::{Collection, MissingFile, RecordStore};

/// File name of the customer collection.
pub const CUSTOMER_FILE: &str = "customer.json";
/// File name of the payment ledger.
pub const PAYMENT_FILE: &str = "payment.json";
/// File name of the history journal.
pub const HISTORY_FILE: &str = "history.json";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Reading or writing a collection file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection file holds malformed content.
    #[error("malformed collection {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A collection could not be serialized.
    #[error("failed to encode collection: {0}")]
    Encode(#[source] serde_json::Error),

    /// Requested collection or record was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A credential could not be hashed before it was stored.
    #[error(transparent)]
    Hashing(#[from] HashingError),
}

impl RepositoryError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Location of the three collection files.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Use `root` as the data directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory itself.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the customer collection.
    #[must_use]
    pub fn customers(&self) -> PathBuf {
        self.root.join(CUSTOMER_FILE)
    }

    /// Path of the payment ledger.
    #[must_use]
    pub fn payments(&self) -> PathBuf {
        self.root.join(PAYMENT_FILE)
    }

    /// Path of the history journal.
    #[must_use]
    pub fn history(&self) -> PathBuf {
        self.root.join(HISTORY_FILE)
    }

    /// Create the directory and seed empty customer and history collections.
    ///
    /// Existing files are left untouched. The payment ledger is not seeded:
    /// it is created on the first payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the directory or a file cannot be
    /// created.
    pub async fn initialise(&self) -> Result<(), RepositoryError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| RepositoryError::io(&self.root, e))?;

        for path in [self.customers(), self.history()] {
            match tokio::fs::try_exists(&path).await {
                Ok(true) => {}
                Ok(false) => {
                    tokio::fs::write(&path, b"[]\n")
                        .await
                        .map_err(|e| RepositoryError::io(&path, e))?;
                    tracing::info!(path = %path.display(), "created empty collection");
                }
                Err(e) => return Err(RepositoryError::io(&path, e)),
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialise_seeds_customer_and_history() {
        let tmp = tempfile::tempdir().unwrap();
        let data = DataDir::new(tmp.path().join("database"));

        data.initialise().await.unwrap();

        assert_eq!(std::fs::read_to_string(data.customers()).unwrap(), "[]\n");
        assert_eq!(std::fs::read_to_string(data.history()).unwrap(), "[]\n");
        assert!(!data.payments().exists());
    }

    #[tokio::test]
    async fn test_initialise_keeps_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let data = DataDir::new(tmp.path());
        std::fs::write(data.customers(), "[{\"id\":\"1\"}]").unwrap();

        data.initialise().await.unwrap();

        assert_eq!(
            std::fs::read_to_string(data.customers()).unwrap(),
            "[{\"id\":\"1\"}]"
        );
    }
}
