//! Command implementations.

pub mod customers;
pub mod init;
pub mod ledger;

use serde::Serialize;
use thiserror::Error;

use merchant_bank_api::config::ConfigError;
use merchant_bank_api::db::RepositoryError;
use merchant_bank_api::services::{AuthError, HashingError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A collection could not be read or written.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// The username or password was rejected.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// The environment holds an invalid setting.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The password hasher could not be built.
    #[error("{0}")]
    Hashing(#[from] HashingError),

    /// Output could not be encoded.
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Print records as pretty JSON on stdout.
#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(records: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}
