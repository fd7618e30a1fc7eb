//! Data directory initialisation.

use std::path::Path;

use merchant_bank_api::db::DataDir;

use super::CliError;

/// Create the data directory with empty customer and history collections.
///
/// Existing collection files are left as they are.
pub async fn run(data_dir: &Path) -> Result<(), CliError> {
    let data = DataDir::new(data_dir);
    data.initialise().await?;
    tracing::info!("Data directory ready at {}", data.root().display());
    Ok(())
}
