//! Customer management commands.

use std::path::Path;

use merchant_bank_api::db::{CustomerDirectory, DataDir};
use merchant_bank_api::models::CustomerView;
use merchant_bank_api::services::auth::validate_password;
use merchant_bank_api::services::{AuthError, CredentialHasher, PasswordCost};
use merchant_bank_core::Username;

use super::{CliError, print_json};

fn directory(
    data_dir: &Path,
    cost: PasswordCost,
    unique: bool,
) -> Result<CustomerDirectory, CliError> {
    let hasher = CredentialHasher::new(cost)?;
    Ok(CustomerDirectory::new(
        DataDir::new(data_dir).customers(),
        hasher,
        unique,
    ))
}

/// Print every customer.
pub async fn list(data_dir: &Path) -> Result<(), CliError> {
    // Listing never hashes, so the cost is irrelevant.
    let customers = directory(data_dir, PasswordCost::default(), false)?
        .list_all()
        .await?;
    let views: Vec<CustomerView> = customers.iter().map(CustomerView::from).collect();
    print_json(&views)
}

/// Register a customer, hashing the password at `cost`.
pub async fn create(
    data_dir: &Path,
    cost: PasswordCost,
    username: &str,
    password: &str,
    unique: bool,
) -> Result<(), CliError> {
    let username = Username::parse(username).map_err(AuthError::from)?;
    validate_password(password)?;

    let customer = directory(data_dir, cost, unique)?
        .create(&username, password)
        .await?;

    tracing::info!("Created customer {} ({})", customer.username, customer.id);
    print_json(&CustomerView::from(customer))
}

/// Clear a customer's logged-in flag.
pub async fn logout(data_dir: &Path, username: &str) -> Result<(), CliError> {
    let customer = directory(data_dir, PasswordCost::default(), false)?
        .set_logged_in(username, false)
        .await?;

    tracing::info!("Logged out customer {} ({})", customer.username, customer.id);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_rejects_weak_password() {
        let tmp = tempfile::tempdir().unwrap();
        DataDir::new(tmp.path()).initialise().await.unwrap();

        let result = create(tmp.path(), PasswordCost::minimal(), "alice", "short", false).await;
        assert!(matches!(
            result,
            Err(CliError::Auth(AuthError::WeakPassword(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_then_logout() {
        let tmp = tempfile::tempdir().unwrap();
        DataDir::new(tmp.path()).initialise().await.unwrap();

        let cost = PasswordCost::minimal();
        create(tmp.path(), cost, "alice", "secret123", true)
            .await
            .unwrap();
        assert!(
            create(tmp.path(), cost, "alice", "secret123", true)
                .await
                .is_err()
        );

        logout(tmp.path(), "alice").await.unwrap();
        assert!(logout(tmp.path(), "bob").await.is_err());
    }

    #[tokio::test]
    async fn test_create_hashes_at_given_cost() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = DataDir::new(tmp.path());
        data_dir.initialise().await.unwrap();
        let cost = PasswordCost {
            memory_kib: 16,
            iterations: 2,
            parallelism: 1,
        };

        create(tmp.path(), cost, "alice", "secret123", false)
            .await
            .unwrap();

        let stored = std::fs::read_to_string(data_dir.customers()).unwrap();
        assert!(stored.contains("m=16,t=2,p=1"), "{stored}");
    }
}
