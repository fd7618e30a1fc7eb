//! Customer directory.

use std::path::PathBuf;

use merchant_bank_core::{CustomerId, Username};

use super::{Collection, MissingFile, RecordStore, RepositoryError};
use crate::models::customer::Customer;
use crate::services::password::CredentialHasher;

/// Owns the customer collection.
///
/// Customers are never deleted; only their `logged_in` flag changes after
/// registration.
#[derive(Debug)]
pub struct CustomerDirectory {
    customers: Collection<Customer>,
    hasher: CredentialHasher,
    unique_usernames: bool,
}

impl CustomerDirectory {
    /// Create a directory over the collection file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, hasher: CredentialHasher, unique_usernames: bool) -> Self {
        Self {
            customers: Collection::new(RecordStore::new(path, MissingFile::NotFound)),
            hasher,
            unique_usernames,
        }
    }

    /// Every customer, in registration order.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn list_all(&self) -> Result<Vec<Customer>, RepositoryError> {
        self.customers.read().await
    }

    /// Get the customer with `id`, but only while they are logged in.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn find_logged_in(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customers = self.customers.read().await?;
        Ok(customers.into_iter().find(|c| &c.id == id && c.logged_in))
    }

    /// Register a new customer.
    ///
    /// The password is hashed before the collection lock is taken. The id is
    /// assigned under the lock, so concurrent registrations never share one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Hashing` if the password cannot be hashed,
    /// `RepositoryError::Conflict` if usernames must be unique and this one
    /// is taken, and propagates store errors.
    #[tracing::instrument(skip(self, plaintext))]
    pub async fn create(
        &self,
        username: &Username,
        plaintext: &str,
    ) -> Result<Customer, RepositoryError> {
        let password_hash = self.hasher.hash(plaintext)?;
        let unique = self.unique_usernames;

        let customer = self
            .customers
            .update(|customers| {
                if unique && customers.iter().any(|c| &c.username == username) {
                    return Err(RepositoryError::Conflict(format!(
                        "username {username} is taken"
                    )));
                }

                let customer = Customer {
                    id: next_id(customers),
                    username: username.clone(),
                    password_hash,
                    logged_in: false,
                };
                customers.push(customer.clone());
                Ok(customer)
            })
            .await?;

        tracing::info!(customer_id = %customer.id, "customer registered");
        Ok(customer)
    }

    /// Find the first customer whose username matches and whose stored
    /// digest verifies `plaintext`, and mark them logged in.
    ///
    /// Records that match on username alone are skipped. Passwords are
    /// checked against a snapshot, outside the write lock.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn authenticate(
        &self,
        username: &str,
        plaintext: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let snapshot = self.customers.read().await?;
        let Some(id) = snapshot
            .iter()
            .find(|c| c.username == *username && self.hasher.verify(plaintext, &c.password_hash))
            .map(|c| c.id.clone())
        else {
            return Ok(None);
        };

        self.customers
            .update(|customers| {
                let customer = customers
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or_else(|| RepositoryError::NotFound(format!("customer {id}")))?;
                customer.logged_in = true;
                Ok(Some(customer.clone()))
            })
            .await
    }

    /// Set the `logged_in` flag of the first customer named `username`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer has that username,
    /// and propagates store errors.
    pub async fn set_logged_in(
        &self,
        username: &str,
        status: bool,
    ) -> Result<Customer, RepositoryError> {
        self.customers
            .update(|customers| {
                let customer = customers
                    .iter_mut()
                    .find(|c| c.username == *username)
                    .ok_or_else(|| RepositoryError::NotFound(format!("customer {username}")))?;
                customer.logged_in = status;
                Ok(customer.clone())
            })
            .await
    }

    /// End the session of customer `id` if they are logged in.
    ///
    /// Returns `None`, and writes nothing, when no logged-in customer has
    /// that id.
    ///
    /// # Errors
    ///
    /// Propagates store errors.
    pub async fn logout(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let writer = self.customers.write().await;
        let mut customers = writer.load_all().await?;

        let Some(customer) = customers.iter_mut().find(|c| &c.id == id && c.logged_in) else {
            return Ok(None);
        };
        customer.logged_in = false;
        let customer = customer.clone();

        writer.save_all(&customers).await?;
        Ok(Some(customer))
    }
}

/// Next sequential id: one past both the highest numeric id and the count.
fn next_id(customers: &[Customer]) -> CustomerId {
    let highest = customers
        .iter()
        .filter_map(|c| c.id.sequence_number())
        .max()
        .unwrap_or(0);
    CustomerId::sequential(highest.max(customers.len()) + 1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::password::PasswordCost;
    use std::sync::Arc;

    fn directory(path: PathBuf, unique: bool) -> CustomerDirectory {
        std::fs::write(&path, "[]").unwrap();
        let hasher = CredentialHasher::new(PasswordCost::minimal()).unwrap();
        CustomerDirectory::new(path, hasher, unique)
    }

    fn name(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = directory(tmp.path().join("customer.json"), false);

        let alice = dir.create(&name("alice"), "secret123").await.unwrap();
        let bob = dir.create(&name("bob"), "hunter22").await.unwrap();

        assert_eq!(alice.id.as_str(), "1");
        assert_eq!(bob.id.as_str(), "2");
        assert!(!alice.logged_in);
        assert_ne!(alice.password_hash, "secret123");
        assert_eq!(dir.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_collection_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let hasher = CredentialHasher::new(PasswordCost::minimal()).unwrap();
        let dir = CustomerDirectory::new(tmp.path().join("customer.json"), hasher, false);

        assert!(matches!(
            dir.list_all().await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_usernames() {
        let tmp = tempfile::tempdir().unwrap();

        let lenient = directory(tmp.path().join("lenient.json"), false);
        lenient.create(&name("alice"), "secret123").await.unwrap();
        assert!(lenient.create(&name("alice"), "other-pass").await.is_ok());

        let strict = directory(tmp.path().join("strict.json"), true);
        strict.create(&name("alice"), "secret123").await.unwrap();
        assert!(matches!(
            strict.create(&name("alice"), "other-pass").await,
            Err(RepositoryError::Conflict(_))
        ));
        assert_eq!(strict.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = directory(tmp.path().join("customer.json"), false);
        dir.create(&name("alice"), "secret123").await.unwrap();

        assert!(dir.authenticate("alice", "wrong").await.unwrap().is_none());
        assert!(dir.authenticate("bob", "secret123").await.unwrap().is_none());

        let customer = dir.authenticate("alice", "secret123").await.unwrap().unwrap();
        assert!(customer.logged_in);
        assert!(dir.find_logged_in(&customer.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_authenticate_skips_username_only_matches() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = directory(tmp.path().join("customer.json"), false);
        let first = dir.create(&name("alice"), "first-pass").await.unwrap();
        let second = dir.create(&name("alice"), "second-pass").await.unwrap();

        let customer = dir.authenticate("alice", "second-pass").await.unwrap().unwrap();

        assert_eq!(customer.id, second.id);
        assert!(dir.find_logged_in(&first.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_logged_in() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = directory(tmp.path().join("customer.json"), false);
        let alice = dir.create(&name("alice"), "secret123").await.unwrap();

        let updated = dir.set_logged_in("alice", true).await.unwrap();
        assert!(updated.logged_in);
        assert_eq!(updated.id, alice.id);

        assert!(matches!(
            dir.set_logged_in("nobody", true).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_logout_only_when_logged_in() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = directory(tmp.path().join("customer.json"), false);
        let alice = dir.create(&name("alice"), "secret123").await.unwrap();

        assert!(dir.logout(&alice.id).await.unwrap().is_none());

        dir.set_logged_in("alice", true).await.unwrap();
        let ended = dir.logout(&alice.id).await.unwrap().unwrap();
        assert!(!ended.logged_in);

        assert!(dir.logout(&alice.id).await.unwrap().is_none());
        assert!(dir.logout(&CustomerId::new("99")).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_get_distinct_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = Arc::new(directory(tmp.path().join("customer.json"), false));

        let mut handles = Vec::new();
        for i in 0..16 {
            let dir = Arc::clone(&dir);
            handles.push(tokio::spawn(async move {
                dir.create(&name(&format!("user{i}")), "secret123").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut ids: Vec<usize> = dir
            .list_all()
            .await
            .unwrap()
            .iter()
            .filter_map(|c| c.id.sequence_number())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=16).collect::<Vec<_>>());
    }

    #[test]
    fn test_next_id_skips_past_gaps() {
        let customer = |id: &str| Customer {
            id: CustomerId::new(id),
            username: name("x"),
            password_hash: String::new(),
            logged_in: false,
        };
        assert_eq!(next_id(&[]).as_str(), "1");
        assert_eq!(next_id(&[customer("1"), customer("5")]).as_str(), "6");
        assert_eq!(next_id(&[customer("a"), customer("b")]).as_str(), "3");
    }
}
