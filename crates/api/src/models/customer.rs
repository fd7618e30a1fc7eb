//! Customer records.

use serde::{Deserialize, Serialize};

use merchant_bank_core::{CustomerId, Username};

/// A registered customer, as stored in `customer.json`.
///
/// The password digest is stored under the `password` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub username: Username,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub logged_in: bool,
}

/// Public view of a customer. Never carries the password digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerView {
    pub id: CustomerId,
    pub username: Username,
    pub logged_in: bool,
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            username: customer.username,
            logged_in: customer.logged_in,
        }
    }
}

impl From<&Customer> for CustomerView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id.clone(),
            username: customer.username.clone(),
            logged_in: customer.logged_in,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_shape() {
        let json = r#"{"id":"1","username":"alice","password":"$argon2id$x","logged_in":true}"#;
        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.id.as_str(), "1");
        assert_eq!(customer.password_hash, "$argon2id$x");
        assert!(customer.logged_in);
    }

    #[test]
    fn test_view_hides_password() {
        let customer = Customer {
            id: CustomerId::new("1"),
            username: Username::parse("alice").unwrap(),
            password_hash: "$argon2id$x".to_owned(),
            logged_in: false,
        };
        let json = serde_json::to_value(CustomerView::from(&customer)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "1", "username": "alice", "logged_in": false})
        );
    }
}
