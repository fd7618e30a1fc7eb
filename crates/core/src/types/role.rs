//! Role claims carried by session tokens.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A named role (e.g. `customer`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Role granted to every authenticated customer.
    pub const CUSTOMER: &'static str = "customer";

    /// Create a role from a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The built-in customer role.
    #[must_use]
    pub fn customer() -> Self {
        Self(Self::CUSTOMER.to_owned())
    }

    /// Returns the role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// The `role` claim of a token.
///
/// Issuers disagree on the shape of this claim: some emit a single string,
/// others a list. Both are accepted and checked by set membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleClaim {
    /// `"role": "customer"`
    Single(String),
    /// `"role": ["customer", "merchant"]`
    Many(Vec<String>),
}

impl RoleClaim {
    /// Returns `true` if the claim grants at least one of `required`.
    #[must_use]
    pub fn matches_any(&self, required: &[Role]) -> bool {
        self.roles()
            .any(|held| required.iter().any(|r| r.as_str() == held))
    }

    /// Iterate over the roles in the claim.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Single(role) => core::slice::from_ref(role),
            Self::Many(roles) => roles,
        };
        slice.iter().map(String::as_str)
    }
}

impl From<Role> for RoleClaim {
    fn from(role: Role) -> Self {
        Self::Single(role.0)
    }
}
