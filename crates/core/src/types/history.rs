//! Journaled customer actions.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An action recorded in the history journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Login,
    Logout,
    Payment,
}

impl HistoryAction {
    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Payment => "payment",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&HistoryAction::Login).unwrap(), "\"login\"");
        assert_eq!(serde_json::to_string(&HistoryAction::Payment).unwrap(), "\"payment\"");
        let parsed: HistoryAction = serde_json::from_str("\"logout\"").unwrap();
        assert_eq!(parsed, HistoryAction::Logout);
        assert_eq!(HistoryAction::Logout.to_string(), "logout");
    }
}
