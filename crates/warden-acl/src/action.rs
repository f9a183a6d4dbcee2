//! Actions a principal may request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AccessError;

/// An operation requested against a resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create a new account. Public.
    Register,
    /// Exchange credentials for an access token. Public.
    IssueToken,
    /// Read a collection.
    List,
    /// Read a single resource.
    Retrieve,
    /// Create a resource.
    Create,
    /// Modify a resource (full or partial).
    Update,
    /// Remove a resource.
    Delete,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 7] = [
        Action::Register,
        Action::IssueToken,
        Action::List,
        Action::Retrieve,
        Action::Create,
        Action::Update,
        Action::Delete,
    ];

    /// Actions allowed without credentials.
    pub fn is_public(self) -> bool {
        matches!(self, Action::Register | Action::IssueToken)
    }

    /// Read-only actions.
    pub fn is_safe(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }

    /// Actions addressed at a single existing resource.
    pub fn targets_instance(self) -> bool {
        matches!(self, Action::Retrieve | Action::Update | Action::Delete)
    }

    /// The canonical name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Register => "register",
            Action::IssueToken => "issue_token",
            Action::List => "list",
            Action::Retrieve => "retrieve",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AccessError;

    /// Parses canonical names plus the viewset aliases
    /// (`partial_update`, `destroy`, `token`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "register" => Ok(Action::Register),
            "issue_token" | "token" | "login" => Ok(Action::IssueToken),
            "list" => Ok(Action::List),
            "retrieve" | "read" => Ok(Action::Retrieve),
            "create" => Ok(Action::Create),
            "update" | "partial_update" => Ok(Action::Update),
            "delete" | "destroy" => Ok(Action::Delete),
            _ => Err(AccessError::UnknownAction(s.to_string())),
        }
    }
}
