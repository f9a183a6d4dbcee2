//! Error types for warden-acl

use thiserror::Error;

use crate::{Action, Principal, ResourceKind};

/// Result type alias for warden-acl operations
pub type Result<T> = std::result::Result<T, AccessError>;

/// Errors that can occur in warden-acl
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessError {
    /// The gate denied an anonymous principal.
    #[error("authentication required to {action}")]
    Unauthenticated {
        /// Action that was attempted
        action: Action,
    },

    /// The gate denied an authenticated principal.
    #[error("not allowed to {action} {kind}")]
    Forbidden {
        /// Action that was attempted
        action: Action,
        /// Kind of resource the action targeted
        kind: ResourceKind,
    },

    /// An action name did not parse.
    #[error("unknown action: '{0}'")]
    UnknownAction(String),

    /// A resource kind did not parse.
    #[error("unknown resource kind: '{0}'")]
    UnknownKind(String),

    /// A role name did not parse.
    #[error("unknown role: '{0}'")]
    UnknownRole(String),

    /// A principal id did not parse.
    #[error("invalid principal id: '{0}'")]
    InvalidPrincipalId(String),
}

impl AccessError {
    /// The error for a denied request: anonymous principals must
    /// authenticate, authenticated ones are forbidden.
    pub fn denied(principal: &Principal, action: Action, kind: ResourceKind) -> Self {
        if principal.is_authenticated() {
            AccessError::Forbidden { action, kind }
        } else {
            AccessError::Unauthenticated { action }
        }
    }
}
