//! The access gate.
//!
//! [`decide`] is the single source of truth for authorization. It is a pure
//! function of the principal, the action, the resource kind, and (for
//! instance actions) the resource's owner. Every adapter (permission
//! classes, request extractors, the CLI `check` command) delegates here.
//!
//! Rule table, evaluated top to bottom:
//!
//! | Condition | Decision |
//! |-----------|----------|
//! | action is `register` / `issue_token` | allow |
//! | principal is anonymous | deny |
//! | action is `list` / `retrieve` | allow |
//! | kind is superuser-only (tag, category, product) | allow iff superuser |
//! | action is `create` on author | allow iff superuser |
//! | action is `create` | allow |
//! | action is `update` / `delete` | allow iff owner or superuser |

use std::fmt;

use crate::resource::{Owned, ResourceKind, WritePolicy};
use crate::{Action, Principal};

/// Outcome of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessDecision {
    /// The request may proceed.
    Allow,
    /// The request must be rejected.
    Deny,
}

impl AccessDecision {
    /// Returns `true` for [`AccessDecision::Allow`].
    pub fn is_allowed(self) -> bool {
        matches!(self, AccessDecision::Allow)
    }

    /// Returns `true` for [`AccessDecision::Deny`].
    pub fn is_denied(self) -> bool {
        !self.is_allowed()
    }
}

impl From<bool> for AccessDecision {
    fn from(allowed: bool) -> Self {
        if allowed {
            AccessDecision::Allow
        } else {
            AccessDecision::Deny
        }
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessDecision::Allow => f.write_str("allow"),
            AccessDecision::Deny => f.write_str("deny"),
        }
    }
}

/// Decide whether `principal` may perform `action` on `kind`.
///
/// `resource` is the addressed instance for `retrieve`, `update` and
/// `delete`. An update or delete with no resource (or a resource without an
/// owner) is only allowed for superusers.
pub fn decide(
    principal: &Principal,
    action: Action,
    kind: ResourceKind,
    resource: Option<&dyn Owned>,
) -> AccessDecision {
    if action.is_public() {
        return AccessDecision::Allow;
    }

    let Some(identity) = principal.identity() else {
        return AccessDecision::Deny;
    };

    if action.is_safe() {
        return AccessDecision::Allow;
    }

    if identity.is_superuser() {
        return AccessDecision::Allow;
    }

    let allowed = match (kind.write_policy(), action) {
        (WritePolicy::SuperuserOnly, _) => false,
        // Accounts come from registration, not from create.
        (WritePolicy::OwnerOrSuperuser, Action::Create) => kind != ResourceKind::Author,
        (WritePolicy::OwnerOrSuperuser, _) => {
            resource.and_then(|r| r.owner()) == Some(identity.id)
        }
    };

    AccessDecision::from(allowed)
}
